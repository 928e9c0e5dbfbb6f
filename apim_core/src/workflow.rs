//! The end-to-end identity-resolution and policy-assignment workflow.
//!
//! One invocation walks `Start -> OptionsBuilt -> SelectionMade ->
//! [ExpansionNeeded -> SubOptionsBuilt -> SubSelectionMade] ->
//! Resolved -> Submitting -> Done`, with `Cancelled` reachable from
//! every prompt. The states are not reified; the flow is linear and
//! every branch dispatches exhaustively on [`IdentityKind`].

use tracing::{debug, info};

use crate::errors::AccessError;
use crate::identity::{AccessPolicyRequest, IdentityKind, ResolvedIdentity};
use crate::interfaces::{CredentialProvider, IdentityQuery, PolicyStore, ServiceDescriptor};
use crate::options;
use crate::profile::AzureProfile;
use crate::ui::{Picker, ProgressReporter};

const SELECT_IDENTITY_PROMPT: &str = "Select Identity...";
const SELECT_SYSTEM_ASSIGNED_PROMPT: &str = "Select System Assigned Managed Identity...";
const SELECT_USER_ASSIGNED_PROMPT: &str = "Select User Assigned Managed Identity...";

/// Terminal result of one workflow invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The policy was created and the store re-read for verification.
    Created {
        /// The name the policy was recorded under.
        policy_name: String,
    },
    /// The user declined a prompt, chose the portal hand-off, or no
    /// identity qualified. Nothing was submitted.
    Cancelled,
}

/// Drives one access-policy grant from option building to post-commit
/// verification.
///
/// All collaborators are injected per invocation; an assigner holds no
/// state of its own and nothing carries over between invocations.
pub struct AccessPolicyAssigner<'a> {
    credentials: &'a dyn CredentialProvider,
    service: &'a dyn ServiceDescriptor,
    query: &'a dyn IdentityQuery,
    store: &'a dyn PolicyStore,
    picker: &'a dyn Picker,
    progress: &'a dyn ProgressReporter,
}

impl<'a> AccessPolicyAssigner<'a> {
    /// Wire up an assigner for a single invocation.
    pub fn new(
        credentials: &'a dyn CredentialProvider,
        service: &'a dyn ServiceDescriptor,
        query: &'a dyn IdentityQuery,
        store: &'a dyn PolicyStore,
        picker: &'a dyn Picker,
        progress: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            credentials,
            service,
            query,
            store,
            picker,
            progress,
        }
    }

    /// Run the workflow against the given profile.
    pub async fn run(&self, profile: &AzureProfile) -> Result<Outcome, AccessError> {
        let identity_options =
            options::build_options(self.credentials, self.service, &profile.management_endpoint)
                .await?;

        let selected = match self.picker.pick(&identity_options, SELECT_IDENTITY_PROMPT)? {
            Some(selected) => selected,
            None => return Ok(Outcome::Cancelled),
        };

        let resolved = match selected.kind {
            IdentityKind::ManualEntry => {
                debug!("portal hand-off selected; yielding without creating a policy");
                return Ok(Outcome::Cancelled);
            }
            IdentityKind::SystemAssignedList => {
                match self
                    .pick_expanded(selected.kind, SELECT_SYSTEM_ASSIGNED_PROMPT, profile)
                    .await?
                {
                    Some(resolved) => resolved,
                    None => return Ok(Outcome::Cancelled),
                }
            }
            IdentityKind::UserAssignedList => {
                match self
                    .pick_expanded(selected.kind, SELECT_USER_ASSIGNED_PROMPT, profile)
                    .await?
                {
                    Some(resolved) => resolved,
                    None => return Ok(Outcome::Cancelled),
                }
            }
            IdentityKind::CurrentUser
            | IdentityKind::ServiceIdentity
            | IdentityKind::ManagedIdentity => {
                ResolvedIdentity::from_option(&selected, &profile.tenant_id)
                    .map_err(AccessError::Query)?
            }
        };

        self.submit(resolved, profile).await
    }

    /// The expansion sub-flow: second query, second prompt.
    async fn pick_expanded(
        &self,
        kind: IdentityKind,
        prompt: &str,
        profile: &AzureProfile,
    ) -> Result<Option<ResolvedIdentity>, AccessError> {
        let sub_options = options::expand(kind, self.query).await?;
        if sub_options.is_empty() {
            info!("no eligible managed identities were found");
            return Ok(None);
        }

        let choice = match self.picker.pick(&sub_options, prompt)? {
            Some(choice) => choice,
            None => return Ok(None),
        };

        ResolvedIdentity::from_option(&choice, &profile.tenant_id)
            .map(Some)
            .map_err(AccessError::Query)
    }

    /// Construct the request, submit under a progress indication, then
    /// verify with a store re-read.
    async fn submit(
        &self,
        resolved: ResolvedIdentity,
        profile: &AzureProfile,
    ) -> Result<Outcome, AccessError> {
        let request = AccessPolicyRequest::new(resolved).map_err(AccessError::Submission)?;
        let policy_name = request.policy_name.to_owned();

        let handle = self.progress.start(&format!(
            "Creating Access Policy '{}' for Authorization '{}'...",
            policy_name, profile.authorization_name
        ));
        match self.store.create_access_policy(&request).await {
            Ok(()) => handle.finish(&format!("Created Access Policy '{policy_name}'.")),
            Err(e) => {
                handle.abandon(&format!("Could not create Access Policy '{policy_name}'."));
                return Err(e);
            }
        }

        self.store.refresh().await?;
        info!("created access policy '{}' successfully", policy_name);
        Ok(Outcome::Created { policy_name })
    }
}
