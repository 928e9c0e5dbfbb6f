//! Building and expanding the identity pick list.
//!
//! A pure projection over the collaborator reads: no side effects, no
//! sorting, fixed order.

use anyhow::anyhow;
use tracing::debug;

use crate::errors::AccessError;
use crate::identity::{IdentityKind, IdentityOption};
use crate::interfaces::{CredentialProvider, IdentityQuery, ServiceDescriptor};
use crate::profile::PRODUCTION_MANAGEMENT_ENDPOINT;

/// Merge the identity sources into one ordered list of options.
///
/// The current user always comes first and the portal hand-off always
/// comes last. The service identity appears only when the service has
/// one. The two expansion sentinels appear only against the production
/// management endpoint, which is the only cloud supporting the
/// tenant-wide query.
pub async fn build_options(
    credentials: &dyn CredentialProvider,
    service: &dyn ServiceDescriptor,
    management_endpoint: &str,
) -> Result<Vec<IdentityOption>, AccessError> {
    let mut options = vec![];

    // 1. The signed-in principal. A credential that cannot produce a
    // token is fatal to the whole workflow.
    let token = credentials.get_token().await?;
    options.push(IdentityOption::current_user(
        &token.user_id,
        &token.object_id,
    ));

    // 2. The service's own managed identity, when enabled.
    let service_meta = service.get_service().await?;
    match &service_meta.principal_id {
        Some(principal_id) if !principal_id.is_empty() => {
            options.push(IdentityOption::service_identity(
                &service_meta.name,
                principal_id,
            ));
        }
        _ => debug!(
            "service {} has no managed identity; omitting option",
            service_meta.name
        ),
    }

    // 3. Tenant-wide managed identities. Only the production cloud
    // supports the underlying query, so other endpoints never offer
    // these.
    if management_endpoint == PRODUCTION_MANAGEMENT_ENDPOINT {
        options.push(IdentityOption::system_assigned_list());
        options.push(IdentityOption::user_assigned_list());
    }

    // 4. Portal hand-off.
    options.push(IdentityOption::manual_entry());
    Ok(options)
}

/// Expand a category sentinel into its concrete identities.
///
/// Records without a principal id cannot be granted access and are
/// dropped. An empty result is not an error; the caller treats an
/// empty pick list as a cancellation.
pub async fn expand(
    kind: IdentityKind,
    query: &dyn IdentityQuery,
) -> Result<Vec<IdentityOption>, AccessError> {
    let records = match kind {
        IdentityKind::SystemAssignedList => query.list_system_assigned_identities().await?,
        IdentityKind::UserAssignedList => query.list_user_assigned_identities().await?,
        other => {
            return Err(AccessError::Query(anyhow!(
                "{other:?} is not an expandable category"
            )))
        }
    };

    Ok(records
        .iter()
        .filter(|record| {
            record
                .principal_id
                .as_deref()
                .map_or(false, |id| !id.is_empty())
        })
        .map(IdentityOption::managed_identity)
        .collect())
}
