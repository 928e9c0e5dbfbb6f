//! Hand-written collaborator mocks shared by the option-builder and
//! workflow tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::errors::AccessError;
use crate::identity::{AccessPolicyRequest, IdentityOption, IdentityRecord};
use crate::interfaces::{
    CredentialProvider, IdentityQuery, PolicyStore, ServiceDescriptor, ServiceMetadata,
    TokenClaims,
};
use crate::ui::{Picker, ProgressHandle, ProgressReporter};

pub(crate) const GUID_USER: &str = "11111111-1111-1111-1111-111111111111";
pub(crate) const GUID_SERVICE: &str = "22222222-2222-2222-2222-222222222222";
pub(crate) const GUID_PRINCIPAL: &str = "33333333-3333-3333-3333-333333333333";
pub(crate) const GUID_TENANT: &str = "44444444-4444-4444-4444-444444444444";

pub(crate) struct MockCredentials {
    claims: Option<TokenClaims>,
}

impl MockCredentials {
    pub(crate) fn user(user_id: &str) -> Self {
        Self {
            claims: Some(TokenClaims {
                user_id: user_id.to_owned(),
                object_id: GUID_USER.to_owned(),
            }),
        }
    }

    pub(crate) fn failing() -> Self {
        Self { claims: None }
    }
}

#[async_trait]
impl CredentialProvider for MockCredentials {
    async fn get_token(&self) -> Result<TokenClaims, AccessError> {
        self.claims
            .clone()
            .ok_or_else(|| AccessError::Authentication(anyhow!("mock credential failure")))
    }
}

pub(crate) struct MockService {
    metadata: ServiceMetadata,
}

impl MockService {
    pub(crate) fn with_identity(name: &str) -> Self {
        Self {
            metadata: ServiceMetadata {
                name: name.to_owned(),
                principal_id: Some(GUID_SERVICE.to_owned()),
            },
        }
    }

    pub(crate) fn without_identity(name: &str) -> Self {
        Self {
            metadata: ServiceMetadata {
                name: name.to_owned(),
                principal_id: None,
            },
        }
    }
}

#[async_trait]
impl ServiceDescriptor for MockService {
    async fn get_service(&self) -> Result<ServiceMetadata, AccessError> {
        Ok(self.metadata.clone())
    }
}

pub(crate) struct MockQuery {
    system: Vec<IdentityRecord>,
    user: Vec<IdentityRecord>,
}

impl MockQuery {
    pub(crate) fn system_assigned(rows: Vec<(&str, Option<&str>)>) -> Self {
        Self {
            system: Self::records(rows),
            user: vec![],
        }
    }

    pub(crate) fn user_assigned(rows: Vec<(&str, Option<&str>)>) -> Self {
        Self {
            system: vec![],
            user: Self::records(rows),
        }
    }

    fn records(rows: Vec<(&str, Option<&str>)>) -> Vec<IdentityRecord> {
        rows.into_iter()
            .map(|(name, principal_id)| IdentityRecord {
                name: name.to_owned(),
                principal_id: principal_id.map(str::to_owned),
                id: format!("/subscriptions/s/resourceGroups/g/providers/x/{name}"),
            })
            .collect()
    }
}

#[async_trait]
impl IdentityQuery for MockQuery {
    async fn list_system_assigned_identities(&self) -> Result<Vec<IdentityRecord>, AccessError> {
        Ok(self.system.clone())
    }

    async fn list_user_assigned_identities(&self) -> Result<Vec<IdentityRecord>, AccessError> {
        Ok(self.user.clone())
    }
}

#[derive(Default)]
pub(crate) struct RecordingStore {
    pub(crate) created: Mutex<Vec<AccessPolicyRequest>>,
    pub(crate) refreshes: AtomicUsize,
    pub(crate) reject: bool,
}

impl RecordingStore {
    pub(crate) fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }

    pub(crate) fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub(crate) fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PolicyStore for RecordingStore {
    async fn create_access_policy(
        &self,
        request: &AccessPolicyRequest,
    ) -> Result<(), AccessError> {
        if self.reject {
            return Err(AccessError::Submission(anyhow!("mock store rejection")));
        }
        self.created.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn refresh(&self) -> Result<(), AccessError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Replays a fixed script of selections, by index into the offered
/// list. `None` plays a declined prompt.
pub(crate) struct ScriptedPicker {
    choices: Mutex<VecDeque<Option<usize>>>,
}

impl ScriptedPicker {
    pub(crate) fn new(choices: Vec<Option<usize>>) -> Self {
        Self {
            choices: Mutex::new(choices.into()),
        }
    }
}

impl Picker for ScriptedPicker {
    fn pick(
        &self,
        options: &[IdentityOption],
        _prompt: &str,
    ) -> Result<Option<IdentityOption>, AccessError> {
        let choice = self
            .choices
            .lock()
            .unwrap()
            .pop_front()
            .expect("picker script exhausted");
        Ok(choice.map(|index| options[index].clone()))
    }
}

pub(crate) struct SilentProgress;

struct SilentHandle;

impl ProgressReporter for SilentProgress {
    fn start(&self, _message: &str) -> Box<dyn ProgressHandle> {
        Box::new(SilentHandle)
    }
}

impl ProgressHandle for SilentHandle {
    fn finish(self: Box<Self>, _message: &str) {}
    fn abandon(self: Box<Self>, _message: &str) {}
}
