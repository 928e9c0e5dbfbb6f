//! The service-facing interfaces the workflow is driven against.
//!
//! Every network collaborator sits behind one of these traits so the
//! workflow can be exercised against mocks. Implementations live in
//! the `apim_azure` crate.

use async_trait::async_trait;

use crate::errors::AccessError;
use crate::identity::{AccessPolicyRequest, IdentityRecord};

/// Claims resolved from the active credential.
#[derive(Clone, Debug)]
pub struct TokenClaims {
    /// The signed-in principal's display id (UPN or application name).
    pub user_id: String,
    /// The signed-in principal's directory object id.
    pub object_id: String,
}

/// Metadata for the service whose authorization is being granted.
#[derive(Clone, Debug, Default)]
pub struct ServiceMetadata {
    /// The service's resource name.
    pub name: String,
    /// The service's managed-identity principal id, if identity is
    /// enabled on the resource.
    pub principal_id: Option<String>,
}

/// Produces tokens for the signed-in principal.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Resolve the signed-in principal. Fails with
    /// [`AccessError::Authentication`] when no token can be produced.
    async fn get_token(&self) -> Result<TokenClaims, AccessError>;
}

/// Exposes the managed service's own metadata.
#[async_trait]
pub trait ServiceDescriptor: Send + Sync {
    /// Fetch the service resource. A service without a managed
    /// identity is not an error.
    async fn get_service(&self) -> Result<ServiceMetadata, AccessError>;
}

/// Tenant-wide managed-identity enumeration.
#[async_trait]
pub trait IdentityQuery: Send + Sync {
    /// List resources carrying a system-assigned managed identity.
    async fn list_system_assigned_identities(&self) -> Result<Vec<IdentityRecord>, AccessError>;

    /// List user-assigned managed-identity resources.
    async fn list_user_assigned_identities(&self) -> Result<Vec<IdentityRecord>, AccessError>;
}

/// The external store access policies are committed to.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Record the grant. Ownership of the request transfers to the
    /// store; it is never resubmitted.
    async fn create_access_policy(&self, request: &AccessPolicyRequest)
        -> Result<(), AccessError>;

    /// Post-commit verification read of the policy collection.
    async fn refresh(&self) -> Result<(), AccessError>;
}
