//! Identity candidates offered for selection and the resolved
//! principal handed to the policy store.
//!

use std::fmt::Display;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const CURRENT_USER_DETAIL: &str = "Current User";
const SERVICE_IDENTITY_DETAIL: &str = "Current Service managed identity";
const SYSTEM_ASSIGNED_LABEL: &str = "System Assigned managed identities...";
const USER_ASSIGNED_LABEL: &str = "User Assigned managed identities...";
const MANUAL_ENTRY_LABEL: &str = "Navigate to Azure Portal...";

/// The source category an identity option belongs to.
///
/// A closed set - every dispatch site matches exhaustively, so a new
/// category cannot be added without visiting each of them.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityKind {
    /// The signed-in principal.
    CurrentUser,
    /// The managed identity of the service under management.
    ServiceIdentity,
    /// Sentinel: expands into the tenant's system-assigned identities.
    SystemAssignedList,
    /// Sentinel: expands into the tenant's user-assigned identities.
    UserAssignedList,
    /// Sentinel: leave the flow and finish in the portal instead.
    ManualEntry,
    /// A concrete managed identity produced by an expansion.
    ManagedIdentity,
}

impl IdentityKind {
    /// Whether this option stands for a category that expands into a
    /// second pick list rather than a concrete principal.
    pub fn is_expandable(&self) -> bool {
        matches!(
            self,
            IdentityKind::SystemAssignedList | IdentityKind::UserAssignedList
        )
    }

    /// Whether an option of this kind carries no object id of its own.
    pub fn is_sentinel(&self) -> bool {
        self.is_expandable() || matches!(self, IdentityKind::ManualEntry)
    }
}

/// One selectable entry in the identity pick list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityOption {
    /// Label shown to the user. Becomes the policy name on selection.
    pub display_name: String,
    /// Directory object id. `None` for sentinels.
    pub object_id: Option<String>,
    /// Secondary line: source description or resource id.
    pub detail: String,
    /// Source category.
    pub kind: IdentityKind,
}

impl IdentityOption {
    /// The signed-in principal, resolved from the active credential.
    pub fn current_user(user_id: &str, object_id: &str) -> Self {
        Self {
            display_name: user_id.to_owned(),
            object_id: Some(object_id.to_owned()),
            detail: CURRENT_USER_DETAIL.to_owned(),
            kind: IdentityKind::CurrentUser,
        }
    }

    /// The service's own managed identity.
    pub fn service_identity(service_name: &str, principal_id: &str) -> Self {
        Self {
            display_name: service_name.to_owned(),
            object_id: Some(principal_id.to_owned()),
            detail: SERVICE_IDENTITY_DETAIL.to_owned(),
            kind: IdentityKind::ServiceIdentity,
        }
    }

    /// Sentinel for the system-assigned identity expansion.
    pub fn system_assigned_list() -> Self {
        Self {
            display_name: SYSTEM_ASSIGNED_LABEL.to_owned(),
            object_id: None,
            detail: String::new(),
            kind: IdentityKind::SystemAssignedList,
        }
    }

    /// Sentinel for the user-assigned identity expansion.
    pub fn user_assigned_list() -> Self {
        Self {
            display_name: USER_ASSIGNED_LABEL.to_owned(),
            object_id: None,
            detail: String::new(),
            kind: IdentityKind::UserAssignedList,
        }
    }

    /// Sentinel for finishing the grant in the portal.
    pub fn manual_entry() -> Self {
        Self {
            display_name: MANUAL_ENTRY_LABEL.to_owned(),
            object_id: None,
            detail: String::new(),
            kind: IdentityKind::ManualEntry,
        }
    }

    /// A concrete managed identity projected from a query record.
    ///
    /// The caller is expected to have dropped records without a
    /// principal id before projecting.
    pub fn managed_identity(record: &IdentityRecord) -> Self {
        Self {
            display_name: record.name.to_owned(),
            object_id: record.principal_id.to_owned(),
            detail: record.id.to_owned(),
            kind: IdentityKind::ManagedIdentity,
        }
    }
}

impl Display for IdentityOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.display_name)
        } else {
            write!(f, "{} ({})", self.display_name, self.detail)
        }
    }
}

/// A raw Resource Graph row describing a managed identity.
///
/// Transient - lives only for the expansion call that fetched it.
#[derive(Clone, Debug, Deserialize)]
pub struct IdentityRecord {
    /// Resource name.
    pub name: String,
    /// Directory principal id. Absent when the identity is disabled.
    #[serde(rename = "principalId")]
    pub principal_id: Option<String>,
    /// Fully-qualified resource id.
    pub id: String,
}

/// The (displayName, objectId, tenantId) triple an access policy is
/// recorded against.
///
/// Only produced from a concrete (non-sentinel) option. Both ids are
/// validated as GUIDs on construction and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
    display_name: String,
    object_id: String,
    tenant_id: String,
}

impl ResolvedIdentity {
    /// Validate and construct.
    pub fn new(display_name: String, object_id: String, tenant_id: String) -> Result<Self> {
        guid_shaped("object id", &object_id)?;
        guid_shaped("tenant id", &tenant_id)?;
        Ok(Self {
            display_name,
            object_id,
            tenant_id,
        })
    }

    /// Build a resolved principal from a selected option.
    ///
    /// The tenant id comes from the resource context, never from the
    /// identity itself. Sentinel options are rejected.
    pub fn from_option(option: &IdentityOption, tenant_id: &str) -> Result<Self> {
        if option.kind.is_sentinel() {
            return Err(anyhow!(
                "a category option cannot be resolved into a principal"
            ));
        }
        let object_id = option
            .object_id
            .to_owned()
            .ok_or_else(|| anyhow!("selected identity is missing an object id"))?;
        Self::new(
            option.display_name.to_owned(),
            object_id,
            tenant_id.to_owned(),
        )
    }

    /// The principal's display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The directory object id the grant is recorded against.
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// The tenant the grant is scoped to.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

/// A single access-policy grant, built once per workflow invocation
/// and handed off to the policy store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccessPolicyRequest {
    /// Policy name, derived from the principal's display name.
    pub policy_name: String,
    /// The principal being granted access.
    pub principal: ResolvedIdentity,
}

impl AccessPolicyRequest {
    /// Derive a request from a resolved principal.
    pub fn new(principal: ResolvedIdentity) -> Result<Self> {
        if principal.display_name().is_empty() {
            return Err(anyhow!("policy name would be empty"));
        }
        Ok(Self {
            policy_name: principal.display_name().to_owned(),
            principal,
        })
    }
}

fn guid_shaped(field: &str, value: &str) -> Result<()> {
    Uuid::parse_str(value)
        .map(|_| ())
        .with_context(|| format!("{field} {value:?} is not a valid GUID"))
}
