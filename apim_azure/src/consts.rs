pub const AUTH_HEADER: &str = "Authorization";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const ACCEPT_HEADER: &str = "Accept";
pub const USER_AGENT_HEADER: &str = "User-Agent";
pub const USER_AGENT: &str = "apim-access";

pub const ARM_API_VERSION: &str = "2021-08-01";
pub const RESOURCE_GRAPH_API_VERSION: &str = "2021-03-01";

/// Resources whose identity block reports a system-assigned principal.
pub const SYSTEM_ASSIGNED_QUERY: &str = "Resources \
    | where notempty(identity) and identity.type contains 'SystemAssigned' \
    | project name, principalId = tostring(identity.principalId), id";

/// Standalone user-assigned managed-identity resources.
pub const USER_ASSIGNED_QUERY: &str = "Resources \
    | where type =~ 'microsoft.managedidentity/userassignedidentities' \
    | project name, principalId = tostring(properties.principalId), id";
