//! Azure collaborators
//!
//! The Azure-facing implementations of the workflow's collaborator
//! interfaces: AAD token acquisition, the API Management control
//! plane, the Resource Graph identity query, and the directory lookup
//! adapter.
//!
//! ```
//! use apim_azure::creds::AzureCredentials;
//!
//! let creds = AzureCredentials::default();
//! assert!(creds.validate().is_err());
//! ```

mod consts;

pub mod apim;
pub mod auth;
pub mod creds;
pub mod graph;
pub mod resource_graph;

pub use apim::ApimClient;
pub use auth::ClientCredentialProvider;
pub use graph::GraphClient;
pub use resource_graph::ResourceGraphClient;
