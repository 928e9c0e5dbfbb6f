//!
//! Access-policy assignment for Azure API Management authorizations.
//!
//! Provides the identity model, the collaborator interfaces, and the
//! resolution workflow used to grant an identity access to an
//! authorization's credentials.
#![deny(missing_docs)]

pub use errors::AccessError;
pub use profile::{fetch_credentials, AzureProfile};
pub use workflow::{AccessPolicyAssigner, Outcome};

pub mod errors;
pub mod identity;
pub mod interfaces;
pub mod logging;
pub mod options;
pub mod profile;
pub mod project;
pub mod ui;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
