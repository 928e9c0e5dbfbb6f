//! Failure classes surfaced by the workflow's collaborators.
//!

use thiserror::Error;

/// The closed set of failures the assignment workflow can end with.
///
/// User cancellation is deliberately absent: declining a prompt is a
/// recognized terminal outcome ([`crate::workflow::Outcome::Cancelled`]),
/// not an error.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The active credential could not produce a token. Fatal to the
    /// whole workflow.
    #[error("authentication failed: {0}")]
    Authentication(anyhow::Error),

    /// A service or identity query could not be completed. Fatal to
    /// the stage that issued it.
    #[error("identity query failed: {0}")]
    Query(anyhow::Error),

    /// The policy store rejected the access-policy request. The
    /// workflow ends cleanly and does not retry.
    #[error("access policy submission failed: {0}")]
    Submission(anyhow::Error),

    /// An interactive prompt could not be shown or read.
    #[error("prompt failed: {0}")]
    Prompt(anyhow::Error),
}
