//! User-facing collaborator interfaces: choice prompts and progress
//! indication.

use crate::errors::AccessError;
use crate::identity::IdentityOption;

/// Presents a single-choice list and returns the selection.
pub trait Picker: Send + Sync {
    /// Show `options` under `prompt`. `Ok(None)` means the user
    /// declined - a terminal outcome, not an error.
    fn pick(
        &self,
        options: &[IdentityOption],
        prompt: &str,
    ) -> Result<Option<IdentityOption>, AccessError>;
}

/// Runs a unit of work under a visible progress indication.
///
/// The indication is dismissed only through the returned handle, so
/// the guarded work always runs to completion or failure first.
pub trait ProgressReporter: Send + Sync {
    /// Begin an indication with the given message.
    fn start(&self, message: &str) -> Box<dyn ProgressHandle>;
}

/// The live indication returned by [`ProgressReporter::start`].
pub trait ProgressHandle: Send {
    /// Dismiss the indication, reporting success.
    fn finish(self: Box<Self>, message: &str);

    /// Dismiss the indication, reporting failure.
    fn abandon(self: Box<Self>, message: &str);
}
