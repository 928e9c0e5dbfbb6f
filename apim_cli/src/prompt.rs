//! Interactive single-choice prompt.

use anyhow::anyhow;
use inquire::{InquireError, Select};

use apim_core::errors::AccessError;
use apim_core::identity::IdentityOption;
use apim_core::ui::Picker;

/// Terminal picker backed by `inquire`. Esc or Ctrl-C declines the
/// prompt; declining is an outcome, not an error.
pub(crate) struct InquirePicker;

impl Picker for InquirePicker {
    fn pick(
        &self,
        options: &[IdentityOption],
        prompt: &str,
    ) -> Result<Option<IdentityOption>, AccessError> {
        match Select::new(prompt, options.to_vec()).prompt_skippable() {
            Ok(choice) => Ok(choice),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(e) => Err(AccessError::Prompt(anyhow!(e))),
        }
    }
}
