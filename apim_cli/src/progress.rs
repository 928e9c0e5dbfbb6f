//! Spinner-backed progress indication.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use apim_core::ui::{ProgressHandle, ProgressReporter};

pub(crate) struct IndicatifReporter;

struct SpinnerHandle(ProgressBar);

impl ProgressReporter for IndicatifReporter {
    fn start(&self, message: &str) -> Box<dyn ProgressHandle> {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_owned());
        bar.enable_steady_tick(Duration::from_millis(120));
        Box::new(SpinnerHandle(bar))
    }
}

impl ProgressHandle for SpinnerHandle {
    fn finish(self: Box<Self>, message: &str) {
        self.0.finish_with_message(message.to_owned());
    }

    fn abandon(self: Box<Self>, message: &str) {
        self.0.abandon_with_message(message.to_owned());
    }
}
