//! Logging utilities for CLI-wide output to stderr.
//!

// Re-exports for convenience
pub use tracing::metadata::LevelFilter;
pub use tracing::{debug, error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Set up basic logging.
///
/// An explicit `level` wins; otherwise `RUST_LOG` is honored, and
/// everything defaults to INFO. Output goes to stderr so prompt
/// rendering on stdout stays clean.
pub fn setup(level: Option<LevelFilter>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    debug!("logging set up");
}
