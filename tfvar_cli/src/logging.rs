//! Log subscriber for the binary.
//!
//! Logs go to stderr so they never mix with generated output. `RUST_LOG`
//! directives are honoured on top of the default level.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use crate::CliError;

/// The level logged when `RUST_LOG` does not say otherwise.
#[must_use]
pub const fn default_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Installs the global stderr subscriber.
///
/// # Errors
///
/// Returns [`CliError::Logging`] when a global subscriber is already set.
pub fn init(debug: bool) -> Result<(), CliError> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(debug).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;
    tracing::debug!("logger initialised");
    Ok(())
}
