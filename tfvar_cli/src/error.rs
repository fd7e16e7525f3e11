//! Errors reported by the `tfvar` binary.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use tfvar::TfvarError;

/// Failures that end a `tfvar` run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// Loading, collecting, resolving or writing variables failed.
    #[error(transparent)]
    Tfvar(#[from] Arc<TfvarError>),

    /// The settings layers could not be merged.
    #[error("failed to load settings: {0}")]
    Settings(#[source] Box<figment::Error>),

    /// `--config` named a file that does not exist.
    #[error("settings file '{0}' does not exist")]
    MissingSettingsFile(Utf8PathBuf),

    /// The log subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
