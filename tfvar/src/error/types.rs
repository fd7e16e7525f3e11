//! Primary error enum for the variable pipeline.

use camino::Utf8PathBuf;
use thiserror::Error;

use super::Diagnostics;

/// Errors that abort the current invocation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TfvarError {
    /// A file could not be read.
    #[error("failed to read '{path}': {source}")]
    FileRead {
        /// Path that failed to load.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A file or value string is not valid configuration syntax.
    #[error("failed to parse '{path}': {message}")]
    Syntax {
        /// File (or pseudo path for inline values) that failed to parse.
        path: Utf8PathBuf,
        /// Parser message.
        message: String,
    },

    /// A `NAME=VALUE` string had no `=`.
    #[error("bad var string '{raw}': expected NAME=VALUE")]
    MalformedOverrideString {
        /// The offending literal as supplied.
        raw: String,
    },

    /// An override value could not be interpreted for its variable.
    #[error("invalid value for variable '{name}': {message}")]
    ExpressionEvaluation {
        /// Variable the value was meant for.
        name: String,
        /// Evaluation or conversion failure.
        message: String,
    },

    /// A non-nullable variable received a null value.
    #[error("invalid value for variable '{name}': a null value is not valid when nullable=false")]
    NullabilityViolation {
        /// Variable that received null.
        name: String,
    },

    /// Writing to the output stream failed.
    #[error("failed to write {format} output: {source}")]
    Write {
        /// Name of the output format being written.
        format: &'static str,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Loading a configuration directory produced error diagnostics.
    #[error("failed to load configuration in '{dir}':\n{diagnostics}")]
    Config {
        /// Directory that was loaded.
        dir: Utf8PathBuf,
        /// All diagnostics gathered while loading, errors and warnings.
        diagnostics: Diagnostics,
    },
}
