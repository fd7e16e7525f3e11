//! Error types produced while loading, collecting, resolving and writing
//! variables.

mod constructors;
mod diagnostics;
mod types;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity, SourceLocation};
pub use types::TfvarError;
