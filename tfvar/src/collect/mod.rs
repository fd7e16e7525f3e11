//! Gathering candidate values for variables from every input source.
//!
//! Sources are pushed into an [`Overlay`] in precedence order: the
//! environment, auto-discovered files, `--var-file` files, then `--var`
//! strings. A later value for a name replaces an earlier one.

mod discovery;
mod overlay;

use std::fmt;

use crate::value::Value;

pub use discovery::lookup_tfvars_files;
pub use overlay::{Overlay, OverlayEntry};

/// Prefix marking environment variables that carry variable values.
pub const ENV_PREFIX: &str = "TF_VAR_";

/// Where an overlay entry came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Provenance {
    /// A `TF_VAR_<name>` environment variable.
    Environment,
    /// An auto-discovered `terraform.tfvars` or `*.auto.tfvars` file.
    AutoFile,
    /// A file named with `--var-file`.
    VarFile,
    /// A `--var NAME=VALUE` argument.
    Cli,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Environment => "environment",
            Self::AutoFile => "auto file",
            Self::VarFile => "var file",
            Self::Cli => "command line",
        })
    }
}

/// A value expression read from a variable definitions file.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceExpression {
    /// An attribute expression from a native syntax file.
    Hcl(hcl::Expression),
    /// A value from a JSON syntax file.
    Json(serde_json::Value),
}

impl SourceExpression {
    /// Evaluates the expression with no variables or functions in scope.
    ///
    /// # Errors
    ///
    /// Returns the evaluator's message when a native expression refers to
    /// anything beyond literals and operators.
    pub fn evaluate(&self) -> Result<Value, String> {
        match self {
            Self::Hcl(expr) => Value::evaluate(expr),
            Self::Json(json) => Ok(Value::from(json.clone())),
        }
    }
}

/// A candidate value for one variable, before interpretation.
#[derive(Clone, Debug, PartialEq)]
pub enum OverrideValue {
    /// A raw string from the environment or the command line. How it is
    /// read depends on the variable's parsing mode.
    Raw {
        /// Variable name.
        name: String,
        /// Text after the first `=`.
        raw: String,
    },
    /// An expression from a definitions file.
    Expression(SourceExpression),
}
