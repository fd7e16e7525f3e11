//! Core crate for the `tfvar` tool.
//!
//! The crate reads the `variable` blocks of a configuration directory,
//! overlays values gathered from the environment, definitions files and
//! `NAME=VALUE` strings, and writes the resolved set in one of several
//! formats.
//!
//! ```
//! use camino::Utf8Path;
//! use tfvar::collect::Overlay;
//! use tfvar::format::OutputFormat;
//!
//! let dir = tempfile::tempdir()?;
//! std::fs::write(
//!     dir.path().join("variables.tf"),
//!     "variable \"instance_name\" {\n  default = \"my-instance\"\n}\n",
//! )?;
//! let dir = Utf8Path::from_path(dir.path()).ok_or("non UTF-8 temp dir")?;
//!
//! let vars = tfvar::load(dir)?;
//! let mut overlay = Overlay::new();
//! overlay.collect_from_string("instance_name=web")?;
//! let vars = tfvar::resolve(&overlay, vars)?;
//!
//! let mut out = Vec::new();
//! OutputFormat::Tfvars.write(&mut out, &vars, true)?;
//! assert_eq!(String::from_utf8(out)?, "instance_name = \"web\"\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod collect;
pub mod config;
pub mod error;
pub mod format;
mod resolve;
mod result_ext;
pub mod value;

pub use collect::ENV_PREFIX;
pub use config::load;
pub use error::TfvarError;
pub use resolve::{Variable, resolve};
pub use result_ext::{ReadResultExt, TfvarResult, WriteResultExt};
pub use value::Value;

/// Replaces every variable's value with null, so that only collected
/// values remain.
///
/// ```
/// use tfvar::config::VariableDeclaration;
/// use tfvar::error::SourceLocation;
/// use tfvar::{Variable, clear_defaults};
///
/// let decl = VariableDeclaration::new("region", SourceLocation::new("main.tf"))
///     .with_default("eu-west-1");
/// let mut vars = vec![Variable::from(decl)];
/// clear_defaults(&mut vars);
/// assert!(vars.iter().all(|v| v.value.is_null()));
/// ```
pub fn clear_defaults(vars: &mut [Variable]) {
    for var in vars {
        var.value = Value::Null;
    }
}
