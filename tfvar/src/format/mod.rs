//! Serialisation of resolved variables.
//!
//! Every writer renders the whole output before writing it and reports the
//! first write failure.

mod flatten;
mod render;

use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collect::ENV_PREFIX;
use crate::value::Value;
use crate::{TfvarResult, Variable, WriteResultExt};

pub use flatten::{flatten, inline};
use render::{Document, quote};

/// The supported output formats.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Variable definitions, `name = value`.
    #[default]
    Tfvars,
    /// Shell `export TF_VAR_name='value'` lines.
    EnvVars,
    /// Workspace variable API payloads.
    Workspace,
    /// `tfe_variable` resource blocks.
    TfeResource,
}

impl OutputFormat {
    /// Writes `vars` to `w` in this format.
    ///
    /// `with_comments` only affects [`OutputFormat::Tfvars`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::TfvarError::Write`] when writing fails.
    pub fn write<W: Write + ?Sized>(
        self,
        w: &mut W,
        vars: &[Variable],
        with_comments: bool,
    ) -> TfvarResult<()> {
        debug!(format = ?self, count = vars.len(), "writing variables");
        match self {
            Self::Tfvars => write_tfvars(w, vars, with_comments),
            Self::EnvVars => write_env_vars(w, vars),
            Self::Workspace => write_workspace_payload(w, vars),
            Self::TfeResource => write_tfe_resource(w, vars),
        }
    }
}

/// Writes variable definitions, one `name = value` per variable.
///
/// With `with_comments`, a non-empty description is written above its
/// variable as `#` comment lines.
///
/// # Errors
///
/// Returns [`crate::TfvarError::Write`] when writing fails.
///
/// # Examples
///
/// ```
/// use tfvar::config::VariableDeclaration;
/// use tfvar::error::SourceLocation;
/// use tfvar::format::write_tfvars;
/// use tfvar::Variable;
///
/// let decl = VariableDeclaration::new("region", SourceLocation::new("main.tf"))
///     .with_description("AWS region")
///     .with_default("eu-west-1");
/// let mut out = Vec::new();
/// write_tfvars(&mut out, &[Variable::from(decl)], true)?;
/// assert_eq!(String::from_utf8_lossy(&out), "# AWS region\nregion = \"eu-west-1\"\n");
/// # Ok::<_, std::sync::Arc<tfvar::TfvarError>>(())
/// ```
pub fn write_tfvars<W: Write + ?Sized>(
    w: &mut W,
    vars: &[Variable],
    with_comments: bool,
) -> TfvarResult<()> {
    let mut doc = Document::new();
    for var in vars {
        let description = var.description.trim();
        if with_comments && !description.is_empty() {
            for line in description.split('\n') {
                doc.comment(0, line);
            }
        }
        doc.attribute(0, &var.name, &var.value);
    }
    w.write_all(doc.finish().as_bytes()).into_write_error("tfvars")
}

/// Writes one `export TF_VAR_<name>='<value>'` line per variable.
///
/// # Errors
///
/// Returns [`crate::TfvarError::Write`] when writing fails.
pub fn write_env_vars<W: Write + ?Sized>(w: &mut W, vars: &[Variable]) -> TfvarResult<()> {
    let mut out = String::new();
    for var in vars {
        out.push_str(&format!(
            "export {ENV_PREFIX}{}='{}'\n",
            var.name,
            flatten(&var.value)
        ));
    }
    w.write_all(out.as_bytes()).into_write_error("environment")
}

#[derive(Serialize)]
struct WorkspacePayload<'a> {
    data: WorkspaceData<'a>,
}

#[derive(Serialize)]
struct WorkspaceData<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    attributes: WorkspaceAttributes<'a>,
}

#[derive(Serialize)]
struct WorkspaceAttributes<'a> {
    key: &'a str,
    value: String,
    description: &'a str,
    category: &'static str,
    hcl: bool,
    sensitive: bool,
}

/// Writes one pretty-printed workspace variable payload per variable.
///
/// The value is flattened with double quotes replaced by single quotes.
///
/// # Errors
///
/// Returns [`crate::TfvarError::Write`] when serialising or writing fails.
pub fn write_workspace_payload<W: Write + ?Sized>(
    w: &mut W,
    vars: &[Variable],
) -> TfvarResult<()> {
    let mut out = Vec::new();
    for var in vars {
        let payload = WorkspacePayload {
            data: WorkspaceData {
                kind: "vars",
                attributes: WorkspaceAttributes {
                    key: &var.name,
                    value: flatten(&var.value).replace('"', "'"),
                    description: &var.description,
                    category: "terraform",
                    hcl: false,
                    sensitive: var.sensitive,
                },
            },
        };
        serde_json::to_writer_pretty(&mut out, &payload)
            .map_err(std::io::Error::from)
            .into_write_error("workspace")?;
        out.push(b'\n');
    }
    w.write_all(&out).into_write_error("workspace")
}

/// Writes a `tfe_variable` resource block per variable, each preceded by
/// a blank line.
///
/// # Errors
///
/// Returns [`crate::TfvarError::Write`] when writing fails.
pub fn write_tfe_resource<W: Write + ?Sized>(w: &mut W, vars: &[Variable]) -> TfvarResult<()> {
    let mut doc = Document::new();
    for var in vars {
        doc.blank();
        doc.open(0, format!("resource \"tfe_variable\" {} {{", quote(&var.name)));
        doc.attribute(1, "key", &var.name.as_str().into());
        doc.attribute(1, "value", &var.value);
        doc.attribute(1, "sensitive", &var.sensitive.into());
        doc.attribute(1, "description", &var.description.as_str().into());
        doc.attribute(1, "workspace_id", &Value::Null);
        doc.attribute(1, "category", &"terraform".into());
        doc.plain(0, "}");
    }
    w.write_all(doc.finish().as_bytes()).into_write_error("tfe_variable")
}

#[cfg(test)]
mod tests;
