//! Loading every configuration file of a directory into a [`Module`].

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, trace, warn};

use super::{Module, parse_config_file};
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics, SourceLocation};
use crate::{ReadResultExt, TfvarError, TfvarResult, Variable};

const NATIVE_SUFFIX: &str = ".tf";
const JSON_SUFFIX: &str = ".tf.json";

/// Configuration files found in a directory, name sorted.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigDirFiles {
    /// Files that declare variables.
    pub primary: Vec<Utf8PathBuf>,
    /// `override.tf` and `*_override.tf` files, applied after the primaries.
    pub overrides: Vec<Utf8PathBuf>,
}

/// Lists the configuration files in `dir`.
///
/// Files ending in `.tf` or `.tf.json` are considered. Editor leftovers
/// (names starting with `.` or `#`, or ending in `~`) are ignored.
///
/// # Errors
///
/// Returns [`TfvarError::FileRead`] when `dir` is not a readable directory.
pub fn config_dir_files(dir: &Utf8Path) -> TfvarResult<ConfigDirFiles> {
    let mut files = ConfigDirFiles::default();
    for item in dir.read_dir_utf8().into_read_error(dir)? {
        let entry = item.into_read_error(dir)?;
        let name = entry.file_name();
        if entry.file_type().into_read_error(entry.path())?.is_dir() || is_ignored(name) {
            continue;
        }
        let Some(stem) = config_stem(name) else {
            continue;
        };
        if stem == "override" || stem.ends_with("_override") {
            files.overrides.push(entry.into_path());
        } else {
            files.primary.push(entry.into_path());
        }
    }
    files.primary.sort();
    files.overrides.sort();
    trace!(dir = %dir, primary = ?files.primary, overrides = ?files.overrides, "configuration files");
    Ok(files)
}

fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('#') || name.ends_with('~')
}

fn config_stem(name: &str) -> Option<&str> {
    name.strip_suffix(JSON_SUFFIX)
        .or_else(|| name.strip_suffix(NATIVE_SUFFIX))
}

/// Parses and merges every configuration file in `dir`.
///
/// Problems are reported as diagnostics; a missing or unreadable directory
/// yields an empty module and a `FileRead` diagnostic.
#[must_use]
pub fn load_config_dir(dir: &Utf8Path) -> (Module, Diagnostics) {
    let files = match config_dir_files(dir) {
        Ok(files) => files,
        Err(e) => {
            debug!(dir = %dir, error = %e, "configuration directory unreadable");
            let diag = Diagnostic::error(
                DiagnosticKind::FileRead,
                "Failed to read module directory",
                format!("Module directory \"{dir}\" does not exist or cannot be read."),
                Some(SourceLocation::new(dir)),
            );
            return (Module::default(), diag.into());
        }
    };

    let mut diags = Diagnostics::new();
    let mut parse_all = |paths: Vec<Utf8PathBuf>, is_override: bool| {
        paths
            .iter()
            .filter_map(|path| {
                let (file, file_diags) = parse_config_file(path, is_override);
                diags.extend(file_diags);
                file
            })
            .collect::<Vec<_>>()
    };
    let primary = parse_all(files.primary, false);
    let overrides = parse_all(files.overrides, true);

    let (module, merge_diags) = Module::new(primary, overrides);
    diags.extend(merge_diags);
    debug!(dir = %dir, variables = module.len(), diagnostics = diags.len(), "loaded module");
    (module, diags)
}

/// Loads the variables declared in `dir`, each holding its default value.
///
/// # Errors
///
/// Returns [`TfvarError::Config`] listing every diagnostic when any of them
/// is an error, so a directory with one unparsable file yields no
/// declarations at all.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
///
/// let dir = tempfile::tempdir()?;
/// std::fs::write(dir.path().join("main.tf"), "variable \"region\" {\n  default = \"eu-west-1\"\n}\n")?;
/// let dir = Utf8Path::from_path(dir.path()).ok_or("non UTF-8 temp dir")?;
/// let vars = tfvar::load(dir)?;
/// assert_eq!(vars.len(), 1);
/// assert_eq!(vars.first().map(|v| v.name.as_str()), Some("region"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn load(dir: &Utf8Path) -> TfvarResult<Vec<Variable>> {
    let (module, diags) = load_config_dir(dir);
    if diags.has_errors() {
        return Err(Arc::new(TfvarError::Config {
            dir: dir.to_owned(),
            diagnostics: diags,
        }));
    }
    for warning in &diags {
        warn!(%warning, "configuration warning");
    }
    Ok(module.into_variables().into_iter().map(Variable::from).collect())
}
