//! Auto-discovery of variable definitions files.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::trace;

use crate::{ReadResultExt, TfvarResult};

const DEFAULT_FILES: [&str; 2] = ["terraform.tfvars", "terraform.tfvars.json"];
const AUTO_SUFFIXES: [&str; 2] = [".auto.tfvars", ".auto.tfvars.json"];

/// Lists the definitions files that load without being named.
///
/// `terraform.tfvars` and `terraform.tfvars.json` come first when present,
/// followed by every `*.auto.tfvars` and `*.auto.tfvars.json` file in name
/// order. Later files take precedence when collected in this order.
///
/// # Errors
///
/// Returns [`crate::TfvarError::FileRead`] when `dir` cannot be listed.
pub fn lookup_tfvars_files(dir: &Utf8Path) -> TfvarResult<Vec<Utf8PathBuf>> {
    let mut files: Vec<Utf8PathBuf> = DEFAULT_FILES
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| path.is_file())
        .collect();

    let mut auto = Vec::new();
    for item in dir.read_dir_utf8().into_read_error(dir)? {
        let entry = item.into_read_error(dir)?;
        let is_auto = AUTO_SUFFIXES
            .iter()
            .any(|suffix| entry.file_name().ends_with(suffix));
        if is_auto && !entry.file_type().into_read_error(entry.path())?.is_dir() {
            auto.push(entry.into_path());
        }
    }
    auto.sort();
    files.append(&mut auto);
    trace!(dir = %dir, ?files, "discovered definitions files");
    Ok(files)
}
