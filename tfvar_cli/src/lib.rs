//! Command-line front end for the `tfvar` library.
//!
//! [`Cli`] describes the arguments, [`Settings`] layers them over the
//! settings file and environment, and [`run`] drives the pipeline: load
//! the module, optionally drop defaults, collect values, resolve them and
//! write the chosen format.

mod cli;
mod error;
pub mod logging;
mod settings;

use std::io::Write;

use camino::Utf8Path;
use tfvar::collect::Overlay;
use tracing::debug;

pub use cli::Cli;
pub use error::CliError;
pub use settings::{SETTINGS_ENV_PREFIX, SETTINGS_FILE, Settings};

/// Generates definitions for the module in `dir` and writes them to `out`.
///
/// Values are collected from the environment and auto-discovered files
/// (only with `auto_assign`), then each `var_file`, then each `var`; later
/// sources win.
///
/// # Errors
///
/// Returns the first failure from loading, collecting, resolving or
/// writing.
pub fn run<W: Write + ?Sized>(
    dir: &Utf8Path,
    settings: &Settings,
    out: &mut W,
) -> Result<(), CliError> {
    let mut vars = tfvar::load(dir)?;
    vars.sort_by(|a, b| a.name.cmp(&b.name));

    if settings.ignore_default {
        debug!("replacing values with null");
        tfvar::clear_defaults(&mut vars);
    }

    let mut overlay = Overlay::new();
    if settings.auto_assign {
        debug!("collecting values from environment variables");
        overlay.collect_from_env();
        overlay.collect_from_auto_files(dir)?;
    }
    for path in &settings.var_file {
        overlay.collect_from_file(path)?;
    }
    for raw in &settings.var {
        overlay.collect_from_string(raw)?;
    }

    let resolved = tfvar::resolve(&overlay, vars)?;
    settings
        .format
        .write(out, &resolved, !settings.no_comments)?;
    Ok(())
}
