//! Layered settings for a `tfvar` invocation.
//!
//! Values are merged from lowest to highest precedence: built-in defaults,
//! the settings file (`--config`, or `.tfvar.toml` in the working
//! directory), `TFVAR_*` environment variables, then the flags given on
//! the command line. `TF_VAR_*` variables are never read as settings.

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tfvar::format::OutputFormat;

use crate::{Cli, CliError};

/// Prefix of environment variables holding settings.
pub const SETTINGS_ENV_PREFIX: &str = "TFVAR_";

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = ".tfvar.toml";

/// Everything that controls one run, apart from the module directory.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Collect `TF_VAR_*` variables and auto-discovered definitions files.
    pub auto_assign: bool,
    /// Log at debug level.
    pub debug: bool,
    /// Output format.
    pub format: OutputFormat,
    /// Replace declared defaults with null before collecting values.
    pub ignore_default: bool,
    /// Leave description comments out of definitions output.
    pub no_comments: bool,
    /// `NAME=VALUE` strings, applied last.
    pub var: Vec<String>,
    /// Definitions files, applied after auto-discovered files.
    pub var_file: Vec<Utf8PathBuf>,
}

/// Flags passed on the command line. Unset flags are left out so that
/// lower layers show through.
#[derive(Serialize)]
struct CliLayer<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_assign: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_comments: Option<bool>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    var: &'a [String],
    #[serde(skip_serializing_if = "<[Utf8PathBuf]>::is_empty")]
    var_file: &'a [Utf8PathBuf],
}

impl<'a> From<&'a Cli> for CliLayer<'a> {
    fn from(cli: &'a Cli) -> Self {
        Self {
            auto_assign: cli.auto_assign.then_some(true),
            debug: cli.debug.then_some(true),
            format: cli.format(),
            ignore_default: cli.ignore_default.then_some(true),
            no_comments: cli.no_comments.then_some(true),
            var: &cli.vars,
            var_file: &cli.var_files,
        }
    }
}

impl Settings {
    /// Merges every settings layer for `cli`.
    ///
    /// Lists given on the command line replace lists from lower layers.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingSettingsFile`] when `--config` names a
    /// file that does not exist and [`CliError::Settings`] when a layer
    /// cannot be read or holds a value of the wrong type.
    pub fn load(cli: &Cli) -> Result<Self, CliError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = settings_file(cli.config.as_deref())? {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX))
            .merge(Serialized::defaults(CliLayer::from(cli)))
            .extract()
            .map_err(|e| CliError::Settings(Box::new(e)))
    }
}

fn settings_file(explicit: Option<&Utf8Path>) -> Result<Option<Utf8PathBuf>, CliError> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(Some(path.to_owned()))
        } else {
            Err(CliError::MissingSettingsFile(path.to_owned()))
        };
    }
    let discovered = Utf8Path::new(SETTINGS_FILE);
    Ok(discovered.is_file().then(|| discovered.to_owned()))
}
