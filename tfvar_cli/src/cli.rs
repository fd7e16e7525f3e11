//! Command-line surface of the `tfvar` binary.

use camino::Utf8PathBuf;
use clap::{ArgGroup, Parser};
use tfvar::format::OutputFormat;

/// Generate a variable definitions template for a configuration module as
/// one would write it in a definitions file (`.tfvars`).
#[derive(Debug, Default, Parser)]
#[command(
    name = "tfvar",
    bin_name = "tfvar",
    version,
    about = "Generate a template for the variable definitions of a configuration module"
)]
#[command(group(ArgGroup::new("format").args(["env_var", "resource", "workspace"])))]
pub struct Cli {
    /// Use values from `TF_VAR_*` environment variables and definitions
    /// files such as terraform.tfvars[.json] and *.auto.tfvars[.json].
    #[arg(short = 'a', long)]
    pub auto_assign: bool,

    /// Print debug log on stderr.
    #[arg(short, long)]
    pub debug: bool,

    /// Print output in `export TF_VAR_image_id='ami-abc123'` format.
    #[arg(short, long)]
    pub env_var: bool,

    /// Print output in `tfe_variable` resource format.
    #[arg(short, long)]
    pub resource: bool,

    /// Print output as payloads for the workspace variables API.
    #[arg(short, long)]
    pub workspace: bool,

    /// Do not use declared default values.
    #[arg(long)]
    pub ignore_default: bool,

    /// Omit description comments from the definitions output.
    #[arg(long)]
    pub no_comments: bool,

    /// Set a variable in the generated definitions. Can be repeated.
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,

    /// Set variables from a file. Can be repeated.
    #[arg(long = "var-file", value_name = "PATH")]
    pub var_files: Vec<Utf8PathBuf>,

    /// Path to a settings file; defaults to `.tfvar.toml` in the working
    /// directory when present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory holding the configuration module.
    #[arg(value_name = "DIR")]
    pub dir: Utf8PathBuf,
}

impl Cli {
    /// The output format chosen by flag, if any.
    #[must_use]
    pub const fn format(&self) -> Option<OutputFormat> {
        if self.env_var {
            Some(OutputFormat::EnvVars)
        } else if self.resource {
            Some(OutputFormat::TfeResource)
        } else if self.workspace {
            Some(OutputFormat::Workspace)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    //! Argument parsing.

    use anyhow::{Result, ensure};
    use clap::CommandFactory;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[rstest]
    fn parses_every_flag() -> Result<()> {
        let cli = Cli::try_parse_from([
            "tfvar",
            "-a",
            "-d",
            "-e",
            "--ignore-default",
            "--no-comments",
            "--var",
            "region=eu-west-1",
            "--var",
            "size=3",
            "--var-file",
            "prod.tfvars",
            "--config",
            "settings.toml",
            "modules/web",
        ])?;
        ensure!(cli.auto_assign && cli.debug && cli.ignore_default && cli.no_comments);
        ensure!(cli.format() == Some(OutputFormat::EnvVars));
        ensure!(cli.vars == ["region=eu-west-1", "size=3"]);
        ensure!(cli.var_files == [Utf8PathBuf::from("prod.tfvars")]);
        ensure!(cli.config.as_deref().map(camino::Utf8Path::as_str) == Some("settings.toml"));
        ensure!(cli.dir == "modules/web");
        Ok(())
    }

    #[rstest]
    #[case::none(&[], None)]
    #[case::resource(&["-r"], Some(OutputFormat::TfeResource))]
    #[case::workspace(&["--workspace"], Some(OutputFormat::Workspace))]
    fn format_flags_select_a_format(
        #[case] flags: &[&str],
        #[case] expected: Option<OutputFormat>,
    ) -> Result<()> {
        let args = ["tfvar"].iter().chain(flags).chain(&["."]).copied();
        let cli = Cli::try_parse_from(args)?;
        ensure!(cli.format() == expected, "{flags:?} gave {:?}", cli.format());
        Ok(())
    }

    #[rstest]
    #[case::env_and_resource(&["-e", "-r"])]
    #[case::resource_and_workspace(&["-r", "-w"])]
    fn format_flags_are_exclusive(#[case] flags: &[&str]) {
        let args = ["tfvar"].iter().chain(flags).chain(&["."]).copied();
        assert!(Cli::try_parse_from(args).is_err(), "{flags:?} accepted");
    }

    #[rstest]
    fn directory_is_required() {
        assert!(Cli::try_parse_from(["tfvar"]).is_err());
    }
}
