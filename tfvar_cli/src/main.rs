//! `tfvar` entry point: parse arguments, layer settings, generate output.

use clap::Parser;

use tfvar_cli::{Cli, CliError, Settings, logging};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    run().map_err(color_eyre::eyre::Report::from)
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;
    logging::init(settings.debug)?;
    let mut stdout = std::io::stdout().lock();
    tfvar_cli::run(&cli.dir, &settings, &mut stdout)
}
