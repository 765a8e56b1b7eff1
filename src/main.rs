use clap::Parser;
use log::*;
use std::process::ExitCode;

use releasewatch::{cli, command, config::Config, error::Result, logging};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    let config = Config::load(
        cli_args.config.as_deref(),
        cli_args.project_root.as_deref(),
    )?;

    logging::initialize_logger(
        cli_args.debug,
        &config.resolve(&config.paths.logs_dir),
        cli_args.command.log_file(),
    )?;

    match command::execute(&cli_args.command, config).await {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(e) => {
            error!("{}", e);
            Err(e)
        }
    }
}
