use std::process::ExitCode;

use clap::Parser;
use color_eyre::Result;

use field_wizard::cli::Cli;
use field_wizard::config::Config;
use field_wizard::{errors, logging};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    errors::init()?;
    let args = Cli::parse();
    let config = Config::new()?;
    let _log_guard = logging::init(&config)?;

    if args.run(&config).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
