mod cli;
mod error;
mod git;
mod output;
mod router;
mod travis;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::Cli;
use error::TravlogError;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting travlog");
    if let Err(err) = cli.execute().await {
        if matches!(err, TravlogError::UnsupportedUrl) {
            let mut cmd = Cli::command();
            cmd.error(clap::error::ErrorKind::ValueValidation, err).exit();
        }
        return Err(err.into());
    }

    Ok(())
}
