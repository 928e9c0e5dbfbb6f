//! APIM access CLI
//!

#![deny(missing_docs)]

mod cmd;
mod grant;
mod progress;
mod prompt;

use anyhow::Result;
use clap::Parser;

use apim_core::logging;
use cmd::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup(args.log_level);

    match &args.command {
        Command::Grant { profile } => {
            grant::grant(profile).await?;
        }
        Command::Whoami { profile } => {
            grant::whoami(profile).await?;
        }
        Command::Lookup { email } => {
            grant::lookup(email).await?;
        }
    }

    Ok(())
}
