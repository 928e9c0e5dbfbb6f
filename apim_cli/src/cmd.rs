//! Commands for the APIM access CLI
//!

use std::path::PathBuf;

use clap::{self, Parser, Subcommand};

use apim_core::logging::LevelFilter;

/// Grant identities access to API Management authorizations
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
pub(crate) struct Args {
    #[clap(subcommand)]
    pub(crate) command: Command,
    #[clap(global = true, short = 'v', long)]
    pub(crate) log_level: Option<LevelFilter>,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Create an access policy for the configured authorization
    Grant {
        /// Path to the profile file. Defaults to ./azure_profile.yaml
        #[clap(short, long)]
        profile: Option<PathBuf>,
    },
    /// Show the principal the configured credential resolves to
    Whoami {
        /// Path to the profile file. Defaults to ./azure_profile.yaml
        #[clap(short, long)]
        profile: Option<PathBuf>,
    },
    /// Look up a directory user by email
    Lookup {
        /// The email address to look up
        email: String,
    },
}
