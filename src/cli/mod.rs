//! CLI module for the account authentication service

pub mod serve;

use clap::{Parser, Subcommand};

/// Account authentication service - registration, login and profile updates
#[derive(Parser)]
#[command(name = "account-auth-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,
}
