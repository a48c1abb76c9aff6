//! Command-line interface

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::extension::ExtensionCommands;
use commands::records::RecordsCommands;
use commands::serve::ServeArgs;

#[derive(Debug, Parser)]
#[command(name = "airlink", version, about = "Linked-record resolution for hosted Airtable forms")]
pub struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Manage registered extensions
    #[command(subcommand)]
    Extension(ExtensionCommands),
    /// Run the linked-record handlers from the terminal
    #[command(subcommand)]
    Records(RecordsCommands),
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

impl Commands {
    /// Whether the command needs the extension database
    pub fn needs_database(&self) -> bool {
        !matches!(self, Commands::Config(_))
    }
}

pub async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Serve(args) => commands::serve::handle_serve_command(args).await,
        Commands::Extension(args) => commands::extension::handle_extension_command(args).await,
        Commands::Records(args) => commands::records::handle_records_command(args).await,
        Commands::Config(args) => commands::config::handle_config_command(args),
    }
}
