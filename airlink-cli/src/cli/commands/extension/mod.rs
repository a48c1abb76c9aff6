mod handler;

use clap::{Args, Subcommand};
use std::path::PathBuf;

pub use handler::handle_extension_command;

#[derive(Debug, Subcommand)]
pub enum ExtensionCommands {
    /// Register or replace an extension from a JSON definition
    Add(AddArgs),
    /// List registered extensions
    List,
    /// Remove an extension
    Remove {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// JSON file with the extension definition
    #[arg(short, long)]
    pub file: PathBuf,

    /// Password required by the handlers (overrides one in the file)
    #[arg(short, long)]
    pub password: Option<String>,
}
