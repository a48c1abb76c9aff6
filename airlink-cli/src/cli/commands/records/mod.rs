mod handler;

use clap::{Args, Subcommand};
use std::path::PathBuf;

pub use handler::handle_records_command;

#[derive(Debug, Subcommand)]
pub enum RecordsCommands {
    /// Titles and subtitles for already linked records
    Initial(InitialArgs),
    /// One page of selector search results
    Search(SearchArgs),
}

#[derive(Debug, Args)]
pub struct InitialArgs {
    #[arg(short, long)]
    pub extension: String,

    /// JSON file with `linkedTableIdsToRecordIds`
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(short, long)]
    pub extension: String,

    /// Linked-record field name in the form's table
    #[arg(long)]
    pub field: String,

    #[arg(short, long, default_value = "")]
    pub term: String,

    /// Cursor from a previous page
    #[arg(long)]
    pub offset: Option<String>,
}
