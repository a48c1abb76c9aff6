mod handler;

use clap::Subcommand;

pub use handler::handle_config_command;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration (API key masked)
    Show,
    /// Print where the config file and database live
    Path,
}
