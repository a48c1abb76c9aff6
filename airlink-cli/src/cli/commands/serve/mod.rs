mod handler;

use clap::Args;

pub use handler::handle_serve_command;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (defaults to [server].bind)
    #[arg(long)]
    pub bind: Option<String>,
}
