//! Serve command handler

use anyhow::Result;
use colored::*;

use super::ServeArgs;
use crate::server;

pub async fn handle_serve_command(args: ServeArgs) -> Result<()> {
    let config = crate::global_config()?;
    let bind = args
        .bind
        .unwrap_or_else(|| config.settings.server.bind.clone());

    println!("{} on {}", "Starting airlink".green().bold(), bind.cyan());
    server::serve(config, &bind).await
}
