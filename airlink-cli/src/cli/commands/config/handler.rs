//! Config command handler

use anyhow::Result;
use colored::*;

use super::ConfigCommands;
use crate::config::{Settings, default_config_path};

pub fn handle_config_command(command: ConfigCommands) -> Result<()> {
    let settings = Settings::load()?;
    match command {
        ConfigCommands::Show => {
            print!("{}", settings.to_display_toml()?);
        }
        ConfigCommands::Path => {
            let config_path = default_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(no config directory)".to_string());
            println!("{} {}", "config:".bold(), config_path);
            println!(
                "{} {}",
                "database:".bold(),
                settings.database_path()?.display()
            );
        }
    }
    Ok(())
}
