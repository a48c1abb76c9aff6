//! Extension command handler

use anyhow::{Context, Result};
use colored::*;
use std::fs;

use super::{AddArgs, ExtensionCommands};
use crate::config::repository::extensions::NewExtension;

pub async fn handle_extension_command(command: ExtensionCommands) -> Result<()> {
    match command {
        ExtensionCommands::Add(args) => add(args).await,
        ExtensionCommands::List => list().await,
        ExtensionCommands::Remove { id } => remove(&id).await,
    }
}

async fn add(args: AddArgs) -> Result<()> {
    let config = crate::global_config()?;
    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let mut extension: NewExtension = serde_json::from_str(&content)
        .with_context(|| format!("Invalid extension definition in {}", args.file.display()))?;

    if args.password.is_some() {
        extension.password = args.password;
    }

    config.save_extension(&extension).await?;
    println!(
        "{} extension {} ({} form fields{})",
        "Saved".green().bold(),
        extension.id.cyan(),
        extension.state.form_fields.len(),
        if extension.password.is_some() {
            ", password protected"
        } else {
            ""
        }
    );
    Ok(())
}

async fn list() -> Result<()> {
    let config = crate::global_config()?;
    let extensions = config.list_extensions().await?;

    if extensions.is_empty() {
        println!("{}", "No extensions registered".dimmed());
        return Ok(());
    }

    for extension in extensions {
        let lock = if extension.password_protected {
            " [password]".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{}  {}/{}  {} fields{}",
            extension.id.cyan().bold(),
            extension.base_id,
            extension.state.table_id,
            extension.state.form_fields.len(),
            lock
        );
    }
    Ok(())
}

async fn remove(id: &str) -> Result<()> {
    let config = crate::global_config()?;
    if config.delete_extension(id).await? {
        println!("{} extension {}", "Removed".green().bold(), id.cyan());
        Ok(())
    } else {
        anyhow::bail!("Extension '{}' not found", id)
    }
}
