//! Records command handler

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::time::Instant;

use super::{InitialArgs, RecordsCommands, SearchArgs};
use crate::api::AirtableClient;
use crate::handlers::{
    self, FetchInitialLinkedRecordsInput, FetchRecordsForLinkedRecordsSelectorInput,
};

pub async fn handle_records_command(command: RecordsCommands) -> Result<()> {
    match command {
        RecordsCommands::Initial(args) => initial(args).await,
        RecordsCommands::Search(args) => search(args).await,
    }
}

async fn initial(args: InitialArgs) -> Result<()> {
    let config = crate::global_config()?;
    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let input: FetchInitialLinkedRecordsInput = serde_json::from_str(&content)
        .with_context(|| format!("Invalid input in {}", args.file.display()))?;

    let context = config.get_extension_context(&args.extension).await?;
    let client = AirtableClient::from_settings(&config.settings)?;

    let start = Instant::now();
    let output = handlers::fetch_initial_linked_records(
        &client,
        &context,
        config.settings.airtable.lookup_resolution_tries,
        input,
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    eprintln!(
        "{}",
        format!(
            "{} records in {:.2?}",
            output.linked_record_ids_to_airtable_records.len(),
            start.elapsed()
        )
        .dimmed()
    );
    Ok(())
}

async fn search(args: SearchArgs) -> Result<()> {
    let config = crate::global_config()?;
    let context = config.get_extension_context(&args.extension).await?;
    let client = AirtableClient::from_settings(&config.settings)?;

    let start = Instant::now();
    let output = handlers::fetch_records_for_linked_records_selector(
        &client,
        &context,
        config.settings.airtable.lookup_resolution_tries,
        FetchRecordsForLinkedRecordsSelectorInput {
            linked_record_field_name: args.field,
            search_term: args.term,
            offset: args.offset,
        },
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    let more = match &output.offset {
        Some(offset) => format!(", next page: --offset {}", offset),
        None => String::new(),
    };
    eprintln!(
        "{}",
        format!(
            "{} records in {:.2?}{}",
            output.records.len(),
            start.elapsed(),
            more
        )
        .dimmed()
    );
    Ok(())
}
