//! Chunked fetching of linked records by ID

use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::error::ResolveError;
use crate::api::{AirtableApi, AirtableRecord};

/// Airtable rejects formulas matching more records than fit on one page
pub const MAX_RECORDS_PER_REQUEST: usize = 100;

static RECORD_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^rec[A-Za-z0-9]{14}$").expect("record ID pattern is valid"));

pub fn is_valid_record_id(id: &str) -> bool {
    RECORD_ID.is_match(id)
}

fn validate_record_ids(record_ids: &[String]) -> Result<(), ResolveError> {
    match record_ids.iter().find(|id| !is_valid_record_id(id)) {
        Some(invalid) => Err(ResolveError::InvalidInput(format!(
            "'{}' is not a valid Airtable record ID.",
            invalid
        ))),
        None => Ok(()),
    }
}

/// Fetch records by ID, at most [`MAX_RECORDS_PER_REQUEST`] per call, one call
/// after another. Any failed chunk fails the whole fetch.
pub async fn fetch_in_chunks(
    api: &dyn AirtableApi,
    base_id: &str,
    table_id: &str,
    record_ids: &[String],
    field_names_to_fetch: &[String],
) -> Result<HashMap<String, AirtableRecord>> {
    validate_record_ids(record_ids)?;

    let mut records = HashMap::with_capacity(record_ids.len());
    for (index, chunk) in record_ids.chunks(MAX_RECORDS_PER_REQUEST).enumerate() {
        debug!(
            "Fetching chunk {} ({} records) from {}",
            index + 1,
            chunk.len(),
            table_id
        );
        let fetched = api
            .fetch_records_by_ids(base_id, table_id, chunk, field_names_to_fetch)
            .await
            .with_context(|| format!("Failed to fetch linked records from table '{}'", table_id))?;
        records.extend(fetched);
    }

    Ok(records)
}
