//! Titles and subtitles for the linked records a loaded form already references

use anyhow::{Context, Result};
use log::{debug, info};

use super::types::{FetchInitialLinkedRecordsInput, FetchInitialLinkedRecordsOutput};
use crate::api::AirtableApi;
use crate::extension::ExtensionContext;
use crate::linked_records::catalog::{find_linked_record_config_by_id, require_linked_record_config};
use crate::linked_records::{
    ResolveParams, fetch_in_chunks, primary_field, resolve_fetch_field_set, shape_record,
};

pub async fn fetch_initial_linked_records(
    api: &dyn AirtableApi,
    context: &ExtensionContext,
    lookup_resolution_tries: u32,
    input: FetchInitialLinkedRecordsInput,
) -> Result<FetchInitialLinkedRecordsOutput> {
    let extension = &context.extension;
    let main_table = api
        .fetch_table_schema(
            &extension.base_id,
            &extension.state.table_id,
            lookup_resolution_tries,
        )
        .await
        .context("Failed to fetch the form's table")?;

    let mut main_fields = main_table.fields;
    extension.apply_link_display_overrides(&mut main_fields);
    let default_config = require_linked_record_config(&main_fields)?;

    let mut output = FetchInitialLinkedRecordsOutput::default();

    for (linked_table_id, group) in &input.linked_table_ids_to_record_ids {
        if group.record_ids.is_empty() {
            continue;
        }

        // Prefer the link field the group came through
        let config = group
            .linked_record_field_ids_in_main_table
            .iter()
            .find_map(|id| find_linked_record_config_by_id(&main_fields, id))
            .unwrap_or_else(|| default_config.clone());

        let linked_table = api
            .fetch_table_schema(&extension.base_id, linked_table_id, lookup_resolution_tries)
            .await
            .with_context(|| format!("Failed to fetch linked table '{}'", linked_table_id))?;
        let primary = primary_field(&linked_table)?;
        let nested_field_ids =
            context.nested_field_ids_for(&group.linked_record_field_ids_in_main_table);

        let fetch_set = resolve_fetch_field_set(ResolveParams {
            form_fields: &extension.state.form_fields,
            all_field_ids_to_field_names_in_base: &context.all_field_ids_to_field_names_in_base,
            primary_field_in_linked_table: primary,
            fields_in_main_table: &main_fields,
            fields_in_linked_table: &linked_table.fields,
            nested_field_ids: &nested_field_ids,
            linked_record_field_ids_in_main_table: &group.linked_record_field_ids_in_main_table,
            title_override_field_id: config.options.title_override_field_id.as_deref(),
            subtitle_field_id: config.options.subtitle_field_id.as_deref(),
        })?;
        debug!(
            "Fetching {:?} for {} records of {}",
            fetch_set.field_names_to_fetch,
            group.record_ids.len(),
            linked_table_id
        );

        let records = fetch_in_chunks(
            api,
            &extension.base_id,
            linked_table_id,
            &group.record_ids,
            &fetch_set.field_names_to_fetch,
        )
        .await?;

        for (record_id, record) in records {
            output
                .linked_record_ids_to_airtable_records
                .insert(record_id, shape_record(record, &primary.name, &fetch_set));
        }
    }

    info!(
        "Resolved {} initial linked records for extension {}",
        output.linked_record_ids_to_airtable_records.len(),
        extension.id
    );
    Ok(output)
}
