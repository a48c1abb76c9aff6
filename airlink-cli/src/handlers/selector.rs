//! Search and paging for the linked-record selector widget

use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};

use super::types::{
    FetchRecordsForLinkedRecordsSelectorInput, FetchRecordsForLinkedRecordsSelectorOutput,
};
use crate::api::{AirtableApi, AirtableField, AirtableRecord, Formula, QueryBuilder, Sort};
use crate::extension::ExtensionContext;
use crate::linked_records::catalog::find_linked_record_config_by_name;
use crate::linked_records::{
    FetchFieldSet, LINKED_RECORDS_FIELD_NOT_FOUND, ResolveError, ResolveParams, fetch_in_chunks,
    linked_table_ids_to_record_ids, primary_field, resolve_fetch_field_set, shape_record,
};

/// `AND(1)` for an empty term, otherwise a case-insensitive substring match on
/// the title field
pub fn selector_filter(search_term: &str, title_field_name: &str) -> Formula {
    if search_term.is_empty() {
        Formula::and(vec![Formula::always()])
    } else {
        Formula::and(vec![Formula::contains_case_insensitive(
            title_field_name,
            search_term,
        )])
    }
}

pub async fn fetch_records_for_linked_records_selector(
    api: &dyn AirtableApi,
    context: &ExtensionContext,
    lookup_resolution_tries: u32,
    input: FetchRecordsForLinkedRecordsSelectorInput,
) -> Result<FetchRecordsForLinkedRecordsSelectorOutput> {
    let extension = &context.extension;
    let not_found = || ResolveError::NotFound(LINKED_RECORDS_FIELD_NOT_FOUND.to_string());

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

    let config = find_linked_record_config_by_name(&main_fields, &input.linked_record_field_name)
        .ok_or_else(not_found)?;
    if extension
        .form_field_named(&input.linked_record_field_name)
        .is_none()
    {
        return Err(not_found().into());
    }

    let linked_table_id = &config.options.linked_table_id;
    let linked_table = api
        .fetch_table_schema(&extension.base_id, linked_table_id, lookup_resolution_tries)
        .await
        .with_context(|| format!("Failed to fetch linked table '{}'", linked_table_id))?;
    let primary = primary_field(&linked_table)?;

    let link_field_ids = vec![config.field_id.clone()];
    let nested_field_ids = context.nested_field_ids_for(&link_field_ids);
    let fetch_set = resolve_fetch_field_set(ResolveParams {
        form_fields: &extension.state.form_fields,
        all_field_ids_to_field_names_in_base: &context.all_field_ids_to_field_names_in_base,
        primary_field_in_linked_table: primary,
        fields_in_main_table: &main_fields,
        fields_in_linked_table: &linked_table.fields,
        nested_field_ids: &nested_field_ids,
        linked_record_field_ids_in_main_table: &link_field_ids,
        title_override_field_id: config.options.title_override_field_id.as_deref(),
        subtitle_field_id: config.options.subtitle_field_id.as_deref(),
    })?;

    let title_field = fetch_set.title_field_name(&primary.name);
    let query = QueryBuilder::new(linked_table_id.as_str())
        .fields(&fetch_set.field_names_to_fetch)
        .filter(selector_filter(&input.search_term, title_field))
        .sort(Sort::asc(title_field))
        .view(config.options.view_id_for_record_selection.clone())
        .offset(input.offset.clone())
        .build();
    debug!("Selector query on {}: {:?}", linked_table_id, query);

    let page = api
        .list_records(&extension.base_id, &query)
        .await
        .with_context(|| format!("Failed to search linked table '{}'", linked_table_id))?;

    let (additional_table_ids_to_primary_fields, additional_record_ids_to_airtable_records) =
        fetch_nested_primary_values(
            api,
            context,
            lookup_resolution_tries,
            &page.records,
            &fetch_set,
            &linked_table.fields,
        )
        .await?;

    let records: Vec<AirtableRecord> = page
        .records
        .into_iter()
        .map(|record| shape_record(record, &primary.name, &fetch_set))
        .collect();

    info!(
        "Selector returned {} records for '{}' (more: {})",
        records.len(),
        input.linked_record_field_name,
        page.offset.is_some()
    );

    Ok(FetchRecordsForLinkedRecordsSelectorOutput {
        records,
        offset: page.offset,
        primary_field_in_linked_table: primary.clone(),
        linked_table_field_ids_to_airtable_fields: linked_table
            .fields
            .iter()
            .map(|field| (field.id.clone(), field.clone()))
            .collect(),
        additional_table_ids_to_primary_fields,
        additional_record_ids_to_airtable_records,
    })
}

/// Primary values of records the selector's records link to
async fn fetch_nested_primary_values(
    api: &dyn AirtableApi,
    context: &ExtensionContext,
    lookup_resolution_tries: u32,
    records: &[AirtableRecord],
    fetch_set: &FetchFieldSet,
    linked_table_fields: &[AirtableField],
) -> Result<(BTreeMap<String, AirtableField>, HashMap<String, AirtableRecord>)> {
    let base_id = &context.extension.base_id;
    let groups = linked_table_ids_to_record_ids(
        records.iter().map(|record| &record.fields),
        &fetch_set.field_names_to_fetch,
        linked_table_fields,
    );

    let mut primary_fields = BTreeMap::new();
    let mut primary_values = HashMap::new();

    for (table_id, group) in groups {
        if group.record_ids.is_empty() {
            continue;
        }
        let table = api
            .fetch_table_schema(base_id, &table_id, lookup_resolution_tries)
            .await
            .with_context(|| format!("Failed to fetch linked table '{}'", table_id))?;
        let primary = primary_field(&table)?.clone();
        let primary_only = vec![primary.name.clone()];

        let fetched =
            fetch_in_chunks(api, base_id, &table_id, &group.record_ids, &primary_only).await?;
        for (record_id, mut record) in fetched {
            record.fields.retain(|name, _| *name == primary.name);
            primary_values.insert(record_id, record);
        }
        primary_fields.insert(table_id, primary);
    }

    Ok((primary_fields, primary_values))
}
