//! Record IDs referenced from linked-record fields of fetched records

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::api::{AirtableField, FieldSet};

/// Record IDs to fetch from one linked table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedRecordGroup {
    #[serde(default)]
    pub record_ids: Vec<String>,
    /// Link fields through which the records are referenced
    #[serde(default)]
    pub linked_record_field_ids_in_main_table: Vec<String>,
}

impl LinkedRecordGroup {
    fn add(&mut self, record_id: &str, field_id: &str) {
        if !self.record_ids.iter().any(|id| id == record_id) {
            self.record_ids.push(record_id.to_string());
        }
        if !self
            .linked_record_field_ids_in_main_table
            .iter()
            .any(|id| id == field_id)
        {
            self.linked_record_field_ids_in_main_table
                .push(field_id.to_string());
        }
    }
}

/// Group the record IDs held by link fields in `records_fields` by linked
/// table. Only link fields named in `allowed_field_names` are considered.
pub fn linked_table_ids_to_record_ids<'a, I>(
    records_fields: I,
    allowed_field_names: &[String],
    fields: &[AirtableField],
) -> BTreeMap<String, LinkedRecordGroup>
where
    I: IntoIterator<Item = &'a FieldSet>,
{
    let link_fields: Vec<(&AirtableField, &str)> = fields
        .iter()
        .filter(|field| allowed_field_names.contains(&field.name))
        .filter_map(|field| {
            field
                .linked_record_options()
                .map(|options| (field, options.linked_table_id.as_str()))
        })
        .collect();

    let mut groups: BTreeMap<String, LinkedRecordGroup> = BTreeMap::new();
    if link_fields.is_empty() {
        return groups;
    }

    for record_fields in records_fields {
        for (field, linked_table_id) in &link_fields {
            let Some(Value::Array(values)) = record_fields.get(&field.name) else {
                continue;
            };
            for record_id in values.iter().filter_map(Value::as_str) {
                groups
                    .entry(linked_table_id.to_string())
                    .or_default()
                    .add(record_id, &field.id);
            }
        }
    }

    groups
}
