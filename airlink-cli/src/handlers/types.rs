//! Request and response bodies of the linked-record handlers

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::api::{AirtableField, AirtableRecord};
use crate::linked_records::LinkedRecordGroup;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchInitialLinkedRecordsInput {
    #[serde(default)]
    pub linked_table_ids_to_record_ids: BTreeMap<String, LinkedRecordGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchInitialLinkedRecordsOutput {
    pub linked_record_ids_to_airtable_records: HashMap<String, AirtableRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRecordsForLinkedRecordsSelectorInput {
    pub linked_record_field_name: String,
    #[serde(default)]
    pub search_term: String,
    /// Cursor returned by the previous page
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRecordsForLinkedRecordsSelectorOutput {
    /// Records reshaped to `{Name, subtitle?}`
    pub records: Vec<AirtableRecord>,
    pub offset: Option<String>,
    pub primary_field_in_linked_table: AirtableField,
    pub linked_table_field_ids_to_airtable_fields: BTreeMap<String, AirtableField>,
    /// Primary fields of tables linked from the returned records
    pub additional_table_ids_to_primary_fields: BTreeMap<String, AirtableField>,
    /// Primary values of records linked from the returned records
    pub additional_record_ids_to_airtable_records: HashMap<String, AirtableRecord>,
}
