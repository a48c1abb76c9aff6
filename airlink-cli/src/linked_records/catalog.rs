//! Field catalog lookups over a table's schema

use log::warn;

use super::error::ResolveError;
use crate::api::{AirtableField, LinkedRecordOptions, TableSchema};

pub const LINKED_RECORDS_FIELD_NOT_FOUND: &str =
    "Could not fetch records because the linked records field was not found in the table.";

/// A linked-record field and its options
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedRecordConfig {
    pub field_id: String,
    pub field_name: String,
    pub options: LinkedRecordOptions,
}

impl LinkedRecordConfig {
    fn from_field(field: &AirtableField) -> Option<Self> {
        field.linked_record_options().map(|options| Self {
            field_id: field.id.clone(),
            field_name: field.name.clone(),
            options: options.clone(),
        })
    }
}

/// Every linked-record field, in schema order
pub fn linked_record_configs(fields: &[AirtableField]) -> Vec<LinkedRecordConfig> {
    fields
        .iter()
        .filter_map(LinkedRecordConfig::from_field)
        .collect()
}

/// First linked-record field in schema order
pub fn find_linked_record_config(fields: &[AirtableField]) -> Option<LinkedRecordConfig> {
    fields.iter().find_map(LinkedRecordConfig::from_field)
}

pub fn find_linked_record_config_by_name(
    fields: &[AirtableField],
    name: &str,
) -> Option<LinkedRecordConfig> {
    fields
        .iter()
        .filter(|field| field.name == name)
        .find_map(LinkedRecordConfig::from_field)
}

pub fn find_linked_record_config_by_id(
    fields: &[AirtableField],
    field_id: &str,
) -> Option<LinkedRecordConfig> {
    fields
        .iter()
        .filter(|field| field.id == field_id)
        .find_map(LinkedRecordConfig::from_field)
}

/// First-match lookup that treats absence as an error and warns when the
/// choice was ambiguous
pub fn require_linked_record_config(
    fields: &[AirtableField],
) -> Result<LinkedRecordConfig, ResolveError> {
    let configs = linked_record_configs(fields);
    if configs.len() > 1 {
        warn!(
            "Table has {} linked record fields, using the first one ('{}')",
            configs.len(),
            configs[0].field_name
        );
    }
    configs
        .into_iter()
        .next()
        .ok_or_else(|| ResolveError::NotFound(LINKED_RECORDS_FIELD_NOT_FOUND.to_string()))
}

/// The table's primary field
pub fn primary_field(table: &TableSchema) -> Result<&AirtableField, ResolveError> {
    table
        .fields
        .iter()
        .find(|field| field.id == table.primary_field_id)
        .ok_or_else(|| {
            ResolveError::schema_drift(format!(
                "Unable to find the primary field of table '{}' in Airtable.",
                table.name
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FieldConfig;

    fn text(id: &str, name: &str) -> AirtableField {
        AirtableField::new(
            id,
            name,
            FieldConfig::Other {
                field_type: "singleLineText".to_string(),
                options: None,
            },
        )
    }

    fn link(id: &str, name: &str, table: &str) -> AirtableField {
        AirtableField::new(
            id,
            name,
            FieldConfig::MultipleRecordLinks(LinkedRecordOptions {
                linked_table_id: table.to_string(),
                title_override_field_id: Some(format!("{}Title", id)),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_single_link_field_is_found() {
        let fields = vec![text("fldName", "Name"), link("fldCo", "Company", "tblCo")];

        let config = find_linked_record_config(&fields).unwrap();
        assert_eq!(config.field_id, "fldCo");
        assert_eq!(config.options.linked_table_id, "tblCo");
        assert_eq!(
            config.options.title_override_field_id.as_deref(),
            Some("fldCoTitle")
        );
    }

    #[test]
    fn test_no_link_field_is_none() {
        let fields = vec![text("fldName", "Name"), text("fldNotes", "Notes")];
        assert!(find_linked_record_config(&fields).is_none());
        assert_eq!(
            require_linked_record_config(&fields),
            Err(ResolveError::NotFound(LINKED_RECORDS_FIELD_NOT_FOUND.to_string()))
        );
    }

    #[test]
    fn test_first_match_wins_and_disambiguation() {
        let fields = vec![
            link("fldCo", "Company", "tblCo"),
            text("fldName", "Name"),
            link("fldTags", "Tags", "tblTags"),
        ];

        assert_eq!(linked_record_configs(&fields).len(), 2);
        assert_eq!(require_linked_record_config(&fields).unwrap().field_id, "fldCo");
        assert_eq!(
            find_linked_record_config_by_name(&fields, "Tags")
                .unwrap()
                .field_id,
            "fldTags"
        );
        assert_eq!(
            find_linked_record_config_by_id(&fields, "fldTags")
                .unwrap()
                .field_name,
            "Tags"
        );
        // Name exists but isn't a link field
        assert!(find_linked_record_config_by_name(&fields, "Name").is_none());
    }

    #[test]
    fn test_primary_field() {
        let table = TableSchema {
            id: "tblCo".to_string(),
            name: "Companies".to_string(),
            primary_field_id: "fldName".to_string(),
            fields: vec![text("fldCity", "City"), text("fldName", "Name")],
        };
        assert_eq!(primary_field(&table).unwrap().name, "Name");

        let broken = TableSchema {
            primary_field_id: "fldGone".to_string(),
            ..table
        };
        assert!(matches!(
            primary_field(&broken),
            Err(ResolveError::SchemaDrift(_))
        ));
    }
}
