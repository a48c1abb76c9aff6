//! Extension definitions
//!
//! An extension is a hosted form bound to one table of a base. Besides the
//! declared form fields it carries per-link display overrides (title and
//! subtitle fields) that are merged into the live Airtable schema before any
//! linked-record resolution.

pub mod password;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::api::{AirtableField, FieldConfig};

/// A field the form declares, captured when the form was last synced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    /// Airtable type at sync time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

/// How records of a linked-record field are displayed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDisplayOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_override_field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_field_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionState {
    pub table_id: String,
    #[serde(default)]
    pub form_fields: Vec<FormField>,
    /// Keyed by linked-record field ID in the main table
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub link_display_overrides: HashMap<String, LinkDisplayOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub id: String,
    pub base_id: String,
    pub state: ExtensionState,
    #[serde(default)]
    pub password_protected: bool,
}

impl Extension {
    pub fn form_field_named(&self, name: &str) -> Option<&FormField> {
        self.state.form_fields.iter().find(|field| field.name == name)
    }

    /// Merge the configured title/subtitle overrides into linked-record fields
    pub fn apply_link_display_overrides(&self, fields: &mut [AirtableField]) {
        for field in fields.iter_mut() {
            let Some(display) = self.state.link_display_overrides.get(&field.id) else {
                continue;
            };
            if let FieldConfig::MultipleRecordLinks(options) = &mut field.config {
                if display.title_override_field_id.is_some() {
                    options.title_override_field_id = display.title_override_field_id.clone();
                }
                if display.subtitle_field_id.is_some() {
                    options.subtitle_field_id = display.subtitle_field_id.clone();
                }
            }
        }
    }
}

/// An extension together with the base-wide field maps its handlers need
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionContext {
    pub extension: Extension,
    pub all_field_ids_to_field_names_in_base: HashMap<String, String>,
    /// Field IDs referenced inside each main-table field's form configuration
    pub field_ids_to_nested_field_ids: HashMap<String, Vec<String>>,
}

impl ExtensionContext {
    /// Union of the nested field IDs of the given link fields, in order
    pub fn nested_field_ids_for(&self, link_field_ids: &[String]) -> Vec<String> {
        let mut nested: Vec<String> = Vec::new();
        for field_id in link_field_ids {
            for id in self
                .field_ids_to_nested_field_ids
                .get(field_id)
                .into_iter()
                .flatten()
            {
                if !nested.contains(id) {
                    nested.push(id.clone());
                }
            }
        }
        nested
    }
}

/// Extension lookup and password verification failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    UnknownExtension(String),
    InvalidPassword,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::UnknownExtension(id) => write!(f, "Extension '{}' not found.", id),
            AuthError::InvalidPassword => write!(f, "Invalid password."),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LinkedRecordOptions;

    fn extension() -> Extension {
        let mut overrides = HashMap::new();
        overrides.insert(
            "fldLink".to_string(),
            LinkDisplayOverride {
                title_override_field_id: Some("fldTitle".to_string()),
                subtitle_field_id: None,
            },
        );
        Extension {
            id: "ext1".to_string(),
            base_id: "appBase".to_string(),
            state: ExtensionState {
                table_id: "tblMain".to_string(),
                form_fields: vec![FormField {
                    name: "Company".to_string(),
                    field_id: Some("fldLink".to_string()),
                    field_type: Some("multipleRecordLinks".to_string()),
                }],
                link_display_overrides: overrides,
            },
            password_protected: false,
        }
    }

    #[test]
    fn test_overrides_merge_into_link_options() {
        let mut fields = vec![
            AirtableField::new(
                "fldLink",
                "Company",
                FieldConfig::MultipleRecordLinks(LinkedRecordOptions {
                    linked_table_id: "tblCompanies".to_string(),
                    subtitle_field_id: Some("fldCity".to_string()),
                    ..Default::default()
                }),
            ),
            AirtableField::new(
                "fldOther",
                "Other",
                FieldConfig::MultipleRecordLinks(LinkedRecordOptions {
                    linked_table_id: "tblOther".to_string(),
                    ..Default::default()
                }),
            ),
        ];

        extension().apply_link_display_overrides(&mut fields);

        let options = fields[0].linked_record_options().unwrap();
        assert_eq!(options.title_override_field_id.as_deref(), Some("fldTitle"));
        // Unset override keeps the live value
        assert_eq!(options.subtitle_field_id.as_deref(), Some("fldCity"));
        assert_eq!(
            fields[1].linked_record_options().unwrap().title_override_field_id,
            None
        );
    }

    #[test]
    fn test_nested_field_ids_union() {
        let mut nested = HashMap::new();
        nested.insert("fldA".to_string(), vec!["fld1".to_string(), "fld2".to_string()]);
        nested.insert("fldB".to_string(), vec!["fld2".to_string(), "fld3".to_string()]);
        let context = ExtensionContext {
            extension: extension(),
            all_field_ids_to_field_names_in_base: HashMap::new(),
            field_ids_to_nested_field_ids: nested,
        };

        let ids = context.nested_field_ids_for(&[
            "fldA".to_string(),
            "fldMissing".to_string(),
            "fldB".to_string(),
        ]);
        assert_eq!(ids, vec!["fld1", "fld2", "fld3"]);
    }

    #[test]
    fn test_state_parses_from_camel_case() {
        let state: ExtensionState = serde_json::from_value(serde_json::json!({
            "tableId": "tblMain",
            "formFields": [{ "name": "Company", "fieldType": "multipleRecordLinks" }],
            "linkDisplayOverrides": { "fldLink": { "subtitleFieldId": "fldCity" } }
        }))
        .unwrap();

        assert_eq!(state.form_fields[0].field_id, None);
        assert_eq!(
            state.link_display_overrides["fldLink"].subtitle_field_id.as_deref(),
            Some("fldCity")
        );
    }
}
