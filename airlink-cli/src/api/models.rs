//! Airtable schema and record models
//!
//! Fields travel over the wire in the meta API shape `{id, name, type, options}`
//! and are converted into a typed [`FieldConfig`] on deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field values of a record, keyed by field name
pub type FieldSet = Map<String, Value>;

/// Airtable type name of linked-record fields
pub const MULTIPLE_RECORD_LINKS: &str = "multipleRecordLinks";
/// Airtable type name of lookup fields
pub const MULTIPLE_LOOKUP_VALUES: &str = "multipleLookupValues";

/// A single field in a table schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAirtableField", into = "RawAirtableField")]
pub struct AirtableField {
    pub id: String,
    pub name: String,
    pub config: FieldConfig,
}

/// Typed field configuration, discriminated by the Airtable field type
#[derive(Debug, Clone, PartialEq)]
pub enum FieldConfig {
    /// Link to records in another table
    MultipleRecordLinks(LinkedRecordOptions),
    /// Value surfaced from a linked record's field
    MultipleLookupValues(LookupOptions),
    /// Any other Airtable type, kept verbatim
    Other {
        field_type: String,
        options: Option<Value>,
    },
}

/// Options of a linked-record field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedRecordOptions {
    pub linked_table_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_override_field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_id_for_record_selection: Option<String>,
    /// Options not modelled here (`isReversed`, `inverseLinkFieldId`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Options of a lookup field
///
/// Airtable omits `recordLinkFieldId` while a freshly created lookup is still
/// being computed, so both IDs are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_link_field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id_in_linked_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_valid: Option<bool>,
    /// Options not modelled here, such as the lookup's `result` type
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire representation used by the Airtable meta API
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAirtableField {
    id: String,
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Value>,
}

impl From<RawAirtableField> for AirtableField {
    fn from(raw: RawAirtableField) -> Self {
        let config = FieldConfig::from_parts(raw.field_type, raw.options);
        Self {
            id: raw.id,
            name: raw.name,
            config,
        }
    }
}

impl From<AirtableField> for RawAirtableField {
    fn from(field: AirtableField) -> Self {
        let field_type = field.config.type_name().to_string();
        let options = match field.config {
            FieldConfig::MultipleRecordLinks(options) => serde_json::to_value(options).ok(),
            FieldConfig::MultipleLookupValues(options) => serde_json::to_value(options).ok(),
            FieldConfig::Other { options, .. } => options,
        };
        Self {
            id: field.id,
            name: field.name,
            field_type,
            options,
        }
    }
}

impl FieldConfig {
    /// Build a typed config from the raw type name and options.
    /// Options that don't parse for a known type fall back to `Other`.
    pub fn from_parts(field_type: String, options: Option<Value>) -> Self {
        match field_type.as_str() {
            MULTIPLE_RECORD_LINKS => {
                match options
                    .clone()
                    .map(serde_json::from_value::<LinkedRecordOptions>)
                {
                    Some(Ok(parsed)) => Self::MultipleRecordLinks(parsed),
                    _ => Self::Other {
                        field_type,
                        options,
                    },
                }
            }
            MULTIPLE_LOOKUP_VALUES => {
                let parsed = options
                    .clone()
                    .map(serde_json::from_value::<LookupOptions>)
                    .unwrap_or_else(|| Ok(LookupOptions::default()));
                match parsed {
                    Ok(parsed) => Self::MultipleLookupValues(parsed),
                    Err(_) => Self::Other {
                        field_type,
                        options,
                    },
                }
            }
            _ => Self::Other {
                field_type,
                options,
            },
        }
    }

    /// Airtable type name for this config
    pub fn type_name(&self) -> &str {
        match self {
            Self::MultipleRecordLinks(_) => MULTIPLE_RECORD_LINKS,
            Self::MultipleLookupValues(_) => MULTIPLE_LOOKUP_VALUES,
            Self::Other { field_type, .. } => field_type,
        }
    }
}

impl AirtableField {
    pub fn new(id: impl Into<String>, name: impl Into<String>, config: FieldConfig) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            config,
        }
    }

    pub fn linked_record_options(&self) -> Option<&LinkedRecordOptions> {
        match &self.config {
            FieldConfig::MultipleRecordLinks(options) => Some(options),
            _ => None,
        }
    }

    pub fn lookup_options(&self) -> Option<&LookupOptions> {
        match &self.config {
            FieldConfig::MultipleLookupValues(options) => Some(options),
            _ => None,
        }
    }

    /// Lookup whose source link is not known yet
    pub fn is_unresolved_lookup(&self) -> bool {
        self.lookup_options()
            .is_some_and(|options| options.record_link_field_id.is_none())
    }
}

/// Schema of one table in a base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub id: String,
    pub name: String,
    pub primary_field_id: String,
    #[serde(default)]
    pub fields: Vec<AirtableField>,
}

impl TableSchema {
    pub fn has_unresolved_lookups(&self) -> bool {
        self.fields.iter().any(AirtableField::is_unresolved_lookup)
    }
}

/// Response of `GET /v0/meta/bases/{baseId}/tables`
#[derive(Debug, Clone, Deserialize)]
pub struct BaseSchemaResponse {
    pub tables: Vec<TableSchema>,
}

/// A record as returned by the records API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirtableRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: FieldSet,
}

impl AirtableRecord {
    pub fn new(id: impl Into<String>, fields: FieldSet) -> Self {
        Self {
            id: id.into(),
            created_time: None,
            fields,
        }
    }
}
