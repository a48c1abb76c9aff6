//! Public extension UI state

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::api::{AirtableField, FieldSet};

/// Validation messages keyed by field name
pub type FormErrors = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionScreen {
    Loading,
    PasswordRequired,
    FormLoaded,
    FormSubmitted,
}

impl fmt::Display for ExtensionScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtensionScreen::Loading => "LOADING",
            ExtensionScreen::PasswordRequired => "PASSWORD_REQUIRED",
            ExtensionScreen::FormLoaded => "FORM_LOADED",
            ExtensionScreen::FormSubmitted => "FORM_SUBMITTED",
        };
        f.write_str(name)
    }
}

/// Outcome of loading or submitting a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScreenResult<T> {
    Success { data: T },
    Failure { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    /// Absent while the form creates a new record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(default)]
    pub data: FieldSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedForm {
    pub form_record: FormRecord,
    #[serde(default)]
    pub field_names_to_schemas: BTreeMap<String, AirtableField>,
    #[serde(default)]
    pub form_errors: FormErrors,
}

impl LoadedForm {
    pub fn has_field(&self, name: &str) -> bool {
        self.field_names_to_schemas
            .values()
            .any(|schema| schema.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

/// Per-session screen, tagged by `extensionScreen`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "extensionScreen",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ScreenState {
    Loading,
    PasswordRequired,
    FormLoaded {
        result: ScreenResult<LoadedForm>,
        #[serde(default)]
        has_unsaved_changes: bool,
    },
    FormSubmitted {
        result: ScreenResult<SubmittedForm>,
    },
}

impl ScreenState {
    pub fn screen(&self) -> ExtensionScreen {
        match self {
            ScreenState::Loading => ExtensionScreen::Loading,
            ScreenState::PasswordRequired => ExtensionScreen::PasswordRequired,
            ScreenState::FormLoaded { .. } => ExtensionScreen::FormLoaded,
            ScreenState::FormSubmitted { .. } => ExtensionScreen::FormSubmitted,
        }
    }
}

/// Cache of linked records' primary values, shared by all sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LinkedRecordIdsToPrimaryValues {
    #[default]
    NotLoaded,
    Loaded {
        data: BTreeMap<String, FieldSet>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_message: Option<String>,
    },
    Failed {
        error_message: String,
    },
}

impl LinkedRecordIdsToPrimaryValues {
    /// Loaded data so far, empty unless loaded
    pub fn loaded_data(&self) -> BTreeMap<String, FieldSet> {
        match self {
            LinkedRecordIdsToPrimaryValues::Loaded { data, .. } => data.clone(),
            _ => BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicExtensionState {
    pub session_ids_to_screen_states: HashMap<String, ScreenState>,
    pub linked_record_ids_to_primary_values: LinkedRecordIdsToPrimaryValues,
}
