//! Actions the reducer understands, as posted by clients

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::state::{FormErrors, FormRecord, ScreenState};
use crate::api::{AirtableField, AirtableRecord, FieldSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    SetScreenStateForSession {
        extension_session_id: String,
        screen_state: ScreenState,
    },
    UpdateRecord {
        extension_session_id: String,
        form_record: FormRecord,
    },
    UpdateRecordValue {
        extension_session_id: String,
        airtable_field: AirtableField,
        value: Value,
    },
    UpdateFormErrors {
        extension_session_id: String,
        form_errors: FormErrors,
    },
    UpdateHasUnsavedChanges {
        extension_session_id: String,
        has_unsaved_changes: bool,
    },
    AddMorePrimaryValuesUsingPrimaryFieldsAndRecords {
        linked_record_ids_to_airtable_records: HashMap<String, AirtableRecord>,
    },
    AddMoreLinkedRecordIdsToPrimaryValues {
        linked_record_ids_to_primary_values: BTreeMap<String, FieldSet>,
    },
    LinkedRecordIdsToPrimaryValuesFailed {
        message: String,
    },
}

impl Action {
    /// Session the action targets; `None` for primary-value cache actions
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Action::SetScreenStateForSession {
                extension_session_id,
                ..
            }
            | Action::UpdateRecord {
                extension_session_id,
                ..
            }
            | Action::UpdateRecordValue {
                extension_session_id,
                ..
            }
            | Action::UpdateFormErrors {
                extension_session_id,
                ..
            }
            | Action::UpdateHasUnsavedChanges {
                extension_session_id,
                ..
            } => Some(extension_session_id),
            Action::AddMorePrimaryValuesUsingPrimaryFieldsAndRecords { .. }
            | Action::AddMoreLinkedRecordIdsToPrimaryValues { .. }
            | Action::LinkedRecordIdsToPrimaryValuesFailed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_posted_action() {
        let action: Action = serde_json::from_value(json!({
            "type": "updateHasUnsavedChanges",
            "payload": { "extensionSessionId": "s1", "hasUnsavedChanges": true }
        }))
        .unwrap();

        assert_eq!(action.session_id(), Some("s1"));
        assert!(matches!(
            action,
            Action::UpdateHasUnsavedChanges {
                has_unsaved_changes: true,
                ..
            }
        ));
    }

    #[test]
    fn test_cache_actions_have_no_session() {
        let action: Action = serde_json::from_value(json!({
            "type": "linkedRecordIdsToPrimaryValuesFailed",
            "payload": { "message": "timeout" }
        }))
        .unwrap();
        assert_eq!(action.session_id(), None);
    }
}
