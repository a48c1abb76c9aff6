//! State transitions of the public extension UI

use std::fmt;

use super::action::Action;
use super::state::{
    ExtensionScreen, LinkedRecordIdsToPrimaryValues, PublicExtensionState, ScreenResult,
    ScreenState,
};
use crate::linked_records::need_to_sync_base_message;

/// Calls that are invalid for the current state. These are client bugs, not
/// user errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReducerError {
    SessionNotFound(String),
    InvalidScreen(ExtensionScreen),
    RecordNotLoaded,
    NotLoaded(&'static str),
    SchemaDrift(String),
}

impl fmt::Display for ReducerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReducerError::SessionNotFound(_) => {
                write!(f, "Invalid call. This is not meant to be used on undefined screen.")
            }
            ReducerError::InvalidScreen(screen) => write!(
                f,
                "Invalid call. This is not meant to be used on {} screen.",
                screen
            ),
            ReducerError::RecordNotLoaded => write!(f, "Record not loaded successfully"),
            ReducerError::NotLoaded(what) => write!(
                f,
                "Could not update {} because the extension is not loaded.",
                what
            ),
            ReducerError::SchemaDrift(detail) => write!(f, "{}", need_to_sync_base_message(detail)),
        }
    }
}

impl std::error::Error for ReducerError {}

fn session<'a>(
    state: &'a mut PublicExtensionState,
    session_id: &str,
) -> Result<&'a mut ScreenState, ReducerError> {
    state
        .session_ids_to_screen_states
        .get_mut(session_id)
        .ok_or_else(|| ReducerError::SessionNotFound(session_id.to_string()))
}

/// Apply one action. On error the state is left untouched.
pub fn reduce(state: &mut PublicExtensionState, action: Action) -> Result<(), ReducerError> {
    match action {
        Action::SetScreenStateForSession {
            extension_session_id,
            screen_state,
        } => {
            state
                .session_ids_to_screen_states
                .insert(extension_session_id, screen_state);
        }

        Action::UpdateRecord {
            extension_session_id,
            form_record,
        } => match session(state, &extension_session_id)? {
            ScreenState::FormLoaded { result, .. } => match result {
                ScreenResult::Success { data } => data.form_record = form_record,
                ScreenResult::Failure { .. } => return Err(ReducerError::RecordNotLoaded),
            },
            other => return Err(ReducerError::InvalidScreen(other.screen())),
        },

        Action::UpdateRecordValue {
            extension_session_id,
            airtable_field,
            value,
        } => match session(state, &extension_session_id)? {
            ScreenState::FormLoaded {
                result,
                has_unsaved_changes,
            } => {
                let ScreenResult::Success { data } = result else {
                    return Err(ReducerError::NotLoaded("record value"));
                };
                if !data.has_field(&airtable_field.name) {
                    return Err(ReducerError::SchemaDrift(format!(
                        "Could not find field '{}' in Airtable.",
                        airtable_field.name
                    )));
                }
                data.form_record.data.insert(airtable_field.name, value);
                *has_unsaved_changes = true;
            }
            other => return Err(ReducerError::InvalidScreen(other.screen())),
        },

        Action::UpdateFormErrors {
            extension_session_id,
            form_errors,
        } => match session(state, &extension_session_id)? {
            ScreenState::FormLoaded { result, .. } => match result {
                ScreenResult::Success { data } => data.form_errors = form_errors,
                ScreenResult::Failure { .. } => return Err(ReducerError::NotLoaded("form errors")),
            },
            other => return Err(ReducerError::InvalidScreen(other.screen())),
        },

        Action::UpdateHasUnsavedChanges {
            extension_session_id,
            has_unsaved_changes: value,
        } => match session(state, &extension_session_id)? {
            ScreenState::FormLoaded {
                has_unsaved_changes,
                ..
            } => *has_unsaved_changes = value,
            other => return Err(ReducerError::InvalidScreen(other.screen())),
        },

        Action::AddMorePrimaryValuesUsingPrimaryFieldsAndRecords {
            linked_record_ids_to_airtable_records,
        } => {
            let mut data = state.linked_record_ids_to_primary_values.loaded_data();
            for (record_id, record) in linked_record_ids_to_airtable_records {
                data.insert(record_id, record.fields);
            }
            state.linked_record_ids_to_primary_values = LinkedRecordIdsToPrimaryValues::Loaded {
                data,
                error_message: None,
            };
        }

        Action::AddMoreLinkedRecordIdsToPrimaryValues {
            linked_record_ids_to_primary_values,
        } => {
            let mut data = state.linked_record_ids_to_primary_values.loaded_data();
            data.extend(linked_record_ids_to_primary_values);
            state.linked_record_ids_to_primary_values = LinkedRecordIdsToPrimaryValues::Loaded {
                data,
                error_message: None,
            };
        }

        Action::LinkedRecordIdsToPrimaryValuesFailed { message } => {
            match &mut state.linked_record_ids_to_primary_values {
                LinkedRecordIdsToPrimaryValues::Loaded { error_message, .. } => {
                    *error_message = Some(message);
                }
                other => {
                    *other = LinkedRecordIdsToPrimaryValues::Failed {
                        error_message: message,
                    };
                }
            }
        }
    }

    Ok(())
}
