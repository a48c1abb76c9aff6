//! Post-fetch record shaping
//!
//! Records leave the service either stripped down to the allowed field set or
//! reshaped to `{Name, subtitle?}`.

use super::resolver::FetchFieldSet;
use crate::api::{AirtableRecord, FieldSet};

pub const NAME_KEY: &str = "Name";
pub const SUBTITLE_KEY: &str = "subtitle";

/// Remove every field not in the fetch set. Airtable was already asked for
/// exactly these fields; this runs regardless.
pub fn strip_disallowed_fields(record: &mut AirtableRecord, allowed: &FetchFieldSet) {
    record.fields.retain(|name, _| allowed.contains(name));
}

/// `{Name, subtitle?}` for one record's fields.
///
/// Airtable leaves empty cells out of a record; an empty title or subtitle
/// cell leaves its key out as well.
pub fn title_and_subtitle(
    fields: &FieldSet,
    primary_field_name: &str,
    fetch_set: &FetchFieldSet,
) -> FieldSet {
    let mut shaped = FieldSet::new();
    if let Some(title) = fields.get(fetch_set.title_field_name(primary_field_name)) {
        shaped.insert(NAME_KEY.to_string(), title.clone());
    }

    let subtitle = fetch_set
        .field_names_to_override
        .subtitle_field_name
        .as_ref()
        .and_then(|name| fields.get(name));
    if let Some(subtitle) = subtitle {
        shaped.insert(SUBTITLE_KEY.to_string(), subtitle.clone());
    }
    shaped
}

/// Strip, then replace the record's fields with `{Name, subtitle?}`
pub fn shape_record(
    mut record: AirtableRecord,
    primary_field_name: &str,
    fetch_set: &FetchFieldSet,
) -> AirtableRecord {
    strip_disallowed_fields(&mut record, fetch_set);
    record.fields = title_and_subtitle(&record.fields, primary_field_name, fetch_set);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linked_records::resolver::FieldNamesToOverride;
    use serde_json::{Value, json};

    fn record() -> AirtableRecord {
        let fields = json!({
            "Name": "Acme",
            "Display Name": "ACME Corp.",
            "City": "Berlin",
            "Revenue": 1_000_000,
        });
        let Value::Object(fields) = fields else {
            unreachable!()
        };
        AirtableRecord::new("rec00000000000001", fields)
    }

    fn fetch_set(names: &[&str], title: Option<&str>, subtitle: Option<&str>) -> FetchFieldSet {
        FetchFieldSet {
            field_names_to_fetch: names.iter().map(|n| n.to_string()).collect(),
            field_names_to_override: FieldNamesToOverride {
                title_override_field_name: title.map(str::to_string),
                subtitle_field_name: subtitle.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_strip_drops_unrequested_fields() {
        let mut rec = record();
        strip_disallowed_fields(&mut rec, &fetch_set(&["Name", "City"], None, None));

        assert!(!rec.fields.contains_key("Revenue"));
        assert!(!rec.fields.contains_key("Display Name"));
        assert_eq!(rec.fields.len(), 2);
    }

    #[test]
    fn test_title_override_beats_primary() {
        let shaped = shape_record(
            record(),
            "Name",
            &fetch_set(&["Name", "Display Name"], Some("Display Name"), None),
        );
        assert_eq!(shaped.fields.get("Name"), Some(&json!("ACME Corp.")));
    }

    #[test]
    fn test_no_subtitle_key_without_subtitle_field() {
        let shaped = shape_record(record(), "Name", &fetch_set(&["Name", "City"], None, None));
        assert_eq!(shaped.fields.get("Name"), Some(&json!("Acme")));
        assert!(!shaped.fields.contains_key("subtitle"));
    }

    #[test]
    fn test_subtitle_from_configured_field() {
        let shaped = shape_record(
            record(),
            "Name",
            &fetch_set(&["Name", "City"], None, Some("City")),
        );
        assert_eq!(shaped.fields.get("subtitle"), Some(&json!("Berlin")));
        assert_eq!(shaped.id, "rec00000000000001");
    }

    #[test]
    fn test_stripped_field_never_used_as_title() {
        // Revenue is configured as title but wasn't part of the fetch set
        let shaped = shape_record(record(), "Name", &fetch_set(&["Name"], Some("Revenue"), None));
        assert!(!shaped.fields.contains_key("Name"));
    }

    #[test]
    fn test_empty_cells_leave_keys_out() {
        let empty = AirtableRecord::new("rec00000000000002", FieldSet::new());
        let shaped = shape_record(
            empty,
            "Name",
            &fetch_set(&["Name", "City"], None, Some("City")),
        );
        assert!(shaped.fields.is_empty());
        assert_eq!(serde_json::to_value(&shaped.fields).unwrap(), json!({}));
    }
}
