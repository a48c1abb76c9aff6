//! Works out which fields of a linked table a request is allowed to fetch

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::error::ResolveError;
use crate::api::AirtableField;
use crate::extension::FormField;

/// Names whose values replace the primary value as title, or show as subtitle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNamesToOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_override_field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_field_name: Option<String>,
}

/// Field names to request from the linked table, in insertion order with the
/// primary field first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchFieldSet {
    pub field_names_to_fetch: Vec<String>,
    pub field_names_to_override: FieldNamesToOverride,
}

impl FetchFieldSet {
    fn insert(&mut self, name: &str) {
        if !self.contains(name) {
            self.field_names_to_fetch.push(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field_names_to_fetch.iter().any(|n| n == name)
    }

    /// Field the record's title comes from
    pub fn title_field_name<'a>(&'a self, primary_field_name: &'a str) -> &'a str {
        self.field_names_to_override
            .title_override_field_name
            .as_deref()
            .unwrap_or(primary_field_name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolveParams<'a> {
    pub form_fields: &'a [FormField],
    pub all_field_ids_to_field_names_in_base: &'a HashMap<String, String>,
    pub primary_field_in_linked_table: &'a AirtableField,
    pub fields_in_main_table: &'a [AirtableField],
    pub fields_in_linked_table: &'a [AirtableField],
    /// Field IDs referenced inside the link field's form configuration. They
    /// may belong to either table; only linked-table ones are fetched.
    pub nested_field_ids: &'a [String],
    /// The link fields in the main table the records are fetched for. Not
    /// every link field of the table.
    pub linked_record_field_ids_in_main_table: &'a [String],
    pub title_override_field_id: Option<&'a str>,
    pub subtitle_field_id: Option<&'a str>,
}

pub fn resolve_fetch_field_set(params: ResolveParams<'_>) -> Result<FetchFieldSet, ResolveError> {
    let main_fields_by_name: HashMap<&str, &AirtableField> = params
        .fields_in_main_table
        .iter()
        .map(|field| (field.name.as_str(), field))
        .collect();
    let field_name = |id: &str| params.all_field_ids_to_field_names_in_base.get(id);

    let mut set = FetchFieldSet::default();
    set.insert(&params.primary_field_in_linked_table.name);

    for form_field in params.form_fields {
        let airtable_field = main_fields_by_name
            .get(form_field.name.as_str())
            .ok_or_else(|| {
                ResolveError::schema_drift(format!(
                    "Unable to find field '{}' in Airtable.",
                    form_field.name
                ))
            })?;

        if let Some(recorded_type) = &form_field.field_type {
            if recorded_type != airtable_field.config.type_name() {
                return Err(ResolveError::schema_drift(format!(
                    "Field '{}' in form doesn't match the same field in Airtable.",
                    airtable_field.name
                )));
            }
        }

        let Some(lookup) = airtable_field.lookup_options() else {
            continue;
        };

        let follows_resolved_link = lookup.record_link_field_id.as_ref().is_some_and(|id| {
            params
                .linked_record_field_ids_in_main_table
                .contains(id)
        });
        if !follows_resolved_link {
            continue;
        }

        if let Some(name) = lookup
            .field_id_in_linked_table
            .as_deref()
            .and_then(field_name)
        {
            set.insert(name);
        }
    }

    if let Some(name) = params.title_override_field_id.and_then(field_name) {
        set.insert(name);
        set.field_names_to_override.title_override_field_name = Some(name.clone());
    }

    if let Some(name) = params.subtitle_field_id.and_then(field_name) {
        set.insert(name);
        set.field_names_to_override.subtitle_field_name = Some(name.clone());
    }

    let nested: HashSet<&str> = params.nested_field_ids.iter().map(String::as_str).collect();
    for field in params.fields_in_linked_table {
        if nested.contains(field.id.as_str()) {
            set.insert(&field.name);
        }
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FieldConfig, LinkedRecordOptions, LookupOptions};

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

    fn lookup(id: &str, name: &str, link: &str, target: &str) -> AirtableField {
        AirtableField::new(
            id,
            name,
            FieldConfig::MultipleLookupValues(LookupOptions {
                record_link_field_id: Some(link.to_string()),
                field_id_in_linked_table: Some(target.to_string()),
                is_valid: Some(true),
                ..Default::default()
            }),
        )
    }

    fn form_field(name: &str) -> FormField {
        FormField {
            name: name.to_string(),
            field_id: None,
            field_type: None,
        }
    }

    struct Fixture {
        main: Vec<AirtableField>,
        linked: Vec<AirtableField>,
        names: HashMap<String, String>,
        form: Vec<FormField>,
    }

    fn fixture() -> Fixture {
        let main = vec![
            text("fldTitle", "Title"),
            AirtableField::new(
                "fldCo",
                "Company",
                FieldConfig::MultipleRecordLinks(LinkedRecordOptions {
                    linked_table_id: "tblCo".to_string(),
                    ..Default::default()
                }),
            ),
            lookup("fldCoCity", "Company City", "fldCo", "fldCity"),
            lookup("fldOwnerMail", "Owner Email", "fldOwner", "fldEmail"),
        ];
        let linked = vec![
            text("fldName", "Name"),
            text("fldCity", "City"),
            text("fldSize", "Size"),
            text("fldSecret", "Revenue"),
        ];
        let names = [
            ("fldName", "Name"),
            ("fldCity", "City"),
            ("fldSize", "Size"),
            ("fldSecret", "Revenue"),
            ("fldEmail", "Email"),
            ("fldLabel", "Label"),
        ]
        .into_iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect();
        let form = vec![
            form_field("Title"),
            form_field("Company"),
            form_field("Company City"),
            form_field("Owner Email"),
        ];
        Fixture {
            main,
            linked,
            names,
            form,
        }
    }

    fn params<'a>(f: &'a Fixture, link_ids: &'a [String]) -> ResolveParams<'a> {
        ResolveParams {
            form_fields: &f.form,
            all_field_ids_to_field_names_in_base: &f.names,
            primary_field_in_linked_table: &f.linked[0],
            fields_in_main_table: &f.main,
            fields_in_linked_table: &f.linked,
            nested_field_ids: &[],
            linked_record_field_ids_in_main_table: link_ids,
            title_override_field_id: None,
            subtitle_field_id: None,
        }
    }

    #[test]
    fn test_primary_always_fetched() {
        let mut f = fixture();
        f.form.clear();
        let set = resolve_fetch_field_set(params(&f, &[])).unwrap();
        assert_eq!(set.field_names_to_fetch, vec!["Name"]);
        assert_eq!(set.field_names_to_override, FieldNamesToOverride::default());
    }

    #[test]
    fn test_lookups_only_for_the_resolved_link() {
        let f = fixture();
        let link_ids = vec!["fldCo".to_string()];
        let set = resolve_fetch_field_set(params(&f, &link_ids)).unwrap();

        // "Owner Email" follows fldOwner and is skipped
        assert_eq!(set.field_names_to_fetch, vec!["Name", "City"]);
    }

    #[test]
    fn test_overrides_are_fetched_and_recorded() {
        let f = fixture();
        let link_ids = vec!["fldCo".to_string()];
        let set = resolve_fetch_field_set(ResolveParams {
            title_override_field_id: Some("fldSize"),
            subtitle_field_id: Some("fldCity"),
            ..params(&f, &link_ids)
        })
        .unwrap();

        assert_eq!(set.field_names_to_fetch, vec!["Name", "City", "Size"]);
        assert_eq!(
            set.field_names_to_override.title_override_field_name.as_deref(),
            Some("Size")
        );
        assert_eq!(
            set.field_names_to_override.subtitle_field_name.as_deref(),
            Some("City")
        );
        assert_eq!(set.title_field_name("Name"), "Size");
    }

    #[test]
    fn test_unknown_override_id_is_ignored() {
        let f = fixture();
        let set = resolve_fetch_field_set(ResolveParams {
            title_override_field_id: Some("fldDeleted"),
            ..params(&f, &[])
        })
        .unwrap();

        assert_eq!(set.field_names_to_override.title_override_field_name, None);
        assert_eq!(set.title_field_name("Name"), "Name");
    }

    #[test]
    fn test_nested_ids_only_from_linked_table() {
        let f = fixture();
        let nested = vec!["fldSecret".to_string(), "fldTitle".to_string()];
        let set = resolve_fetch_field_set(ResolveParams {
            nested_field_ids: &nested,
            ..params(&f, &[])
        })
        .unwrap();

        // fldTitle lives in the main table
        assert_eq!(set.field_names_to_fetch, vec!["Name", "Revenue"]);
    }

    #[test]
    fn test_missing_form_field_is_schema_drift() {
        let mut f = fixture();
        f.form.push(form_field("Deleted Field"));
        let err = resolve_fetch_field_set(params(&f, &[])).unwrap_err();
        match err {
            ResolveError::SchemaDrift(detail) => {
                assert_eq!(detail, "Unable to find field 'Deleted Field' in Airtable.")
            }
            other => panic!("expected schema drift, got {:?}", other),
        }
    }

    #[test]
    fn test_changed_field_type_is_schema_drift() {
        let mut f = fixture();
        f.form[2].field_type = Some("singleLineText".to_string());
        let err = resolve_fetch_field_set(params(&f, &[])).unwrap_err();
        assert_eq!(
            err,
            ResolveError::schema_drift(
                "Field 'Company City' in form doesn't match the same field in Airtable."
            )
        );
    }
}
