//! `filterByFormula` expressions
//!
//! Only the handful of formula functions the handlers need. Rendering takes
//! care of quoting so user input never ends up as raw formula text.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// Constant truth value, rendered as `1` / `0`
    Constant(bool),
    /// `SEARCH(LOWER("<needle>"), LOWER({<field>}))`
    ContainsCaseInsensitive { field: String, needle: String },
    /// `RECORD_ID()="<id>"`
    RecordIdEquals(String),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

impl Formula {
    pub fn always() -> Self {
        Self::Constant(true)
    }

    pub fn contains_case_insensitive(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::ContainsCaseInsensitive {
            field: field.into(),
            needle: needle.into(),
        }
    }

    /// Match any of the given record IDs
    pub fn record_id_in<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Or(
            ids.into_iter()
                .map(|id| Self::RecordIdEquals(id.into()))
                .collect(),
        )
    }

    pub fn and(parts: Vec<Formula>) -> Self {
        Self::And(parts)
    }
}

/// Quote a string as an Airtable formula string literal
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Reference a field by name. Braces allow spaces and punctuation in names.
pub fn field_reference(name: &str) -> String {
    format!("{{{}}}", name)
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Constant(true) => write!(f, "1"),
            Formula::Constant(false) => write!(f, "0"),
            Formula::ContainsCaseInsensitive { field, needle } => write!(
                f,
                "SEARCH(LOWER({}), LOWER({}))",
                string_literal(needle),
                field_reference(field)
            ),
            Formula::RecordIdEquals(id) => write!(f, "RECORD_ID()={}", string_literal(id)),
            Formula::And(parts) => write_call(f, "AND", parts),
            Formula::Or(parts) => write_call(f, "OR", parts),
        }
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, parts: &[Formula]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", part)?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_search_matches_everything() {
        assert_eq!(Formula::and(vec![Formula::always()]).to_string(), "AND(1)");
    }

    #[test]
    fn test_search_lowercases_both_sides() {
        let formula = Formula::and(vec![Formula::contains_case_insensitive("Full Name", "ann")]);
        assert_eq!(
            formula.to_string(),
            r#"AND(SEARCH(LOWER("ann"), LOWER({Full Name})))"#
        );
    }

    #[test]
    fn test_search_term_is_escaped() {
        let formula = Formula::contains_case_insensitive("Name", r#"a") , 1, ("\"#);
        assert_eq!(
            formula.to_string(),
            r#"SEARCH(LOWER("a\") , 1, (\"\\"), LOWER({Name}))"#
        );
    }

    #[test]
    fn test_record_id_in() {
        let formula = Formula::record_id_in(["rec00000000000001", "rec00000000000002"]);
        assert_eq!(
            formula.to_string(),
            r#"OR(RECORD_ID()="rec00000000000001", RECORD_ID()="rec00000000000002")"#
        );
    }
}
