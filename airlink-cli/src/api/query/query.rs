//! Reusable list-records query

use super::formula::Formula;
use super::sort::Sort;

/// Airtable never returns more than 100 records per page
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Table ID (or name) the records live in
    pub table: String,
    /// Field names to return; empty means all fields
    pub fields: Vec<String>,
    pub filter: Option<Formula>,
    pub sort: Vec<Sort>,
    pub view: Option<String>,
    pub page_size: Option<u32>,
    /// Opaque pagination cursor from a previous page
    pub offset: Option<String>,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            filter: None,
            sort: Vec::new(),
            view: None,
            page_size: None,
            offset: None,
        }
    }

    /// Same query, continuing at `offset`
    pub fn with_offset(&self, offset: Option<String>) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }

    /// Query string pairs in the form the records endpoint expects
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        for field in &self.fields {
            pairs.push(("fields[]".to_string(), field.clone()));
        }

        if let Some(filter) = &self.filter {
            pairs.push(("filterByFormula".to_string(), filter.to_string()));
        }

        for (i, sort) in self.sort.iter().enumerate() {
            pairs.push((format!("sort[{}][field]", i), sort.field.clone()));
            pairs.push((
                format!("sort[{}][direction]", i),
                sort.direction.as_str().to_string(),
            ));
        }

        if let Some(view) = &self.view {
            pairs.push(("view".to_string(), view.clone()));
        }

        if let Some(page_size) = self.page_size {
            pairs.push((
                "pageSize".to_string(),
                page_size.clamp(1, MAX_PAGE_SIZE).to_string(),
            ));
        }

        if let Some(offset) = &self.offset {
            pairs.push(("offset".to_string(), offset.clone()));
        }

        pairs
    }
}
