//! Fluent builder for [`Query`]

use super::formula::Formula;
use super::query::Query;
use super::sort::Sort;

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            query: Query::new(table),
        }
    }

    pub fn fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.query.fields = fields.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    pub fn filter(mut self, formula: Formula) -> Self {
        self.query.filter = Some(formula);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.query.sort.push(sort);
        self
    }

    pub fn view(mut self, view: Option<impl Into<String>>) -> Self {
        self.query.view = view.map(Into::into);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.query.page_size = Some(page_size);
        self
    }

    pub fn offset(mut self, offset: Option<String>) -> Self {
        self.query.offset = offset;
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}
