//! Airtable list-records query builder
//!
//! Follows the same split as the rest of the client: [`Query`] is the reusable
//! description, [`QueryBuilder`] the fluent way to make one.

pub mod builder;
pub mod formula;
pub mod query;
pub mod result;
pub mod sort;

pub use builder::QueryBuilder;
pub use formula::Formula;
pub use query::{MAX_PAGE_SIZE, Query};
pub use result::QueryResult;
pub use sort::{Sort, SortDirection};
