//! Airtable Web API module
//!
//! Schema and record models, a list-records query builder, and the REST client
//! with retry, rate limiting and concurrency limiting.

pub mod client;
pub mod error;
pub mod models;
pub mod query;
pub mod resilience;

pub use client::{AirtableApi, AirtableClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use models::{
    AirtableField, AirtableRecord, FieldConfig, FieldSet, LinkedRecordOptions, LookupOptions,
    TableSchema,
};
pub use query::{Formula, Query, QueryBuilder, QueryResult, Sort};
pub use resilience::ResilienceConfig;
