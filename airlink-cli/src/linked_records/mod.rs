//! Linked-record resolution
//!
//! Pure pieces (catalog lookups, fetch-set resolution, shaping, nested link
//! collection) plus the chunked fetcher that talks to Airtable.

pub mod catalog;
pub mod error;
pub mod fetcher;
pub mod nested;
pub mod resolver;
pub mod shaping;

pub use catalog::{LINKED_RECORDS_FIELD_NOT_FOUND, LinkedRecordConfig, primary_field};
pub use error::{ResolveError, need_to_sync_base_message};
pub use fetcher::{MAX_RECORDS_PER_REQUEST, fetch_in_chunks};
pub use nested::{LinkedRecordGroup, linked_table_ids_to_record_ids};
pub use resolver::{FetchFieldSet, FieldNamesToOverride, ResolveParams, resolve_fetch_field_set};
pub use shaping::{shape_record, strip_disallowed_fields};
