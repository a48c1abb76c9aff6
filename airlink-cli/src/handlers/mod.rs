//! Linked-record request handlers
//!
//! Both handlers take an already verified [`ExtensionContext`](crate::extension::ExtensionContext)
//! and talk to Airtable only through [`AirtableApi`](crate::api::AirtableApi).

pub mod initial;
pub mod selector;
pub mod types;

pub use initial::fetch_initial_linked_records;
pub use selector::fetch_records_for_linked_records_selector;
pub use types::*;

use crate::api::ApiError;
use crate::extension::AuthError;
use crate::linked_records::ResolveError;
use crate::session::ReducerError;

/// What went wrong, coarse enough for an HTTP status or exit message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SchemaDrift,
    NotFound,
    Unauthorized,
    InvalidInput,
    InvalidCall,
    Upstream,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SchemaDrift => "schemaDrift",
            ErrorKind::NotFound => "notFound",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::InvalidInput => "invalidInput",
            ErrorKind::InvalidCall => "invalidCall",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Find the first typed error in the chain and map it to a kind
pub fn classify(err: &anyhow::Error) -> ErrorKind {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ResolveError>() {
            return match e {
                ResolveError::SchemaDrift(_) => ErrorKind::SchemaDrift,
                ResolveError::NotFound(_) => ErrorKind::NotFound,
                ResolveError::InvalidInput(_) => ErrorKind::InvalidInput,
            };
        }
        if let Some(e) = cause.downcast_ref::<AuthError>() {
            return match e {
                AuthError::UnknownExtension(_) => ErrorKind::NotFound,
                AuthError::InvalidPassword => ErrorKind::Unauthorized,
            };
        }
        if let Some(e) = cause.downcast_ref::<ReducerError>() {
            return match e {
                ReducerError::SchemaDrift(_) => ErrorKind::SchemaDrift,
                ReducerError::SessionNotFound(_) => ErrorKind::NotFound,
                _ => ErrorKind::InvalidCall,
            };
        }
        if let Some(e) = cause.downcast_ref::<ApiError>() {
            return match e {
                ApiError::TableNotFound { .. } => ErrorKind::NotFound,
                _ => ErrorKind::Upstream,
            };
        }
    }
    ErrorKind::Internal
}
