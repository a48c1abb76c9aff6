use std::fmt;

/// Append the re-sync hint to a schema mismatch description
pub fn need_to_sync_base_message(detail: &str) -> String {
    format!(
        "{} Your base is out of sync with this form. Please sync the base in the form editor and try again.",
        detail
    )
}

/// Failures while resolving which linked records and fields to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The stored form no longer matches the live Airtable schema. Recoverable
    /// by re-syncing the base.
    SchemaDrift(String),
    /// A field or table the request depends on does not exist
    NotFound(String),
    /// Request data that can't be sent to Airtable as-is
    InvalidInput(String),
}

impl ResolveError {
    pub fn schema_drift(detail: impl Into<String>) -> Self {
        ResolveError::SchemaDrift(detail.into())
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::SchemaDrift(detail) => write!(f, "{}", need_to_sync_base_message(detail)),
            ResolveError::NotFound(message) => write!(f, "{}", message),
            ResolveError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ResolveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_drift_carries_sync_hint() {
        let err = ResolveError::schema_drift("Unable to find field 'Company' in Airtable.");
        let message = err.to_string();
        assert!(message.starts_with("Unable to find field 'Company' in Airtable."));
        assert!(message.contains("out of sync"));
    }

    #[test]
    fn test_not_found_is_verbatim() {
        let err = ResolveError::NotFound("nope".to_string());
        assert_eq!(err.to_string(), "nope");
    }
}
