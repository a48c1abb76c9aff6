//! List-records response

use serde::{Deserialize, Serialize};

use crate::api::models::AirtableRecord;

/// One page of records plus the cursor for the next page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub records: Vec<AirtableRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

impl QueryResult {
    pub fn has_more(&self) -> bool {
        self.offset.is_some()
    }
}
