//! Airtable REST client
//!
//! [`AirtableApi`] is the seam the handlers are written against; the
//! [`AirtableClient`] implementation talks HTTP, tests use in-memory fakes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use super::error::{ApiError, extract_error_message};
use super::models::{AirtableRecord, BaseSchemaResponse, TableSchema};
use super::query::{Formula, MAX_PAGE_SIZE, Query, QueryBuilder, QueryResult};
use super::resilience::{ConcurrencyLimiter, RateLimiter, ResilienceConfig, RetryPolicy};

pub const DEFAULT_BASE_URL: &str = "https://api.airtable.com";

/// Operations the linked-record handlers need from Airtable
#[async_trait]
pub trait AirtableApi: Send + Sync {
    /// Fetch one table's schema.
    ///
    /// While a lookup field is missing its `recordLinkFieldId` the schema is
    /// refetched, up to `lookup_resolution_tries` additional times.
    async fn fetch_table_schema(
        &self,
        base_id: &str,
        table_id: &str,
        lookup_resolution_tries: u32,
    ) -> Result<TableSchema>;

    /// Fetch a single page of records
    async fn list_records(&self, base_id: &str, query: &Query) -> Result<QueryResult>;

    /// Fetch specific records by ID, keyed by record ID.
    ///
    /// Callers keep `record_ids` at or below 100 per call.
    async fn fetch_records_by_ids(
        &self,
        base_id: &str,
        table_id: &str,
        record_ids: &[String],
        field_names: &[String],
    ) -> Result<HashMap<String, AirtableRecord>> {
        let query = QueryBuilder::new(table_id)
            .fields(field_names)
            .filter(Formula::record_id_in(record_ids.iter().cloned()))
            .page_size(MAX_PAGE_SIZE)
            .build();

        let mut records = HashMap::new();
        let mut page = self.list_records(base_id, &query).await?;
        loop {
            let next_offset = page.offset.take();
            for record in page.records {
                records.insert(record.id.clone(), record);
            }
            match next_offset {
                Some(offset) => {
                    page = self
                        .list_records(base_id, &query.with_offset(Some(offset)))
                        .await?;
                }
                None => break,
            }
        }

        Ok(records)
    }
}

/// HTTP client for one Airtable account
#[derive(Debug, Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
    rate_limiter: RateLimiter,
    concurrency: ConcurrencyLimiter,
}

impl AirtableClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        resilience: ResilienceConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry: RetryPolicy::new(resilience.retry),
            rate_limiter: RateLimiter::new(resilience.rate_limit),
            concurrency: ConcurrencyLimiter::new(resilience.concurrency),
        })
    }

    /// Build from loaded settings
    pub fn from_settings(settings: &crate::config::Settings) -> Result<Self> {
        let api_key = settings.airtable.api_key.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "No Airtable API key configured. Set AIRTABLE_API_KEY or [airtable].api_key in the config file."
            )
        })?;

        Self::new(
            api_key,
            settings.airtable.base_url.clone(),
            Duration::from_secs(settings.airtable.timeout_secs),
            ResilienceConfig::from_settings(&settings.resilience),
        )
    }

    fn records_url(&self, base_id: &str, table: &str) -> String {
        format!(
            "{}/v0/{}/{}",
            self.base_url,
            urlencoding::encode(base_id),
            urlencoding::encode(table)
        )
    }

    fn tables_url(&self, base_id: &str) -> String {
        format!(
            "{}/v0/meta/bases/{}/tables",
            self.base_url,
            urlencoding::encode(base_id)
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        self.retry
            .execute(operation_name, move || async move {
                let _permit = self
                    .concurrency
                    .acquire()
                    .await
                    .map_err(|e| ApiError::Unavailable(e.to_string()))?;
                self.rate_limiter.acquire().await;

                debug!("GET {} ({} query params)", url, query.len());
                let response = self
                    .http
                    .get(url)
                    .bearer_auth(&self.api_key)
                    .query(query)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        warn!("Airtable rate limit hit for {}", operation_name);
                    }
                    return Err(ApiError::Http {
                        status: status.as_u16(),
                        message: extract_error_message(&body),
                    });
                }

                response
                    .json::<T>()
                    .await
                    .map_err(|e| ApiError::Decode(e.to_string()))
            })
            .await
    }

    async fn fetch_base_schema(&self, base_id: &str) -> Result<BaseSchemaResponse, ApiError> {
        self.get_json("fetch base schema", &self.tables_url(base_id), &[])
            .await
    }
}

#[async_trait]
impl AirtableApi for AirtableClient {
    async fn fetch_table_schema(
        &self,
        base_id: &str,
        table_id: &str,
        lookup_resolution_tries: u32,
    ) -> Result<TableSchema> {
        let mut remaining = lookup_resolution_tries;

        loop {
            let schema = self
                .fetch_base_schema(base_id)
                .await
                .with_context(|| format!("Failed to fetch schema of base '{}'", base_id))?;

            let table = schema
                .tables
                .into_iter()
                .find(|table| table.id == table_id)
                .ok_or_else(|| ApiError::TableNotFound {
                    base_id: base_id.to_string(),
                    table_id: table_id.to_string(),
                })?;

            if !table.has_unresolved_lookups() || remaining == 0 {
                return Ok(table);
            }

            remaining -= 1;
            warn!(
                "Table '{}' has lookup fields Airtable hasn't resolved yet, refetching ({} tries left)",
                table_id, remaining
            );
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }

    async fn list_records(&self, base_id: &str, query: &Query) -> Result<QueryResult> {
        let result: QueryResult = self
            .get_json(
                "list records",
                &self.records_url(base_id, &query.table),
                &query.to_query_pairs(),
            )
            .await
            .with_context(|| format!("Failed to list records of table '{}'", query.table))?;

        debug!(
            "Listed {} records from {} (more: {})",
            result.records.len(),
            query.table,
            result.has_more()
        );
        Ok(result)
    }
}
