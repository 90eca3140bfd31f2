//! Record stores queried for sync destinations and associations.

use crate::errors::StoreError;
use crate::metrics_defs::STORE_QUERY_DURATION;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shared::histogram;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use url::Url;

/// Record type of sync destinations.
pub const DESTINATION_RECORD_TYPE: &str = "sync/destination";

/// Record type of sync associations.
pub const ASSOCIATION_RECORD_TYPE: &str = "sync/association";

/// A stored record. Its schema belongs to the store, so it stays opaque here.
pub type Record = serde_json::Value;

/// Filter criteria for a query, sent as query parameters. Usually empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryCriteria(IndexMap<String, String>);

impl QueryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A store of records keyed by record type.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn query(
        &self,
        record_type: &str,
        criteria: &QueryCriteria,
    ) -> Result<Vec<Record>, StoreError>;
}

/// Records held in memory, per record type.
///
/// Criteria are ignored. Unknown record types have no records.
#[derive(Clone, Debug, Default)]
pub struct StaticRecordStore {
    records: HashMap<String, Vec<Record>>,
}

impl StaticRecordStore {
    pub fn new(records: HashMap<String, Vec<Record>>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordStore for StaticRecordStore {
    async fn query(
        &self,
        record_type: &str,
        _criteria: &QueryCriteria,
    ) -> Result<Vec<Record>, StoreError> {
        Ok(self.records.get(record_type).cloned().unwrap_or_default())
    }
}

/// Queries records over HTTP.
///
/// A query for `sync/destination` is sent as `GET {base_url}/sync/destination`
/// with the criteria as query parameters. The response body must be a JSON
/// array of records.
#[derive(Clone)]
pub struct HttpRecordStore {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRecordStore {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    fn record_url(&self, record_type: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(record_type.trim_start_matches('/'))
            .map_err(|e| StoreError::InvalidRecordType(record_type.to_string(), e))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn query(
        &self,
        record_type: &str,
        criteria: &QueryCriteria,
    ) -> Result<Vec<Record>, StoreError> {
        let url = self.record_url(record_type)?;
        let started = Instant::now();

        let mut request = self.client.get(url);
        if !criteria.is_empty() {
            request = request.query(criteria);
        }
        let response = request.send().await;

        histogram!(STORE_QUERY_DURATION, "record_type" => record_type.to_string())
            .record(started.elapsed().as_secs_f64());

        let response = response?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(record_type, status = status.as_u16(), "Record query rejected");
            return Err(StoreError::UnexpectedStatus {
                record_type: record_type.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Vec<Record>>().await?)
    }
}

/// Makes `join` append to the base path instead of replacing its last segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
