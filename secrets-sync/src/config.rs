use crate::errors::StoreError;
use crate::flags::StaticFlags;
use crate::loader::SyncOverviewLoader;
use crate::store::{HttpRecordStore, Record, RecordStore, StaticRecordStore};
use crate::version::LicenseVersion;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Record store timeout cannot be 0")]
    InvalidTimeout,

    #[error("Record store URL cannot be a base: {0}")]
    InvalidStoreUrl(Url),

    #[error("Empty record type in static record store")]
    EmptyRecordType,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum RecordStoreConfig {
    Http {
        url: Url,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    Static {
        #[serde(default)]
        records: HashMap<String, Vec<Record>>,
    },
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        RecordStoreConfig::Static {
            records: HashMap::new(),
        }
    }
}

impl RecordStoreConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            RecordStoreConfig::Http { url, timeout_secs } => {
                if *timeout_secs == 0 {
                    return Err(ValidationError::InvalidTimeout);
                }
                if url.cannot_be_a_base() {
                    return Err(ValidationError::InvalidStoreUrl(url.clone()));
                }
            }
            RecordStoreConfig::Static { records } => {
                if records.keys().any(|k| k.is_empty()) {
                    return Err(ValidationError::EmptyRecordType);
                }
            }
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Arc<dyn RecordStore>, StoreError> {
        let store: Arc<dyn RecordStore> = match self {
            RecordStoreConfig::Http { url, timeout_secs } => Arc::new(HttpRecordStore::new(
                url.clone(),
                Duration::from_secs(*timeout_secs),
            )?),
            RecordStoreConfig::Static { records } => {
                Arc::new(StaticRecordStore::new(records.clone()))
            }
        };
        Ok(store)
    }
}

/// Secrets-sync loader configuration
#[derive(Clone, Deserialize, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub flags: StaticFlags,
    #[serde(default)]
    pub license: LicenseVersion,
    #[serde(default)]
    pub record_store: RecordStoreConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.record_store.validate()
    }

    /// Builds a loader backed by the configured collaborators.
    pub fn build_loader(&self) -> Result<SyncOverviewLoader, StoreError> {
        Ok(SyncOverviewLoader::new(
            Arc::new(self.flags.clone()),
            Arc::new(self.license.clone()),
            self.record_store.build()?,
        ))
    }
}
