use aggregator::FetchError;
use thiserror::Error;

/// Failure of a flags or license lookup.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("feature flags unavailable: {0}")]
    Flags(String),

    #[error("license information unavailable: {0}")]
    License(String),
}

/// Failure of a record store query.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} querying {record_type}")]
    UnexpectedStatus { record_type: String, status: u16 },

    #[error("invalid record type {0}: {1}")]
    InvalidRecordType(String, url::ParseError),
}

/// Error type shared by every field of an overview fetch.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that can occur while loading the overview
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not determine whether secrets sync is activated: {0}")]
    Activation(#[source] ProviderError),

    #[error("overview fetch failed: {0}")]
    Fetch(#[from] FetchError<SourceError>),

    #[error("could not decode overview: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LoadError {
    /// Returns the collaborator error that failed the load, if any.
    pub fn into_source_error(self) -> Option<SourceError> {
        match self {
            LoadError::Activation(e) => Some(SourceError::Provider(e)),
            LoadError::Fetch(e) => e.into_error(),
            LoadError::Decode(_) => None,
        }
    }
}
