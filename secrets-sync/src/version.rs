use crate::errors::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;

/// License feature that enables secrets sync.
pub const SECRETS_SYNC_FEATURE: &str = "Secrets Sync";

/// Source of license and version capabilities.
#[async_trait]
pub trait VersionProvider: Send + Sync {
    async fn has_secrets_sync(&self) -> Result<bool, ProviderError>;
}

/// License information given as the list of licensed feature names.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct LicenseVersion {
    #[serde(default)]
    pub features: Vec<String>,
}

impl LicenseVersion {
    pub fn new(features: Vec<String>) -> Self {
        Self { features }
    }
}

#[async_trait]
impl VersionProvider for LicenseVersion {
    async fn has_secrets_sync(&self) -> Result<bool, ProviderError> {
        Ok(self.features.iter().any(|f| f == SECRETS_SYNC_FEATURE))
    }
}
