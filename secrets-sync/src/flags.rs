use crate::errors::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;

/// Source of the feature-activation and managed-deployment flags.
#[async_trait]
pub trait FlagsProvider: Send + Sync {
    async fn secrets_sync_is_activated(&self) -> Result<bool, ProviderError>;

    async fn is_managed(&self) -> Result<bool, ProviderError>;
}

/// Flags fixed at startup, typically from config.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct StaticFlags {
    #[serde(default)]
    pub secrets_sync_activated: bool,
    #[serde(default)]
    pub managed: bool,
}

#[async_trait]
impl FlagsProvider for StaticFlags {
    async fn secrets_sync_is_activated(&self) -> Result<bool, ProviderError> {
        Ok(self.secrets_sync_activated)
    }

    async fn is_managed(&self) -> Result<bool, ProviderError> {
        Ok(self.managed)
    }
}
