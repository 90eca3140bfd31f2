use crate::errors::{LoadError, SourceError};
use crate::flags::FlagsProvider;
use crate::metrics_defs::LOAD_DURATION;
use crate::store::{
    ASSOCIATION_RECORD_TYPE, DESTINATION_RECORD_TYPE, QueryCriteria, Record, RecordStore,
};
use crate::version::VersionProvider;
use aggregator::{FieldRequests, fetch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::histogram;
use std::sync::Arc;
use std::time::Instant;

const LICENSE_FIELD: &str = "licenseHasSecretsSync";
const ACTIVATED_FIELD: &str = "isActivated";
const MANAGED_FIELD: &str = "isManaged";
const DESTINATIONS_FIELD: &str = "destinations";
const ASSOCIATIONS_FIELD: &str = "associations";

/// Everything the secrets-sync overview displays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOverview {
    pub license_has_secrets_sync: bool,
    pub is_activated: bool,
    pub is_managed: bool,
    pub destinations: Vec<Record>,
    pub associations: Vec<Record>,
}

/// Builds a [`SyncOverview`] from injected collaborators.
///
/// A fresh set of lookups is made on every [`load`](Self::load); nothing is
/// cached between calls.
#[derive(Clone)]
pub struct SyncOverviewLoader {
    flags: Arc<dyn FlagsProvider>,
    version: Arc<dyn VersionProvider>,
    store: Arc<dyn RecordStore>,
}

impl SyncOverviewLoader {
    pub fn new(
        flags: Arc<dyn FlagsProvider>,
        version: Arc<dyn VersionProvider>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            flags,
            version,
            store,
        }
    }

    /// Loads the overview.
    ///
    /// Destinations and associations are only queried when secrets sync is
    /// activated, and a failed query yields an empty list. A failed flag or
    /// license lookup fails the whole load.
    pub async fn load(&self) -> Result<SyncOverview, LoadError> {
        let started = Instant::now();
        let result = self.load_inner().await;

        let status = if result.is_ok() { "ok" } else { "error" };
        histogram!(LOAD_DURATION, "status" => status).record(started.elapsed().as_secs_f64());

        result
    }

    async fn load_inner(&self) -> Result<SyncOverview, LoadError> {
        let is_activated = self
            .flags
            .secrets_sync_is_activated()
            .await
            .map_err(LoadError::Activation)?;

        let requests = self.build_requests(is_activated);
        tracing::debug!(
            is_activated,
            pending = requests.pending_count(),
            "Fetching secrets sync overview"
        );

        let bundle = fetch(requests).await?;
        let overview: SyncOverview =
            serde_json::from_value(Value::Object(bundle.into_iter().collect()))?;

        tracing::info!(
            is_activated = overview.is_activated,
            destinations = overview.destinations.len(),
            associations = overview.associations.len(),
            "Loaded secrets sync overview"
        );
        Ok(overview)
    }

    fn build_requests(&self, is_activated: bool) -> FieldRequests<Value, SourceError> {
        let version = self.version.clone();
        let flags = self.flags.clone();

        let requests = FieldRequests::new()
            .pending(LICENSE_FIELD, async move {
                Ok::<_, SourceError>(Value::Bool(version.has_secrets_sync().await?))
            })
            .ready(ACTIVATED_FIELD, Value::Bool(is_activated))
            .pending(MANAGED_FIELD, async move {
                Ok::<_, SourceError>(Value::Bool(flags.is_managed().await?))
            });

        if !is_activated {
            return requests
                .ready(DESTINATIONS_FIELD, empty_list())
                .ready(ASSOCIATIONS_FIELD, empty_list());
        }

        requests
            .pending_or(
                DESTINATIONS_FIELD,
                query_records(self.store.clone(), DESTINATION_RECORD_TYPE),
                empty_list(),
            )
            .pending_or(
                ASSOCIATIONS_FIELD,
                query_records(self.store.clone(), ASSOCIATION_RECORD_TYPE),
                empty_list(),
            )
    }
}

async fn query_records(
    store: Arc<dyn RecordStore>,
    record_type: &'static str,
) -> Result<Value, SourceError> {
    let records = store.query(record_type, &QueryCriteria::new()).await?;
    Ok(Value::Array(records))
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}
