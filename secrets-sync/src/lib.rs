//! Loader for the secrets-sync overview.
//!
//! Collects the license capability, the activation and managed-deployment
//! flags, and the sync destinations and associations into a single
//! [`SyncOverview`]. Flags, license and records come from injected
//! collaborators; the concurrent fetch itself is done by [`aggregator::fetch`].

pub mod config;
pub mod errors;
pub mod flags;
pub mod loader;
pub mod metrics_defs;
pub mod store;
pub mod version;

pub use errors::{LoadError, ProviderError, SourceError, StoreError};
pub use flags::{FlagsProvider, StaticFlags};
pub use loader::{SyncOverview, SyncOverviewLoader};
pub use store::{HttpRecordStore, QueryCriteria, Record, RecordStore, StaticRecordStore};
pub use version::{LicenseVersion, VersionProvider};
