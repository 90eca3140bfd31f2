//! Metrics definitions for the secrets-sync loader.

use shared::metrics_defs::{MetricDef, MetricType};

pub const LOAD_DURATION: MetricDef = MetricDef {
    name: "secrets_sync.load.duration",
    metric_type: MetricType::Histogram,
    description: "Time to load the secrets-sync overview in seconds. Tagged with status.",
};

pub const STORE_QUERY_DURATION: MetricDef = MetricDef {
    name: "secrets_sync.store.query.duration",
    metric_type: MetricType::Histogram,
    description: "Time for an HTTP record store query in seconds. Tagged with record_type.",
};

pub const ALL_METRICS: &[MetricDef] = &[LOAD_DURATION, STORE_QUERY_DURATION];
