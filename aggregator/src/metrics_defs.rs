//! Metrics definitions for the aggregator.

use shared::metrics_defs::{MetricDef, MetricType};

pub const FETCH_DURATION: MetricDef = MetricDef {
    name: "aggregate.fetch.duration",
    metric_type: MetricType::Histogram,
    description: "Time for a fetch to settle every field, in seconds",
};

pub const FIELD_FALLBACK: MetricDef = MetricDef {
    name: "aggregate.field.fallback",
    metric_type: MetricType::Counter,
    description: "Number of failed field operations replaced by their fallback. Tagged with field.",
};

pub const FETCH_FAILED: MetricDef = MetricDef {
    name: "aggregate.fetch.failed",
    metric_type: MetricType::Counter,
    description: "Number of fetches failed by a field without a fallback",
};

pub const ALL_METRICS: &[MetricDef] = &[FETCH_DURATION, FIELD_FALLBACK, FETCH_FAILED];
