//! Common types for metrics definitions.
//!
//! Each crate declares its metrics as `MetricDef` constants in its own
//! `metrics_defs.rs` and emits them through the macros below, so metric names
//! live in one place per crate. Callers need the `metrics` crate in scope.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

impl MetricType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "Counter",
            MetricType::Gauge => "Gauge",
            MetricType::Histogram => "Histogram",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

/// Renders a list of definitions as a markdown table, one row per metric.
pub fn describe_all(defs: &[MetricDef]) -> String {
    let mut out = String::from("| Name | Type | Description |\n|------|------|-------------|\n");
    for def in defs {
        out.push_str(&format!(
            "| `{}` | {} | {} |\n",
            def.name,
            def.metric_type.as_str(),
            def.description
        ));
    }
    out
}

#[macro_export]
macro_rules! counter {
    ($def:expr) => {
        metrics::counter!($def.name)
    };
    ($def:expr, $($labels:tt)+) => {
        metrics::counter!($def.name, $($labels)+)
    };
}

#[macro_export]
macro_rules! gauge {
    ($def:expr) => {
        metrics::gauge!($def.name)
    };
    ($def:expr, $($labels:tt)+) => {
        metrics::gauge!($def.name, $($labels)+)
    };
}

#[macro_export]
macro_rules! histogram {
    ($def:expr) => {
        metrics::histogram!($def.name)
    };
    ($def:expr, $($labels:tt)+) => {
        metrics::histogram!($def.name, $($labels)+)
    };
}
