//! Tolerant aggregation fetch.
//!
//! [`fetch`] takes a set of named field requests, runs every pending operation
//! concurrently and returns a [`ResolvedBundle`] once all of them have settled.
//! A failing operation with a declared fallback is replaced by that fallback;
//! a failing operation without one fails the whole fetch.
//!
//! The error of such an operation is returned as [`FetchError::Field`], tagged
//! with the field name. Use [`FetchError::into_error`] to get the operation's
//! error back exactly as it was produced.

pub mod bundle;
pub mod errors;
pub mod fetcher;
pub mod metrics_defs;
pub mod request;

pub use bundle::ResolvedBundle;
pub use errors::FetchError;
pub use fetcher::fetch;
pub use request::{FieldRequest, FieldRequests, PendingOperation};
