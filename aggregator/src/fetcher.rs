//! Concurrent resolution of field requests.

use crate::bundle::ResolvedBundle;
use crate::errors::FetchError;
use crate::metrics_defs::{FETCH_DURATION, FETCH_FAILED, FIELD_FALLBACK};
use crate::request::{FieldRequest, FieldRequests};
use indexmap::IndexMap;
use shared::{counter, histogram};
use std::collections::HashMap;
use std::fmt::Display;
use tokio::task::{Id, JoinError, JoinSet};
use tokio::time::Instant;

/// Why a pending operation did not produce a value.
enum FieldFailure<E> {
    Error(E),
    Join(JoinError),
}

impl<E: Display> Display for FieldFailure<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldFailure::Error(e) => e.fmt(f),
            FieldFailure::Join(e) => e.fmt(f),
        }
    }
}

/// Per-field bookkeeping for a fetch in progress.
struct Slots<V> {
    /// Resolved values, in input order. `None` until the field settles.
    values: IndexMap<String, Option<V>>,

    /// Fallbacks of pending fields that declared one.
    fallbacks: HashMap<String, V>,

    /// Maps task IDs to field names, for tasks that end without returning.
    task_fields: HashMap<Id, String>,
}

/// Resolves every field request and returns the full bundle.
///
/// Pending operations are spawned onto the current tokio runtime and run
/// concurrently. Ready values are copied straight into the bundle. The call
/// returns once every spawned operation has completed or failed:
///
/// - a failed field with a fallback resolves to the fallback,
/// - a failed field without a fallback fails the fetch, but only after the
///   remaining operations have settled. If several such fields fail, the one
///   first in input order is reported.
///
/// Failed operations are never retried.
pub async fn fetch<V, E>(requests: FieldRequests<V, E>) -> Result<ResolvedBundle<V>, FetchError<E>>
where
    V: Send + 'static,
    E: Display + Send + 'static,
{
    let started = Instant::now();
    let mut join_set = JoinSet::new();
    let mut slots = Slots {
        values: IndexMap::with_capacity(requests.len()),
        fallbacks: HashMap::new(),
        task_fields: HashMap::new(),
    };

    for (name, request) in requests {
        match request {
            FieldRequest::Ready(value) => {
                slots.values.insert(name, Some(value));
            }
            FieldRequest::Pending {
                operation,
                fallback,
            } => {
                slots.values.insert(name.clone(), None);
                if let Some(fallback) = fallback {
                    slots.fallbacks.insert(name.clone(), fallback);
                }

                let field = name.clone();
                let abort_handle = join_set.spawn(async move { (field, operation.await) });
                slots.task_fields.insert(abort_handle.id(), name);
            }
        }
    }

    if join_set.is_empty() {
        tracing::debug!(fields = slots.values.len(), "No pending fields to resolve");
    }

    // Earliest failing field without a fallback, by input position.
    let mut failure: Option<(usize, FetchError<E>)> = None;

    while let Some(join_result) = join_set.join_next_with_id().await {
        let (field, outcome) = match join_result {
            Ok((id, (field, result))) => {
                slots.task_fields.remove(&id);
                (field, result.map_err(FieldFailure::Error))
            }
            Err(e) => {
                let Some(field) = slots.task_fields.remove(&e.id()) else {
                    tracing::error!("Task {} finished without a known field: {e}", e.id());
                    continue;
                };
                (field, Err(FieldFailure::Join(e)))
            }
        };

        if let Some(error) = slots.settle(field, outcome) {
            let position = slots.values.get_index_of(error.field()).unwrap_or(usize::MAX);
            if failure.as_ref().is_none_or(|(p, _)| position < *p) {
                failure = Some((position, error));
            }
        }
    }

    histogram!(FETCH_DURATION).record(started.elapsed().as_secs_f64());

    if let Some((_, error)) = failure {
        counter!(FETCH_FAILED).increment(1);
        return Err(error);
    }

    let expected = slots.values.len();
    let values: IndexMap<String, V> = slots
        .values
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect();
    debug_assert_eq!(values.len(), expected, "every field settles exactly once");

    Ok(ResolvedBundle::new(values))
}

impl<V> Slots<V> {
    /// Records the outcome of one field.
    ///
    /// Returns an error only when the field failed and has no fallback.
    fn settle<E: Display>(
        &mut self,
        field: String,
        outcome: Result<V, FieldFailure<E>>,
    ) -> Option<FetchError<E>> {
        let value = match outcome {
            Ok(value) => value,
            Err(failure) => match self.fallbacks.remove(&field) {
                Some(fallback) => {
                    tracing::warn!(field = %field, error = %failure, "Field failed, using fallback");
                    counter!(FIELD_FALLBACK, "field" => field.clone()).increment(1);
                    fallback
                }
                None => {
                    tracing::error!(field = %field, error = %failure, "Field failed without fallback");
                    return Some(match failure {
                        FieldFailure::Error(error) => FetchError::Field { field, error },
                        FieldFailure::Join(source) => FetchError::Join { field, source },
                    });
                }
            },
        };

        tracing::debug!(field = %field, "Field resolved");
        if let Some(slot) = self.values.get_mut(&field) {
            *slot = Some(value);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    struct TestError(&'static str);

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    async fn fails(message: &'static str) -> Result<Value, TestError> {
        Err(TestError(message))
    }

    #[tokio::test]
    async fn test_ready_and_pending_values() {
        // Scenario A
        let requests = FieldRequests::new()
            .ready("a", json!(5))
            .pending("b", async { Ok::<_, TestError>(json!(10)) });

        let bundle = fetch(requests).await.unwrap();

        assert_eq!(bundle.get("a"), Some(&json!(5)));
        assert_eq!(bundle.get("b"), Some(&json!(10)));
        assert_eq!(serde_json::to_value(&bundle).unwrap(), json!({"a": 5, "b": 10}));
    }

    #[tokio::test]
    async fn test_failure_with_fallback() {
        // Scenario B
        let requests = FieldRequests::new().pending_or("a", fails("boom"), json!([]));

        let bundle = fetch(requests).await.unwrap();

        assert_eq!(bundle.get("a"), Some(&json!([])));
        assert_eq!(bundle.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_without_fallback() {
        // Scenario C
        let requests = FieldRequests::new().pending("a", fails("boom"));

        let error = fetch(requests).await.unwrap_err();

        assert_eq!(error.field(), "a");
        assert_eq!(error.into_error(), Some(TestError("boom")));
    }

    #[tokio::test]
    async fn test_empty_requests() {
        // Scenario D
        let requests: FieldRequests<Value, TestError> = FieldRequests::new();

        let bundle = fetch(requests).await.unwrap();

        assert!(bundle.is_empty());
        assert_eq!(serde_json::to_value(&bundle).unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_only_ready_values() {
        // Scenario E
        let requests: FieldRequests<Value, TestError> = FieldRequests::new()
            .ready("active", json!(false))
            .ready("items", json!([]));
        assert_eq!(requests.pending_count(), 0);

        let bundle = fetch(requests).await.unwrap();

        assert_eq!(
            serde_json::to_value(&bundle).unwrap(),
            json!({"active": false, "items": []})
        );
    }

    #[tokio::test]
    async fn test_names_match_input_in_order() {
        let requests = FieldRequests::new()
            .pending_or("z", fails("x"), json!(null))
            .ready("m", json!(1))
            .pending("a", async { Ok::<_, TestError>(json!(2)) });
        let expected: Vec<String> = requests.names().map(String::from).collect();

        let bundle = fetch(requests).await.unwrap();

        assert_eq!(bundle.names().collect::<Vec<_>>(), expected);
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_siblings() {
        let requests = FieldRequests::new()
            .pending_or("broken", fails("down"), json!([]))
            .pending("ok", async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, TestError>(json!(["x"]))
            });

        let bundle = fetch(requests).await.unwrap();

        assert_eq!(bundle.get("broken"), Some(&json!([])));
        assert_eq!(bundle.get("ok"), Some(&json!(["x"])));
    }

    #[tokio::test]
    async fn test_panicking_operation_uses_fallback() {
        let requests = FieldRequests::new().pending_or(
            "a",
            async {
                if true {
                    panic!("operation panicked");
                }
                Ok::<Value, TestError>(json!(1))
            },
            json!("fallback"),
        );

        let bundle = fetch(requests).await.unwrap();

        assert_eq!(bundle.get("a"), Some(&json!("fallback")));
    }

    #[tokio::test]
    async fn test_panicking_operation_without_fallback() {
        let requests = FieldRequests::new().pending("a", async {
            if true {
                panic!("operation panicked");
            }
            Ok::<Value, TestError>(json!(1))
        });

        let error = fetch(requests).await.unwrap_err();

        assert!(matches!(error, FetchError::Join { ref field, .. } if field == "a"));
        assert!(error.into_error().is_none());
    }

    #[tokio::test]
    async fn test_first_failing_field_in_input_order_is_reported() {
        let requests = FieldRequests::new()
            .pending("first", async {
                // Finishes after "second" fails.
                tokio::time::sleep(Duration::from_millis(30)).await;
                Err::<Value, _>(TestError("first"))
            })
            .pending("second", fails("second"));

        let error = fetch(requests).await.unwrap_err();

        assert_eq!(error.field(), "first");
    }

    #[tokio::test]
    async fn test_failure_waits_for_remaining_operations() {
        let finished = Arc::new(AtomicBool::new(false));
        let finished_clone = finished.clone();

        let requests = FieldRequests::new()
            .pending("fails", fails("boom"))
            .pending("slow", async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                finished_clone.store(true, Ordering::SeqCst);
                Ok::<_, TestError>(json!(1))
            });

        assert!(fetch(requests).await.is_err());
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_fallback_value_independent_of_error_content() {
        for message in ["unauthorized", "not found", ""] {
            let requests = FieldRequests::new().pending_or("items", fails(message), json!([]));
            let bundle = fetch(requests).await.unwrap();
            assert_eq!(bundle.get("items"), Some(&json!([])));
        }
    }

    #[tokio::test]
    async fn test_operations_run_concurrently() {
        let requests = (0..5)
            .map(|i| {
                (
                    format!("field{i}"),
                    FieldRequest::pending(async move {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok::<_, TestError>(json!(i))
                    }),
                )
            })
            .collect::<FieldRequests<_, _>>();

        let started = std::time::Instant::now();
        let bundle = fetch(requests).await.unwrap();

        assert_eq!(bundle.len(), 5);
        assert!(started.elapsed() < Duration::from_millis(400));
    }
}
