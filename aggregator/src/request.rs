use indexmap::IndexMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// A unit of asynchronous work producing a field's value.
pub type PendingOperation<V, E> = Pin<Box<dyn Future<Output = Result<V, E>> + Send + 'static>>;

/// A single named slot of a fetch.
pub enum FieldRequest<V, E> {
    /// A value known up front. It is passed through untouched and no task is spawned for it.
    Ready(V),
    /// An operation to run concurrently with the other pending fields.
    ///
    /// When `fallback` is set, a failure of `operation` resolves the field to
    /// the fallback instead of failing the fetch.
    Pending {
        operation: PendingOperation<V, E>,
        fallback: Option<V>,
    },
}

impl<V, E> FieldRequest<V, E> {
    pub fn ready(value: V) -> Self {
        FieldRequest::Ready(value)
    }

    pub fn pending<F>(operation: F) -> Self
    where
        F: Future<Output = Result<V, E>> + Send + 'static,
    {
        FieldRequest::Pending {
            operation: Box::pin(operation),
            fallback: None,
        }
    }

    /// Declares the value used if the pending operation fails.
    ///
    /// Has no effect on a ready value, which cannot fail.
    pub fn with_fallback(self, value: V) -> Self {
        match self {
            FieldRequest::Pending { operation, .. } => FieldRequest::Pending {
                operation,
                fallback: Some(value),
            },
            ready => ready,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FieldRequest::Pending { .. })
    }
}

impl<V: fmt::Debug, E> fmt::Debug for FieldRequest<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRequest::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            FieldRequest::Pending { fallback, .. } => f
                .debug_struct("Pending")
                .field("fallback", fallback)
                .finish_non_exhaustive(),
        }
    }
}

/// The input of a fetch: field names mapped to their requests, in insertion order.
///
/// Names are unique. Inserting a name twice replaces the first request but
/// keeps its position.
pub struct FieldRequests<V, E> {
    fields: IndexMap<String, FieldRequest<V, E>>,
}

impl<V, E> FieldRequests<V, E> {
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, request: FieldRequest<V, E>) {
        self.fields.insert(name.into(), request);
    }

    pub fn ready(mut self, name: impl Into<String>, value: V) -> Self {
        self.insert(name, FieldRequest::ready(value));
        self
    }

    pub fn pending<F>(mut self, name: impl Into<String>, operation: F) -> Self
    where
        F: Future<Output = Result<V, E>> + Send + 'static,
    {
        self.insert(name, FieldRequest::pending(operation));
        self
    }

    pub fn pending_or<F>(mut self, name: impl Into<String>, operation: F, fallback: V) -> Self
    where
        F: Future<Output = Result<V, E>> + Send + 'static,
    {
        self.insert(name, FieldRequest::pending(operation).with_fallback(fallback));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.fields.values().filter(|r| r.is_pending()).count()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<V, E> Default for FieldRequests<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> IntoIterator for FieldRequests<V, E> {
    type Item = (String, FieldRequest<V, E>);
    type IntoIter = indexmap::map::IntoIter<String, FieldRequest<V, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<V, E> FromIterator<(String, FieldRequest<V, E>)> for FieldRequests<V, E> {
    fn from_iter<I: IntoIterator<Item = (String, FieldRequest<V, E>)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
