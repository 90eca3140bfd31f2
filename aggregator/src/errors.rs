use thiserror::Error;

/// Failure of a whole [`fetch`](crate::fetch) call.
///
/// Only fields without a fallback produce this. The operation's own error is
/// carried as-is in [`FetchError::Field`].
#[derive(Error, Debug)]
pub enum FetchError<E> {
    #[error("field `{field}` failed: {error}")]
    Field { field: String, error: E },

    /// The task driving the field's operation panicked or was cancelled.
    #[error("field `{field}` did not complete: {source}")]
    Join {
        field: String,
        source: tokio::task::JoinError,
    },
}

impl<E> FetchError<E> {
    /// Name of the field that failed the fetch.
    pub fn field(&self) -> &str {
        match self {
            FetchError::Field { field, .. } | FetchError::Join { field, .. } => field,
        }
    }

    /// Returns the operation's error, if the failure came from one.
    pub fn into_error(self) -> Option<E> {
        match self {
            FetchError::Field { error, .. } => Some(error),
            FetchError::Join { .. } => None,
        }
    }
}
