//! Error types for queue and channel operations.

use core::fmt;
use std::io;

use thiserror::Error as ThisError;

/// Errors returned by the managed channel.
///
/// Queue operations themselves never fail: pushing into or popping from a
/// closed queue is a silent no-op, not an error.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker thread {name:?}: {source}")]
    Spawn {
        /// Name the thread would have been given.
        name: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::Spawn { .. } => "spawn_failed",
        }
    }
}

/// Error returned by the non-blocking and bounded-wait push variants.
///
/// Each variant hands the rejected item back to the caller.
#[derive(Clone, Copy, PartialEq, Eq, ThisError)]
pub enum TryPushError<T> {
    /// The queue was at capacity.
    #[error("queue is full")]
    Full(T),

    /// The queue was closed; the item was not enqueued.
    #[error("queue is closed")]
    Closed(T),

    /// No space became available before the deadline.
    #[error("timed out waiting for queue capacity")]
    Timeout(T),
}

impl<T> TryPushError<T> {
    /// Returns the item that could not be pushed.
    pub fn into_inner(self) -> T {
        match self {
            TryPushError::Full(v) | TryPushError::Closed(v) | TryPushError::Timeout(v) => v,
        }
    }

    /// Returns true if the push failed because the queue is closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, TryPushError::Closed(_))
    }
}

// Manual impl so `T` does not need to be `Debug`.
impl<T> fmt::Debug for TryPushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryPushError::Full(_) => f.write_str("Full(..)"),
            TryPushError::Closed(_) => f.write_str("Closed(..)"),
            TryPushError::Timeout(_) => f.write_str("Timeout(..)"),
        }
    }
}

/// Error returned by the non-blocking and bounded-wait pop variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum TryPopError {
    /// The queue is open but holds no items.
    #[error("queue is empty")]
    Empty,

    /// The queue is closed.
    #[error("queue is closed")]
    Closed,

    /// No item arrived before the deadline.
    #[error("timed out waiting for an item")]
    Timeout,
}

/// Result alias for channel operations.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_push_error_returns_item() {
        let err = TryPushError::Full(7);
        assert_eq!(err.into_inner(), 7);

        let err = TryPushError::Closed("x");
        assert!(err.is_closed());
        assert_eq!(err.into_inner(), "x");
    }

    #[test]
    fn test_display() {
        assert_eq!(TryPopError::Closed.to_string(), "queue is closed");
        assert_eq!(TryPushError::Timeout(()).to_string(), "timed out waiting for queue capacity");

        let err = Error::Spawn {
            name: "pcqueue-producer-0".into(),
            source: io::Error::other("no threads left"),
        };
        assert_eq!(err.as_label(), "spawn_failed");
        assert!(err.to_string().contains("pcqueue-producer-0"));
    }
}
