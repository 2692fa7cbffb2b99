//! Blocking FIFO queue with an open/closed lifecycle.
//!
//! This module provides:
//! - BoundedQueue: the queue itself, optionally capacity bounded
//! - Iter: a lazy sequence over a queue that ends when the queue closes
//! - QueueState / QueueStats: lifecycle and counters snapshots

mod bounded;
mod iter;

pub use bounded::BoundedQueue;
pub use iter::Iter;

/// Queue lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Queue accepts pushes and serves pops.
    Open,

    /// Queue drops pushes and pops return immediately.
    Closed,
}

/// Counters describing queue traffic since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Items enqueued.
    pub pushed: u64,

    /// Items handed out by a pop.
    pub popped: u64,

    /// Pushes discarded because the queue was closed.
    pub dropped: u64,
}
