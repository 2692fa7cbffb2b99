//! Supervised producer and consumer threads bound to a queue.
//!
//! This module provides the [`ManagedChannel`] wrapper, which owns a
//! [`BoundedQueue`](crate::BoundedQueue) and the threads feeding and
//! draining it, and the [`Shutdown`] report returned when it closes.

mod managed;
mod tracker;

use core::fmt;

pub use managed::ManagedChannel;

/// Role of a spawned task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Calls a generator and pushes its results.
    Producer,

    /// Pops items and hands them to a handler.
    Consumer,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Producer => f.write_str("producer"),
            TaskKind::Consumer => f.write_str("consumer"),
        }
    }
}

/// Outcome of closing a [`ManagedChannel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shutdown {
    /// Tasks joined during this close, panicked ones included.
    pub joined: usize,

    /// Tasks whose generator or handler panicked.
    pub panicked: usize,
}

impl Shutdown {
    /// Returns true if every joined task exited normally.
    pub fn is_clean(&self) -> bool {
        self.panicked == 0
    }
}
