//! # pcqueue - Producer/Consumer Queue
//!
//! pcqueue is a small coordination primitive for threads that hand work to
//! each other. It provides:
//!
//! - **Bounded FIFO queue**: `push` blocks while the queue is full, `pop`
//!   blocks while it is empty
//! - **Explicit lifecycle**: queues start closed; `close` wakes every blocked
//!   caller and turns further pushes into silent drops
//! - **Sequence view**: a queue can be consumed with a plain `for` loop that
//!   ends when the queue closes
//! - **Managed channel**: spawns producer and consumer threads around a queue
//!   and waits for all of them on shutdown
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     ManagedChannel                       │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────┐   │
//! │  │  Producers  │ │  Consumers  │ │   TaskTracker   │   │
//! │  └──────┬──────┘ └──────▲──────┘ └─────────────────┘   │
//! ├─────────┼───────────────┼───────────────────────────────┤
//! │         │      Iter     │                                │
//! ├─────────▼───────────────┴───────────────────────────────┤
//! │                     BoundedQueue                         │
//! │      Mutex<VecDeque<T>> + not_empty / not_full           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::thread;
//! use pcqueue::BoundedQueue;
//!
//! let queue = BoundedQueue::with_capacity(1);
//! queue.open();
//!
//! thread::scope(|s| {
//!     s.spawn(|| {
//!         queue.push(1);
//!         queue.push(2); // waits for the first pop
//!     });
//!
//!     assert_eq!(queue.pop(), Some(1));
//!     assert_eq!(queue.pop(), Some(2));
//!     queue.close();
//! });
//!
//! assert_eq!(queue.pop(), None);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod channel;
pub mod config;
pub mod error;
pub mod queue;

// Re-export commonly used types
pub use channel::{ManagedChannel, Shutdown, TaskKind};
pub use config::{ChannelConfig, QueueConfig, UNBOUNDED};
pub use error::{Error, Result, TryPopError, TryPushError};
pub use queue::{BoundedQueue, Iter, QueueState, QueueStats};
