//! Bounded blocking queue.
//!
//! One mutex guards the buffer, the lifecycle flag and the counters. Two
//! condition variables hang off that mutex: `not_empty` is signaled by
//! pushes, `not_full` by pops. `close` signals both with `notify_all`.
//!
//! Every `close` bumps an epoch. A waiter remembers the epoch it started
//! waiting in and treats any change as closure, so a quick `close` + `open`
//! still releases everyone who was blocked before the close.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::{Iter, QueueState, QueueStats};
use crate::config::{QueueConfig, UNBOUNDED};
use crate::error::{TryPopError, TryPushError};

/// Upper bound on slots reserved at construction; the capacity is a limit,
/// the buffer grows on demand past this.
const PREALLOCATE_LIMIT: usize = 1024;

/// State protected by the queue mutex.
struct Inner<T> {
    /// Buffered items, head first.
    buffer: VecDeque<T>,

    /// Lifecycle flag.
    open: bool,

    /// Number of `close` transitions so far.
    epoch: u64,

    /// Traffic counters.
    stats: QueueStats,
}

/// A thread-safe FIFO queue with optional capacity bound and explicit
/// open/close lifecycle.
///
/// The queue starts closed and must be [`open`](Self::open)ed before use.
/// While closed, [`push`](Self::push) silently drops its argument and
/// [`pop`](Self::pop) returns `None` without blocking.
///
/// # Example
///
/// ```
/// use pcqueue::BoundedQueue;
///
/// let queue = BoundedQueue::with_capacity(2);
/// queue.open();
/// queue.push(1);
/// queue.push(2);
/// assert_eq!(queue.pop(), Some(1));
///
/// queue.close();
/// assert_eq!(queue.pop(), None);
/// ```
pub struct BoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates a closed, unbounded queue.
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Creates a closed queue holding at most `capacity` items.
    ///
    /// A capacity of zero means unbounded.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(QueueConfig::new().with_capacity(capacity))
    }

    /// Creates a closed queue from a configuration.
    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                buffer: VecDeque::with_capacity(config.capacity.min(PREALLOCATE_LIMIT)),
                open: false,
                epoch: 0,
                stats: QueueStats::default(),
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity: config.capacity,
        }
    }

    /// Returns the capacity bound, zero when unbounded.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if the queue has a capacity bound.
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.capacity != UNBOUNDED
    }

    /// Number of `close` transitions so far.
    pub(crate) fn epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    /// Opens the queue. Has no effect on an open queue.
    pub fn open(&self) {
        let mut inner = self.inner.lock();
        if !inner.open {
            inner.open = true;
            log::debug!("queue opened (capacity={}, buffered={})", self.capacity, inner.buffer.len());
        }
    }

    /// Closes the queue and wakes every thread blocked in `push` or `pop`.
    ///
    /// Items still buffered stay in place; they become poppable again if the
    /// queue is re-opened. Has no effect on a closed queue.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if !inner.open {
            return;
        }
        inner.open = false;
        inner.epoch = inner.epoch.wrapping_add(1);
        let buffered = inner.buffer.len();
        drop(inner);

        log::debug!("queue closed with {} buffered item(s)", buffered);

        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Returns true if the queue is open.
    pub fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> QueueState {
        if self.is_open() {
            QueueState::Open
        } else {
            QueueState::Closed
        }
    }

    /// Returns the number of buffered items.
    ///
    /// This is a snapshot; it may be stale by the time it is inspected.
    pub fn len(&self) -> usize {
        self.inner.lock().buffer.len()
    }

    /// Returns true if no items are buffered. Snapshot, like [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.inner.lock().buffer.is_empty()
    }

    /// Returns true if a bounded queue is at capacity. Always false when unbounded.
    pub fn is_full(&self) -> bool {
        let inner = self.inner.lock();
        self.at_capacity(&inner)
    }

    /// Returns a snapshot of the traffic counters.
    pub fn stats(&self) -> QueueStats {
        self.inner.lock().stats
    }

    /// Appends `value` to the tail, blocking while the queue is full.
    ///
    /// If the queue is closed, or gets closed while this call is waiting for
    /// space, the value is dropped and the call returns. Drops are counted in
    /// [`QueueStats::dropped`].
    pub fn push(&self, value: T) {
        let _ = self.push_until(value, None);
    }

    /// Appends `value` only if it can be done without blocking.
    pub fn try_push(&self, value: T) -> Result<(), TryPushError<T>> {
        let mut inner = self.inner.lock();
        if !inner.open {
            inner.stats.dropped += 1;
            return Err(TryPushError::Closed(value));
        }
        if self.at_capacity(&inner) {
            return Err(TryPushError::Full(value));
        }
        self.enqueue(inner, value);
        Ok(())
    }

    /// Appends `value`, waiting at most `timeout` for space.
    pub fn push_timeout(&self, value: T, timeout: Duration) -> Result<(), TryPushError<T>> {
        self.push_until(value, Some(Instant::now() + timeout))
    }

    /// Removes the head item, blocking while the queue is empty.
    ///
    /// Returns `None` if the queue is closed, or gets closed while waiting.
    pub fn pop(&self) -> Option<T> {
        self.pop_until(None).ok()
    }

    /// Removes the head item only if it can be done without blocking.
    pub fn try_pop(&self) -> Result<T, TryPopError> {
        let inner = self.inner.lock();
        if !inner.open {
            return Err(TryPopError::Closed);
        }
        self.dequeue(inner).ok_or(TryPopError::Empty)
    }

    /// Removes the head item, waiting at most `timeout` for one to arrive.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<T, TryPopError> {
        self.pop_until(Some(Instant::now() + timeout))
    }

    /// Returns a blocking iterator that pops items until the queue closes.
    ///
    /// Each call starts a fresh sequence.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    fn at_capacity(&self, inner: &Inner<T>) -> bool {
        self.is_bounded() && inner.buffer.len() >= self.capacity
    }

    fn push_until(&self, value: T, deadline: Option<Instant>) -> Result<(), TryPushError<T>> {
        let mut inner = self.inner.lock();
        if !inner.open {
            inner.stats.dropped += 1;
            log::trace!("push on closed queue, item dropped");
            return Err(TryPushError::Closed(value));
        }

        let epoch = inner.epoch;
        while self.at_capacity(&inner) {
            let timed_out = match deadline {
                Some(deadline) => self.not_full.wait_until(&mut inner, deadline).timed_out(),
                None => {
                    self.not_full.wait(&mut inner);
                    false
                }
            };

            if inner.epoch != epoch {
                inner.stats.dropped += 1;
                log::trace!("queue closed while push was waiting, item dropped");
                return Err(TryPushError::Closed(value));
            }
            if timed_out && self.at_capacity(&inner) {
                return Err(TryPushError::Timeout(value));
            }
        }

        self.enqueue(inner, value);
        Ok(())
    }

    fn pop_until(&self, deadline: Option<Instant>) -> Result<T, TryPopError> {
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(TryPopError::Closed);
        }

        let epoch = inner.epoch;
        while inner.buffer.is_empty() {
            let timed_out = match deadline {
                Some(deadline) => self.not_empty.wait_until(&mut inner, deadline).timed_out(),
                None => {
                    self.not_empty.wait(&mut inner);
                    false
                }
            };

            if inner.epoch != epoch {
                return Err(TryPopError::Closed);
            }
            if timed_out && inner.buffer.is_empty() {
                return Err(TryPopError::Timeout);
            }
        }

        self.dequeue(inner).ok_or(TryPopError::Empty)
    }

    fn enqueue(&self, mut inner: MutexGuard<'_, Inner<T>>, value: T) {
        inner.buffer.push_back(value);
        inner.stats.pushed += 1;
        drop(inner);
        self.not_empty.notify_one();
    }

    fn dequeue(&self, mut inner: MutexGuard<'_, Inner<T>>) -> Option<T> {
        let value = inner.buffer.pop_front()?;
        inner.stats.popped += 1;
        drop(inner);
        if self.is_bounded() {
            self.not_full.notify_one();
        }
        Some(value)
    }
}

impl<T> Default for BoundedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &inner.buffer.len())
            .field("open", &inner.open)
            .field("stats", &inner.stats)
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a BoundedQueue<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
