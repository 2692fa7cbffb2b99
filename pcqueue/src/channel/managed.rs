//! Queue wrapper that spawns and supervises producer/consumer threads.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use super::tracker::TaskTracker;
use super::{Shutdown, TaskKind};
use crate::config::ChannelConfig;
use crate::error::{Error, Result};
use crate::queue::BoundedQueue;

/// State shared with every spawned task.
struct Shared<T> {
    /// Transport between producers and consumers.
    queue: BoundedQueue<T>,

    /// Producer loops run while this is set.
    running: AtomicBool,
}

/// A [`BoundedQueue`] together with the threads that feed and drain it.
///
/// [`produce`](Self::produce) and [`consume`](Self::consume) each spawn one
/// thread bound to the channel's lifecycle. [`close`](Self::close) stops
/// them and does not return until every one of them has exited. Dropping
/// the channel closes it.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use pcqueue::ManagedChannel;
///
/// let channel = ManagedChannel::with_capacity(8);
/// channel.open();
///
/// let mut next = 0u64;
/// channel.produce(move || { next += 1; next }).unwrap();
///
/// let total = Arc::new(AtomicU64::new(0));
/// let sink = Arc::clone(&total);
/// channel.consume(move |v| { sink.fetch_add(v, Ordering::Relaxed); }).unwrap();
///
/// let report = channel.close();
/// assert_eq!(channel.task_count(), 0);
/// assert!(report.is_clean());
/// ```
pub struct ManagedChannel<T> {
    /// Queue and run flag, shared with tasks.
    shared: Arc<Shared<T>>,

    /// Live task counter.
    tracker: Arc<TaskTracker>,

    /// Handles of tasks spawned since the last close.
    handles: Mutex<Vec<JoinHandle<()>>>,

    /// Sequence used to name spawned threads.
    next_task_id: AtomicUsize,

    /// Thread naming and sizing.
    config: ChannelConfig,
}

impl<T> ManagedChannel<T> {
    /// Creates a closed channel over an unbounded queue.
    pub fn new() -> Self {
        Self::with_config(ChannelConfig::default())
    }

    /// Creates a closed channel over a queue holding at most `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(ChannelConfig::new().with_capacity(capacity))
    }

    /// Creates a closed channel from a configuration.
    pub fn with_config(config: ChannelConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: BoundedQueue::with_config(config.queue.clone()),
                running: AtomicBool::new(false),
            }),
            tracker: Arc::new(TaskTracker::new()),
            handles: Mutex::new(Vec::new()),
            next_task_id: AtomicUsize::new(0),
            config,
        }
    }

    /// Enables task loops and opens the inner queue.
    ///
    /// Tasks spawned before the most recent `close` stay stopped; only tasks
    /// spawned after this call run.
    pub fn open(&self) {
        self.shared.running.store(true, Ordering::Release);
        self.shared.queue.open();
    }

    /// Stops all tasks and waits for them to exit.
    ///
    /// The run flag is cleared first, then the queue is closed so that tasks
    /// blocked in `push` or `pop` wake up, and only then does the caller wait
    /// for the task count to reach zero. Calling `close` on a closed channel
    /// returns an empty report.
    pub fn close(&self) -> Shutdown {
        self.shared.running.store(false, Ordering::Release);
        self.shared.queue.close();
        self.tracker.wait_idle();

        let handles = std::mem::take(&mut *self.handles.lock());
        let mut report = Shutdown::default();
        for handle in handles {
            let name = handle.thread().name().unwrap_or("<unnamed>").to_string();
            report.joined += 1;
            if handle.join().is_err() {
                report.panicked += 1;
                log::error!("task {} panicked", name);
            }
        }

        if report.joined > 0 {
            log::debug!(
                "channel closed: {} task(s) joined, {} panicked",
                report.joined,
                report.panicked
            );
        }
        report
    }

    /// Returns true between `open` and `close`.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Returns the number of spawned tasks that have not exited yet.
    pub fn task_count(&self) -> usize {
        self.tracker.count()
    }

    /// Pushes an item directly into the inner queue.
    ///
    /// Blocks while the queue is full; dropped if the channel is closed.
    pub fn push(&self, value: T) {
        self.shared.queue.push(value);
    }

    /// Returns true if the inner queue holds no items. Snapshot.
    pub fn is_empty(&self) -> bool {
        self.shared.queue.is_empty()
    }

    /// Returns the number of items in the inner queue. Snapshot.
    pub fn len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Returns the inner queue for manual pops or iteration.
    pub fn queue(&self) -> &BoundedQueue<T> {
        &self.shared.queue
    }
}

impl<T: Send + 'static> ManagedChannel<T> {
    /// Spawns a producer thread.
    ///
    /// The thread calls `generator` and pushes each result for as long as the
    /// channel is running. A push blocked on a full queue is released by
    /// `close`, after which the loop observes the cleared run flag and exits.
    /// The loop also exits once the queue has been closed since the thread
    /// started, even if the channel was re-opened in the meantime.
    pub fn produce<F>(&self, mut generator: F) -> Result<()>
    where
        F: FnMut() -> T + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        self.spawn(TaskKind::Producer, move || {
            let epoch = shared.queue.epoch();
            while shared.running.load(Ordering::Acquire) && shared.queue.epoch() == epoch {
                let value = generator();
                shared.queue.push(value);
            }
        })
    }

    /// Spawns a consumer thread.
    ///
    /// The thread pops items and passes each to `handler` until the queue
    /// reports that it is closed.
    pub fn consume<F>(&self, mut handler: F) -> Result<()>
    where
        F: FnMut(T) + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        self.spawn(TaskKind::Consumer, move || {
            for item in shared.queue.iter() {
                handler(item);
            }
        })
    }

    /// Registers a task, then starts it on a named thread.
    ///
    /// The registration guard moves into the thread and is the last thing it
    /// drops, on normal exit and on unwind. If the OS refuses the thread the
    /// closure, guard included, is dropped by `spawn`, which rolls the count
    /// back.
    fn spawn<F>(&self, kind: TaskKind, body: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{}-{}", self.config.thread_name, kind, id);

        let mut builder = thread::Builder::new().name(name.clone());
        if let Some(size) = self.config.stack_size {
            builder = builder.stack_size(size);
        }

        let guard = self.tracker.enter();
        let task_name = name.clone();
        let spawned = builder.spawn(move || {
            let _guard = guard;
            log::debug!("task {} started", task_name);
            body();
            log::debug!("task {} exiting", task_name);
        });

        match spawned {
            Ok(handle) => {
                self.handles.lock().push(handle);
                Ok(())
            }
            Err(source) => {
                log::error!("failed to spawn {}: {}", name, source);
                Err(Error::Spawn { name, source })
            }
        }
    }
}

impl<T> Default for ManagedChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for ManagedChannel<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T> fmt::Debug for ManagedChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedChannel")
            .field("queue", &self.shared.queue)
            .field("running", &self.is_running())
            .field("task_count", &self.task_count())
            .finish()
    }
}
