//! Live task accounting for the managed channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};

/// Counts running tasks and lets a caller block until none are left.
///
/// The counter itself is atomic; the mutex/condvar pair backs
/// [`wait_idle`](Self::wait_idle). The last task to leave takes the mutex
/// before notifying, so a waiter cannot miss the wakeup between its check
/// and its wait.
#[derive(Debug, Default)]
pub(crate) struct TaskTracker {
    count: AtomicUsize,
    lock: Mutex<()>,
    idle: Condvar,
}

impl TaskTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a task. The returned guard deregisters it when dropped,
    /// including during unwinding.
    pub(crate) fn enter(self: &Arc<Self>) -> TaskGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        TaskGuard {
            tracker: Arc::clone(self),
        }
    }

    /// Number of registered tasks.
    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Blocks until every registered task has left.
    pub(crate) fn wait_idle(&self) {
        let mut lock = self.lock.lock();
        while self.count.load(Ordering::Acquire) != 0 {
            self.idle.wait(&mut lock);
        }
    }

    fn leave(&self) {
        if self.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _lock = self.lock.lock();
            self.idle.notify_all();
        }
    }
}

/// Registration of one running task.
#[derive(Debug)]
pub(crate) struct TaskGuard {
    tracker: Arc<TaskTracker>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.tracker.leave();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_guard_counts() {
        let tracker = Arc::new(TaskTracker::new());
        let a = tracker.enter();
        let b = tracker.enter();
        assert_eq!(tracker.count(), 2);

        drop(a);
        assert_eq!(tracker.count(), 1);
        drop(b);
        assert_eq!(tracker.count(), 0);

        // nothing registered, returns at once
        tracker.wait_idle();
    }

    #[test]
    fn test_wait_idle_blocks_until_last_guard() {
        let tracker = Arc::new(TaskTracker::new());
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let guard = tracker.enter();
                thread::spawn(move || {
                    let _guard = guard;
                    thread::sleep(Duration::from_millis(10 * (i + 1)));
                })
            })
            .collect();

        tracker.wait_idle();
        assert_eq!(tracker.count(), 0);

        for worker in workers {
            worker.join().unwrap();
        }
    }

    #[test]
    fn test_guard_released_on_panic() {
        let tracker = Arc::new(TaskTracker::new());
        let guard = tracker.enter();
        let worker = thread::spawn(move || {
            let _guard = guard;
            panic!("task failure");
        });

        tracker.wait_idle();
        assert!(worker.join().is_err());
    }
}
