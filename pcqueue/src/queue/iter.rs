//! Lazy sequence view of a queue.

use core::fmt;
use core::iter::FusedIterator;
use core::ptr;

use super::BoundedQueue;

/// Blocking iterator over a [`BoundedQueue`].
///
/// Every call to `next` performs one blocking pop. The sequence ends the
/// first time a pop reports that the queue is closed; after that the
/// iterator stays exhausted even if the queue is re-opened.
///
/// Created by [`BoundedQueue::iter`] or by iterating `&BoundedQueue`.
pub struct Iter<'a, T> {
    queue: &'a BoundedQueue<T>,
    exhausted: bool,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(queue: &'a BoundedQueue<T>) -> Self {
        Self {
            queue,
            exhausted: false,
        }
    }

    /// Returns true once the iterator has observed the queue closing.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.exhausted {
            return None;
        }
        let item = self.queue.pop();
        if item.is_none() {
            self.exhausted = true;
        }
        item
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// Two iterators are equal when they walk the same queue and agree on
/// whether the end has been reached. Carried values never take part.
impl<T> PartialEq for Iter<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.queue, other.queue) && self.exhausted == other.exhausted
    }
}

impl<T> Eq for Iter<'_, T> {}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("queue", &ptr::from_ref(self.queue))
            .field("exhausted", &self.exhausted)
            .finish()
    }
}
