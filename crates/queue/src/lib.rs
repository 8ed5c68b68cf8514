#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `queue` provides [`Queue`], a generic thread-safe blocking FIFO. Any number
//! of producer threads may [`push`](Queue::push) items; consumer threads block
//! in [`pop`](Queue::pop) until an item is available. The queue carries no
//! domain knowledge and is usable for any payload type.
//!
//! # Design
//!
//! A single mutex guards the underlying [`VecDeque`]; two condition variables
//! signal the two state transitions callers wait on. `pushed` wakes one
//! blocked consumer when an item arrives, `drained` wakes threads parked in
//! [`wait_empty`](Queue::wait_empty) when a pop empties the queue. Both wait
//! paths re-check their condition in a loop, so spurious wakeups are
//! harmless.
//!
//! FIFO order is defined by the order in which `push` calls acquired the
//! internal lock. Two producers that do not synchronise with each other get
//! no cross-thread ordering promise beyond that.
//!
//! # Invariants
//!
//! - `push` never blocks beyond the internal lock and never fails.
//! - `pop` returns items in push order and is the only operation that removes
//!   them.
//! - A panic in some other thread holding the lock does not wedge the queue:
//!   lock poisoning is recovered, since the queue's own critical sections
//!   never leave the deque in a torn state.
//!
//! # Errors
//!
//! No method returns an error. Construction is infallible.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use queue::Queue;
//!
//! let queue = Arc::new(Queue::new());
//!
//! let producer = Arc::clone(&queue);
//! thread::spawn(move || {
//!     for n in 0..3 {
//!         producer.push(n);
//!     }
//! });
//!
//! assert_eq!(queue.pop(), 0);
//! assert_eq!(queue.pop(), 1);
//! assert_eq!(queue.pop(), 2);
//! ```

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Thread-safe blocking FIFO queue.
///
/// Shared between threads behind an [`Arc`](std::sync::Arc). The queue never
/// closes and dropping it does not release waiting threads; a consumer that
/// should stop must be sent a sentinel item, and must be allowed to finish
/// before the queue goes away.
#[derive(Debug)]
pub struct Queue<T> {
    items: Mutex<VecDeque<T>>,
    pushed: Condvar,
    drained: Condvar,
}

impl<T> Queue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            pushed: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    /// Appends an item to the tail and wakes at most one blocked consumer.
    ///
    /// Never blocks beyond the internal lock.
    pub fn push(&self, item: T) {
        let mut items = self.guard();
        items.push_back(item);
        self.pushed.notify_one();
    }

    /// Removes and returns the head, blocking until the queue is non-empty.
    ///
    /// Items come out in the order their `push` calls acquired the internal
    /// lock. When the returned item was the last one, threads blocked in
    /// [`wait_empty`](Self::wait_empty) are woken.
    pub fn pop(&self) -> T {
        let mut items = self.guard();
        // loop to catch spurious wakeups
        loop {
            if let Some(item) = items.pop_front() {
                if items.is_empty() {
                    self.drained.notify_all();
                }
                return item;
            }
            items = self
                .pushed
                .wait(items)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Blocks until the queue transitions to empty.
    ///
    /// Returns after the pop that empties the queue completes. An item popped
    /// by a consumer may still be in flight on the consumer's side when this
    /// returns; only the queue itself is guaranteed drained.
    pub fn wait_empty(&self) {
        let mut items = self.guard();
        // loop to catch spurious wakeups
        while !items.is_empty() {
            items = self
                .drained
                .wait(items)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Returns the number of queued items at this instant.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Reports whether the queue holds no items at this instant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    fn guard(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn pop_returns_items_in_push_order() {
        let queue = Queue::new();
        queue.push("first");
        queue.push("second");
        queue.push("third");

        assert_eq!(queue.pop(), "first");
        assert_eq!(queue.pop(), "second");
        assert_eq!(queue.pop(), "third");
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_blocks_until_an_item_arrives() {
        let queue = Arc::new(Queue::new());

        let producer = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            producer.push(7_u32);
        });

        // Nothing queued yet; this pop must park until the producer runs.
        assert_eq!(queue.pop(), 7);
        handle.join().unwrap();
    }

    #[test]
    fn wait_empty_returns_once_consumer_drains() {
        let queue = Arc::new(Queue::new());
        for n in 0..100 {
            queue.push(n);
        }

        let consumer = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                consumer.pop();
            }
        });

        queue.wait_empty();
        assert!(queue.is_empty());
        handle.join().unwrap();
    }

    #[test]
    fn wait_empty_on_empty_queue_returns_immediately() {
        let queue: Queue<u8> = Queue::new();
        queue.wait_empty();
    }

    #[test]
    fn many_producers_deliver_every_item() {
        let queue = Arc::new(Queue::new());
        let mut handles = vec![];

        for producer in 0..8_u64 {
            let queue = Arc::clone(&queue);
            handles.push(thread::spawn(move || {
                for n in 0..100 {
                    queue.push(producer * 1000 + n);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let mut seen = vec![];
        for _ in 0..800 {
            seen.push(queue.pop());
        }
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 800);
        assert!(queue.is_empty());
    }

    #[test]
    fn items_from_one_producer_stay_ordered() {
        let queue = Arc::new(Queue::new());
        let mut handles = vec![];

        for producer in 0..4_u64 {
            let queue = Arc::clone(&queue);
            handles.push(thread::spawn(move || {
                for n in 0..250 {
                    queue.push((producer, n));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let mut last = [None; 4];
        for _ in 0..1000 {
            let (producer, n) = queue.pop();
            let slot = &mut last[producer as usize];
            if let Some(prev) = *slot {
                assert!(n > prev, "producer {producer} reordered: {prev} then {n}");
            }
            *slot = Some(n);
        }
    }
}
