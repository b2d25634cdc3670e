//! Main-thread dispatch queue.
//!
//! Device callbacks (the MIDI input thread, the MQTT worker) must never
//! touch game state. They push into a [`Dispatcher`]; the frame loop drains
//! it once per frame and handles everything in arrival order.
//!
//! The queue is bounded. When it is full new items are dropped and
//! counted, so a stalled frame loop cannot grow memory without limit.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

/// Thread-safe FIFO shared between producers and the frame loop.
pub struct Dispatcher<T> {
    inner: Arc<Mutex<DispatcherInner<T>>>,
}

struct DispatcherInner<T> {
    items: VecDeque<T>,
    capacity: usize,
    total_pushed: u64,
    total_dropped: u64,
    total_drained: u64,
}

/// Statistics about a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    /// Items waiting.
    pub depth: usize,
    /// Items accepted.
    pub total_pushed: u64,
    /// Items rejected because the queue was full.
    pub total_dropped: u64,
    /// Items handed to the frame loop.
    pub total_drained: u64,
}

impl<T> Dispatcher<T> {
    /// Create a queue holding at most `capacity` items (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            warn!("dispatch capacity 0, using 1");
        }
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(DispatcherInner {
                items: VecDeque::new(),
                capacity,
                total_pushed: 0,
                total_dropped: 0,
                total_drained: 0,
            })),
        }
    }

    /// Queue an item. Returns `false` when the queue is full.
    pub fn push(&self, item: T) -> bool {
        let mut inner = self.inner.lock();
        if inner.items.len() >= inner.capacity {
            inner.total_dropped += 1;
            if inner.total_dropped.is_power_of_two() {
                warn!(dropped = inner.total_dropped, "dispatch queue full, dropping");
            }
            return false;
        }
        inner.total_pushed += 1;
        inner.items.push_back(item);
        true
    }

    /// Take everything queued, oldest first.
    ///
    /// The lock is held only for the swap; callers process the batch
    /// without blocking producers.
    pub fn drain(&self) -> Vec<T> {
        let items = {
            let mut inner = self.inner.lock();
            inner.total_drained += inner.items.len() as u64;
            std::mem::take(&mut inner.items)
        };
        Vec::from(items)
    }

    /// Current queue depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Maximum depth.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    /// Get queue statistics.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        let inner = self.inner.lock();
        DispatchStats {
            depth: inner.items.len(),
            total_pushed: inner.total_pushed,
            total_dropped: inner.total_dropped,
            total_drained: inner.total_drained,
        }
    }
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_arrival_order() {
        let queue = Dispatcher::new(8);
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.drain(), vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_drops_new_items() {
        let queue = Dispatcher::new(2);
        assert!(queue.push('a'));
        assert!(queue.push('b'));
        assert!(!queue.push('c'));

        let stats = queue.stats();
        assert_eq!(stats.total_dropped, 1);
        assert_eq!(stats.depth, 2);
        assert_eq!(queue.drain(), vec!['a', 'b']);
    }

    #[test]
    fn zero_capacity_still_holds_one_item() {
        let queue = Dispatcher::new(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.push(7));
        assert!(!queue.push(8));
        assert_eq!(queue.drain(), vec![7]);
    }

    #[test]
    fn stats_tracking() {
        let queue = Dispatcher::new(16);
        queue.push(());
        queue.push(());
        queue.drain();
        queue.push(());

        let stats = queue.stats();
        assert_eq!(stats.total_pushed, 3);
        assert_eq!(stats.total_drained, 2);
        assert_eq!(stats.depth, 1);
    }

    #[test]
    fn clone_shares_state() {
        let queue1 = Dispatcher::new(4);
        let queue2 = queue1.clone();
        queue1.push("x");
        assert_eq!(queue2.len(), 1);
        assert_eq!(queue2.capacity(), 4);
    }

    #[test]
    fn producers_on_other_threads() {
        let queue = Dispatcher::new(1000);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let q = queue.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        q.push(t * 100 + i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("producer thread");
        }
        let mut items = queue.drain();
        items.sort_unstable();
        assert_eq!(items, (0..400).collect::<Vec<_>>());
    }
}
