//! Urgency-ordered dispatch queue.
//!
//! A binary min-heap over `(priority, sequence)`: lower priority numbers
//! come out first, and among equal priorities the entry pushed earlier wins.
//! The sequence is a strictly increasing counter stamped at push time, so
//! ordering is deterministic regardless of heap layout.
//!
//! # Complexity
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `push` / `pop` | O(log n) |
//! | `peek` / `contains` | O(1) |
//! | `remove_by_id` / `update_priority` | O(n) (filter + heapify) |
//!
//! Targeted removal rebuilds the heap instead of maintaining positions.
//! Removal by id is rare next to push/pop, and the rebuild keeps the heap a
//! plain `BinaryHeap`.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 6.5 (Priority Queues)

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use tracing::debug;

/// An item that can be queued by urgency.
pub trait Prioritized {
    /// Unique key used for removal and existence checks.
    fn key(&self) -> &str;

    /// Urgency, lower = more urgent.
    fn priority(&self) -> u8;

    /// Overwrites the urgency (used by re-queueing).
    fn set_priority(&mut self, priority: u8);
}

struct Entry<T> {
    priority: u8,
    sequence: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // `BinaryHeap` is a max-heap: "greater" means "more urgent".
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-priority queue with FIFO tie-breaking and an id index.
///
/// # Example
/// ```
/// use u_dispatch::collections::{PriorityQueue, Prioritized};
///
/// struct Call { id: String, priority: u8 }
///
/// impl Prioritized for Call {
///     fn key(&self) -> &str { &self.id }
///     fn priority(&self) -> u8 { self.priority }
///     fn set_priority(&mut self, p: u8) { self.priority = p }
/// }
///
/// let mut queue = PriorityQueue::new();
/// queue.push(Call { id: "P1".into(), priority: 2 });
/// queue.push(Call { id: "P2".into(), priority: 1 });
/// queue.push(Call { id: "P3".into(), priority: 1 });
///
/// let order: Vec<String> = std::iter::from_fn(|| queue.pop()).map(|c| c.id).collect();
/// assert_eq!(order, ["P2", "P3", "P1"]);
/// ```
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    counter: u64,
    // key → sequence of the live entry
    index: HashMap<String, u64>,
}

impl<T: Prioritized> PriorityQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            counter: 0,
            index: HashMap::new(),
        }
    }

    /// Queues an item behind every entry of equal or higher urgency.
    ///
    /// Pushing a key that is already queued replaces the old entry.
    pub fn push(&mut self, item: T) {
        if self.index.contains_key(item.key()) {
            let key = item.key().to_string();
            self.remove_by_id(&key);
        }

        self.counter += 1;
        self.index.insert(item.key().to_string(), self.counter);
        self.heap.push(Entry {
            priority: item.priority(),
            sequence: self.counter,
            item,
        });
    }

    /// Removes and returns the most urgent item.
    pub fn pop(&mut self) -> Option<T> {
        let entry = self.heap.pop()?;
        self.index.remove(entry.item.key());
        Some(entry.item)
    }

    /// The most urgent item, without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.heap.peek().map(|e| &e.item)
    }

    /// Removes a specific item by key.
    ///
    /// Filters the backing array and re-heapifies: O(n).
    pub fn remove_by_id(&mut self, key: &str) -> Option<T> {
        let sequence = self.index.remove(key)?;

        let mut entries = std::mem::take(&mut self.heap).into_vec();
        let position = entries.iter().position(|e| e.sequence == sequence);
        let removed = position.map(|i| entries.swap_remove(i));
        self.heap = BinaryHeap::from(entries);

        removed.map(|e| e.item)
    }

    /// Changes an item's priority by re-queueing it.
    ///
    /// The item gets a fresh sequence number, so it moves behind every entry
    /// already queued at the new priority. Returns `false` if the key is not
    /// queued.
    pub fn update_priority(&mut self, key: &str, priority: u8) -> bool {
        match self.remove_by_id(key) {
            Some(mut item) => {
                debug!(key, priority, "re-queueing with new priority");
                item.set_priority(priority);
                self.push(item);
                true
            }
            None => false,
        }
    }

    /// Every queued item, most urgent first. Non-destructive.
    pub fn all_by_priority_order(&self) -> Vec<&T> {
        let mut entries: Vec<&Entry<T>> = self.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|e| &e.item).collect()
    }

    /// Queued items at exactly `priority`, in dispatch order.
    pub fn by_priority(&self, priority: u8) -> Vec<&T> {
        self.all_by_priority_order()
            .into_iter()
            .filter(|item| item.priority() == priority)
            .collect()
    }

    /// Whether `key` is queued. O(1).
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of queued items.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drops every item and resets the sequence counter.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.index.clear();
        self.counter = 0;
    }

    /// Count of queued items per priority.
    pub fn stats(&self) -> BTreeMap<u8, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.heap.iter() {
            *counts.entry(entry.priority).or_insert(0) += 1;
        }
        counts
    }
}

impl<T: Prioritized> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for PriorityQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("len", &self.heap.len())
            .field("counter", &self.counter)
            .finish()
    }
}
