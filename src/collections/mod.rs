//! Core data structures.
//!
//! Leaf containers with no dependency on the dispatch domain. Managers
//! compose them; each can also be used on its own.
//!
//! | Structure | Backing | Used for |
//! |-----------|---------|----------|
//! | [`PriorityQueue`] | binary heap + id index | active incidents by urgency |
//! | [`IndexTable`] | chained hash table | lookup by id / location, resource pool |
//! | [`ResolvedStore`] | unbalanced BST | resolved incidents keyed by type |
//! | [`LocationTrie`] | character trie | location autocomplete |
//! | [`HistoryLog`] | arena singly linked list | resolution history |

mod history_log;
mod index_table;
mod location_trie;
mod priority_queue;
mod resolved_store;

pub use history_log::{HistoryLog, Iter as HistoryIter};
pub use index_table::{polynomial_hash, IndexTable, TableStats, DEFAULT_MAX_LOAD_FACTOR};
pub use location_trie::LocationTrie;
pub use priority_queue::{Prioritized, PriorityQueue};
pub use resolved_store::ResolvedStore;
