//! Unbalanced binary search tree for resolved records.
//!
//! Keys go left when strictly smaller than the node key and right otherwise,
//! so equal keys form a right-leaning chain and every duplicate is kept as
//! its own node. No rebalancing is done: inserting keys in sorted order, or
//! many records under one key, degrades height to O(n).
//!
//! All walks (search, traversals, height, drop) use explicit stacks, so a
//! degenerate chain of any length cannot overflow the call stack.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 12 (Binary Search Trees)

use std::cmp::Ordering;
use std::collections::BTreeMap;

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
}

/// Binary search tree allowing duplicate keys.
pub struct ResolvedStore<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K: Ord, V> ResolvedStore<K, V> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Inserts a value. Equal keys descend right.
    pub fn insert(&mut self, key: K, value: V) {
        let mut cursor = &mut self.root;
        while let Some(node) = cursor {
            cursor = if key < node.key {
                &mut node.left
            } else {
                &mut node.right
            };
        }
        *cursor = Some(Box::new(Node {
            key,
            value,
            left: None,
            right: None,
        }));
        self.len += 1;
    }

    /// Every value stored under `key`.
    ///
    /// An exact match keeps probing both children so the whole duplicate
    /// chain is collected.
    pub fn search(&self, key: &K) -> Vec<&V> {
        let mut results = Vec::new();
        let mut stack: Vec<&Node<K, V>> = self.root.as_deref().into_iter().collect();

        while let Some(node) = stack.pop() {
            match key.cmp(&node.key) {
                Ordering::Less => stack.extend(node.left.as_deref()),
                Ordering::Greater => stack.extend(node.right.as_deref()),
                Ordering::Equal => {
                    results.push(&node.value);
                    stack.extend(node.right.as_deref());
                    stack.extend(node.left.as_deref());
                }
            }
        }
        results
    }

    /// Values in key order (left, node, right).
    pub fn inorder(&self) -> Vec<&V> {
        self.inorder_nodes().into_iter().map(|n| &n.value).collect()
    }

    fn inorder_nodes(&self) -> Vec<&Node<K, V>> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node<K, V>> = Vec::new();
        let mut current = self.root.as_deref();

        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            if let Some(node) = stack.pop() {
                out.push(node);
                current = node.right.as_deref();
            }
        }
        out
    }

    /// Values in node, left, right order.
    pub fn preorder(&self) -> Vec<&V> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node<K, V>> = self.root.as_deref().into_iter().collect();

        while let Some(node) = stack.pop() {
            out.push(&node.value);
            stack.extend(node.right.as_deref());
            stack.extend(node.left.as_deref());
        }
        out
    }

    /// Values in left, right, node order.
    pub fn postorder(&self) -> Vec<&V> {
        // node-right-left preorder, reversed
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node<K, V>> = self.root.as_deref().into_iter().collect();

        while let Some(node) = stack.pop() {
            out.push(&node.value);
            stack.extend(node.left.as_deref());
            stack.extend(node.right.as_deref());
        }
        out.reverse();
        out
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty).
    pub fn height(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(&Node<K, V>, usize)> =
            self.root.as_deref().map(|n| (n, 1)).into_iter().collect();

        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(node.left.as_deref().map(|n| (n, depth + 1)));
            stack.extend(node.right.as_deref().map(|n| (n, depth + 1)));
        }
        max_depth
    }

    /// Total stored values, duplicates included.
    #[inline]
    pub fn size(&self) -> usize {
        self.len
    }

    /// Whether the tree is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Distinct keys, ascending.
    pub fn all_keys(&self) -> Vec<&K> {
        let mut keys: Vec<&K> = self.inorder_nodes().into_iter().map(|n| &n.key).collect();
        keys.dedup();
        keys
    }

    /// Number of values stored under each key.
    pub fn count_by_key(&self) -> BTreeMap<&K, usize> {
        let mut counts = BTreeMap::new();
        for node in self.inorder_nodes() {
            *counts.entry(&node.key).or_insert(0) += 1;
        }
        counts
    }
}

impl<K: Ord, V> Default for ResolvedStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for ResolvedStore<K, V> {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<K, V> std::fmt::Debug for ResolvedStore<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedStore").field("len", &self.len).finish()
    }
}
