//! Append-only resolution history.
//!
//! A singly linked sequence stored in an arena: nodes live in a `Vec` and
//! link forward by index, giving O(1) append at the tail without shared
//! ownership. There is no removal or reordering; once appended, an entry
//! keeps its position forever.

#[derive(Debug, Clone)]
struct Node<T> {
    data: T,
    next: Option<usize>,
}

/// Append-only singly linked log.
#[derive(Debug, Clone)]
pub struct HistoryLog<T> {
    nodes: Vec<Node<T>>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<T> HistoryLog<T> {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// Appends `data` at the tail.
    pub fn append(&mut self, data: T) {
        let index = self.nodes.len();
        self.nodes.push(Node { data, next: None });
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
    }

    /// Walks the links from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            log: self,
            cursor: self.head,
        }
    }

    /// Every entry, oldest first.
    pub fn get_all(&self) -> Vec<&T> {
        self.iter().collect()
    }

    /// The last `n` entries, oldest first.
    pub fn last_n(&self, n: usize) -> Vec<&T> {
        let skip = self.len().saturating_sub(n);
        self.iter().skip(skip).collect()
    }

    /// Most recently appended entry.
    pub fn last(&self) -> Option<&T> {
        self.tail.map(|i| &self.nodes[i].data)
    }

    /// Whether any entry equals `data`.
    pub fn contains(&self, data: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|d| d == data)
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the log is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl<T> Default for HistoryLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward iterator over a [`HistoryLog`].
pub struct Iter<'a, T> {
    log: &'a HistoryLog<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.log.nodes[self.cursor?];
        self.cursor = node.next;
        Some(&node.data)
    }
}

impl<'a, T> IntoIterator for &'a HistoryLog<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
