//! Prefix tree for location autocomplete.
//!
//! Words are lowercased on every operation. Children are kept in a
//! `BTreeMap`, so collecting descendants visits branches in ascending
//! character order and autocomplete output is lexicographic.
//!
//! Collection and deletion are iterative; neither depends on the call stack
//! depth for long words.

use std::collections::BTreeMap;

use tracing::debug;

#[derive(Debug, Clone)]
struct TrieNode<P> {
    children: BTreeMap<char, TrieNode<P>>,
    is_end: bool,
    payload: Option<P>,
}

impl<P> TrieNode<P> {
    fn new() -> Self {
        Self {
            children: BTreeMap::new(),
            is_end: false,
            payload: None,
        }
    }
}

impl<P> Drop for TrieNode<P> {
    // Drains descendants onto a heap stack instead of recursing per level.
    fn drop(&mut self) {
        let mut stack: Vec<TrieNode<P>> =
            std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}

/// Character trie carrying an optional payload per word.
#[derive(Debug, Clone)]
pub struct LocationTrie<P> {
    root: TrieNode<P>,
    len: usize,
}

impl<P> LocationTrie<P> {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(),
            len: 0,
        }
    }

    /// Inserts `word`, replacing the payload if the word is already present.
    pub fn insert(&mut self, word: &str, payload: P) {
        let mut node = &mut self.root;
        for c in word.to_lowercase().chars() {
            node = node.children.entry(c).or_insert_with(TrieNode::new);
        }
        if !node.is_end {
            self.len += 1;
        }
        node.is_end = true;
        node.payload = Some(payload);
    }

    fn find(&self, prefix: &str) -> Option<&TrieNode<P>> {
        let mut node = &self.root;
        for c in prefix.to_lowercase().chars() {
            node = node.children.get(&c)?;
        }
        Some(node)
    }

    /// Whether `word` was inserted as a whole word.
    pub fn search(&self, word: &str) -> bool {
        self.find(word).is_some_and(|n| n.is_end)
    }

    /// Whether any stored word starts with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.find(prefix).is_some()
    }

    /// Up to `max_results` words starting with `prefix`, in ascending order.
    pub fn autocomplete(&self, prefix: &str, max_results: usize) -> Vec<(String, &P)> {
        let prefix = prefix.to_lowercase();
        match self.find(&prefix) {
            Some(node) => collect(node, prefix, max_results),
            None => Vec::new(),
        }
    }

    /// Every stored word, in ascending order.
    pub fn all_words(&self) -> Vec<(String, &P)> {
        collect(&self.root, String::new(), usize::MAX)
    }

    /// Removes `word`. Returns whether it was present.
    ///
    /// Nodes left with no children are pruned bottom-up, stopping at the
    /// first ancestor that ends another word or still branches elsewhere.
    pub fn delete(&mut self, word: &str) -> bool {
        let chars: Vec<char> = word.to_lowercase().chars().collect();

        // Deepest node on the path that must survive pruning.
        let mut keep_depth = 0;
        let mut node = &mut self.root;
        for (depth, c) in chars.iter().enumerate() {
            if depth > 0 && (node.is_end || node.children.len() > 1) {
                keep_depth = depth;
            }
            match node.children.get_mut(c) {
                Some(child) => node = child,
                None => return false,
            }
        }
        if !node.is_end {
            return false;
        }

        node.is_end = false;
        node.payload = None;
        self.len -= 1;

        if chars.is_empty() || !node.children.is_empty() {
            return true;
        }

        let mut anchor = &mut self.root;
        for c in &chars[..keep_depth] {
            match anchor.children.get_mut(c) {
                Some(child) => anchor = child,
                None => return true,
            }
        }
        anchor.children.remove(&chars[keep_depth]);
        debug!(word, pruned_from = keep_depth, "trie branch pruned");
        true
    }

    /// Number of stored words.
    #[inline]
    pub fn size(&self) -> usize {
        self.len
    }

    /// Whether the trie holds no words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every word.
    pub fn clear(&mut self) {
        self.root = TrieNode::new();
        self.len = 0;
    }
}

impl<P> Default for LocationTrie<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first, ascending-character collection below `start`.
fn collect<P>(start: &TrieNode<P>, prefix: String, max_results: usize) -> Vec<(String, &P)> {
    let mut results = Vec::new();
    let mut stack: Vec<(&TrieNode<P>, String)> = vec![(start, prefix)];

    while let Some((node, word)) = stack.pop() {
        if results.len() >= max_results {
            break;
        }
        // Children pushed in reverse so the smallest character pops first.
        for (c, child) in node.children.iter().rev() {
            let mut next = word.clone();
            next.push(*c);
            stack.push((child, next));
        }
        if node.is_end {
            if let Some(payload) = node.payload.as_ref() {
                results.push((word, payload));
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(results: &[(String, &u32)]) -> Vec<String> {
        results.iter().map(|(w, _)| w.clone()).collect()
    }

    #[test]
    fn test_autocomplete_is_alphabetical() {
        let mut t = LocationTrie::new();
        t.insert("andheri west", 1);
        t.insert("andheri east", 2);
        let hits = t.autocomplete("andh", 10);
        assert_eq!(words(&hits), vec!["andheri east", "andheri west"]);
        assert_eq!(*hits[0].1, 2);
    }

    #[test]
    fn test_autocomplete_prefix_word_first() {
        let mut t = LocationTrie::new();
        t.insert("bandra", 1);
        t.insert("ban", 2);
        t.insert("bangalore", 3);
        t.insert("borivali", 4);
        assert_eq!(
            words(&t.autocomplete("ban", 10)),
            vec!["ban", "bandra", "bangalore"]
        );
    }

    #[test]
    fn test_autocomplete_respects_limit() {
        let mut t = LocationTrie::new();
        for (i, w) in ["kurla", "kandivali", "kochi", "kolkata", "kurla west"]
            .iter()
            .enumerate()
        {
            t.insert(w, i as u32);
        }
        let hits = t.autocomplete("k", 3);
        assert_eq!(words(&hits), vec!["kandivali", "kochi", "kolkata"]);
        assert!(t.autocomplete("k", 0).is_empty());
    }

    #[test]
    fn test_autocomplete_only_matching_prefix() {
        let mut t = LocationTrie::new();
        t.insert("powai", 1);
        t.insert("pune", 2);
        t.insert("patna", 3);
        for (word, _) in t.autocomplete("pu", 10) {
            assert!(word.starts_with("pu"));
        }
        assert!(t.autocomplete("x", 10).is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let mut t = LocationTrie::new();
        t.insert("Marine Drive", 1);
        assert!(t.search("marine drive"));
        assert!(t.search("MARINE DRIVE"));
        assert!(t.starts_with("MAR"));
        assert_eq!(words(&t.autocomplete("Mar", 5)), vec!["marine drive"]);
    }

    #[test]
    fn test_search_vs_starts_with() {
        let mut t = LocationTrie::new();
        t.insert("thane", 1);
        assert!(t.search("thane"));
        assert!(!t.search("than"));
        assert!(t.starts_with("than"));
        assert!(!t.starts_with("thx"));
    }

    #[test]
    fn test_insert_same_word_replaces_payload() {
        let mut t = LocationTrie::new();
        t.insert("juhu", 1);
        t.insert("juhu", 2);
        assert_eq!(t.size(), 1);
        assert_eq!(*t.autocomplete("juhu", 1)[0].1, 2);
    }

    #[test]
    fn test_delete_prunes_leaf_branch() {
        let mut t = LocationTrie::new();
        t.insert("worli", 1);
        t.insert("worli sea face", 2);
        assert!(t.delete("worli sea face"));
        assert!(!t.search("worli sea face"));
        assert!(!t.starts_with("worli "));
        assert!(t.search("worli"));
        assert_eq!(t.size(), 1);
    }

    #[test]
    fn test_delete_keeps_descendants() {
        let mut t = LocationTrie::new();
        t.insert("dad", 1);
        t.insert("dadar", 2);
        assert!(t.delete("dad"));
        assert!(!t.search("dad"));
        assert!(t.search("dadar"));
        assert!(t.starts_with("dad"));
    }

    #[test]
    fn test_delete_stops_at_branch() {
        let mut t = LocationTrie::new();
        t.insert("goregaon", 1);
        t.insert("ghatkopar", 2);
        assert!(t.delete("goregaon"));
        assert!(t.starts_with("g"));
        assert!(!t.starts_with("go"));
        assert!(t.search("ghatkopar"));
    }

    #[test]
    fn test_delete_last_word_empties_trie() {
        let mut t = LocationTrie::new();
        t.insert("vashi", 1);
        assert!(t.delete("vashi"));
        assert!(!t.starts_with("v"));
        assert!(t.is_empty());
    }

    #[test]
    fn test_delete_missing() {
        let mut t = LocationTrie::new();
        t.insert("colaba", 1);
        assert!(!t.delete("col"));
        assert!(!t.delete("colabaa"));
        assert!(!t.delete("xyz"));
        assert_eq!(t.size(), 1);
        assert!(t.search("colaba"));
    }

    #[test]
    fn test_all_words_and_clear() {
        let mut t = LocationTrie::new();
        t.insert("b", 2);
        t.insert("a", 1);
        t.insert("ab", 3);
        assert_eq!(words(&t.all_words()), vec!["a", "ab", "b"]);
        t.clear();
        assert!(t.all_words().is_empty());
        assert_eq!(t.size(), 0);
    }

    #[test]
    fn test_long_word_is_stack_safe() {
        let mut t = LocationTrie::new();
        let long = "x".repeat(5_000);
        t.insert(&long, 1);
        assert!(t.search(&long));
        assert_eq!(t.autocomplete("xx", 1).len(), 1);
        assert!(t.delete(&long));
        assert!(t.is_empty());
    }
}
