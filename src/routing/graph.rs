//! Weighted undirected location graph.
//!
//! Nodes are opaque, case-sensitive location strings. Each node gets a dense
//! index on first sight; adjacency lists hold `(neighbour index, distance)`
//! in insertion order, which fixes the visiting order of BFS and DFS.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Weight substituted for unusable edge weights.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// An undirected route between two locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEdge {
    /// One endpoint.
    pub from: String,
    /// Other endpoint.
    pub to: String,
    /// Non-negative distance.
    pub distance: f64,
}

impl RouteEdge {
    /// Creates an edge.
    pub fn new(from: impl Into<String>, to: impl Into<String>, distance: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            distance,
        }
    }
}

/// Structural summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub connected: bool,
    pub components: usize,
}

/// Weighted undirected graph over location names.
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    pub(super) names: Vec<String>,
    pub(super) index: HashMap<String, usize>,
    pub(super) adjacency: Vec<Vec<(usize, f64)>>,
}

impl RouteGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from an edge list.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a RouteEdge>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(&edge.from, &edge.to, edge.distance);
        }
        graph
    }

    /// Adds a node if absent. Returns its dense index.
    pub fn add_node(&mut self, node: &str) -> usize {
        if let Some(&i) = self.index.get(node) {
            return i;
        }
        let i = self.names.len();
        self.names.push(node.to_string());
        self.index.insert(node.to_string(), i);
        self.adjacency.push(Vec::new());
        i
    }

    /// Adds or re-weights the undirected edge `u`–`v`.
    ///
    /// Negative or non-finite weights fall back to [`DEFAULT_EDGE_WEIGHT`].
    pub fn add_edge(&mut self, u: &str, v: &str, weight: f64) {
        let weight = if weight.is_finite() && weight >= 0.0 {
            weight
        } else {
            warn!(from = u, to = v, weight, "unusable edge weight, using default");
            DEFAULT_EDGE_WEIGHT
        };

        let a = self.add_node(u);
        let b = self.add_node(v);
        upsert(&mut self.adjacency[a], b, weight);
        if a != b {
            upsert(&mut self.adjacency[b], a, weight);
        }
    }

    /// Adds an edge whose weight arrives as text.
    ///
    /// Text that does not parse as a number falls back to
    /// [`DEFAULT_EDGE_WEIGHT`].
    pub fn add_edge_raw(&mut self, u: &str, v: &str, raw_weight: &str) {
        let weight = match raw_weight.trim().parse::<f64>() {
            Ok(w) => w,
            Err(_) => {
                warn!(from = u, to = v, raw_weight, "non-numeric edge weight, using default");
                DEFAULT_EDGE_WEIGHT
            }
        };
        self.add_edge(u, v, weight);
    }

    /// Removes the edge `u`–`v`. Returns whether it existed.
    pub fn remove_edge(&mut self, u: &str, v: &str) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(u), self.index.get(v)) else {
            return false;
        };
        let before = self.adjacency[a].len();
        self.adjacency[a].retain(|&(n, _)| n != b);
        if self.adjacency[a].len() == before {
            return false;
        }
        self.adjacency[b].retain(|&(n, _)| n != a);
        true
    }

    /// Neighbours of `node` in edge-insertion order.
    pub fn neighbors(&self, node: &str) -> Vec<&str> {
        self.index
            .get(node)
            .map(|&i| {
                self.adjacency[i]
                    .iter()
                    .map(|&(n, _)| self.names[n].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Weight of edge `u`–`v`.
    pub fn weight(&self, u: &str, v: &str) -> Option<f64> {
        let a = *self.index.get(u)?;
        let b = *self.index.get(v)?;
        self.adjacency[a]
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, w)| w)
    }

    /// Whether `node` is known.
    #[inline]
    pub fn has_node(&self, node: &str) -> bool {
        self.index.contains_key(node)
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges().len()
    }

    /// Node names in insertion order.
    pub fn nodes(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    /// Every undirected edge once, ordered by first endpoint.
    pub fn edges(&self) -> Vec<RouteEdge> {
        let mut out = Vec::new();
        for (a, list) in self.adjacency.iter().enumerate() {
            for &(b, w) in list {
                if a <= b {
                    out.push(RouteEdge::new(&self.names[a], &self.names[b], w));
                }
            }
        }
        out
    }

    pub(super) fn node_index(&self, node: &str) -> Option<usize> {
        self.index.get(node).copied()
    }

    /// Breadth-first visiting order from `start` (empty if unknown).
    pub fn bfs(&self, start: &str) -> Vec<&str> {
        match self.node_index(start) {
            Some(s) => self.bfs_indices(s).into_iter().map(|i| self.names[i].as_str()).collect(),
            None => Vec::new(),
        }
    }

    fn bfs_indices(&self, start: usize) -> Vec<usize> {
        let mut visited = vec![false; self.names.len()];
        let mut queue = VecDeque::from([start]);
        let mut order = Vec::new();
        visited[start] = true;

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &(next, _) in &self.adjacency[node] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        order
    }

    /// Depth-first visiting order from `start` (empty if unknown).
    ///
    /// Same order as the recursive formulation: neighbours are explored in
    /// insertion order, each fully before the next.
    pub fn dfs(&self, start: &str) -> Vec<&str> {
        let Some(s) = self.node_index(start) else {
            return Vec::new();
        };
        let mut visited = vec![false; self.names.len()];
        let mut stack = vec![s];
        let mut order = Vec::new();

        while let Some(node) = stack.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            order.push(self.names[node].as_str());
            for &(next, _) in self.adjacency[node].iter().rev() {
                if !visited[next] {
                    stack.push(next);
                }
            }
        }
        order
    }

    /// Simple paths from `start` to `end` with at most `max_length` nodes.
    ///
    /// Backtracking enumeration: exponential in the worst case, meant for
    /// small diagnostic graphs.
    pub fn find_all_paths(&self, start: &str, end: &str, max_length: usize) -> Vec<Vec<&str>> {
        let (Some(s), Some(e)) = (self.node_index(start), self.node_index(end)) else {
            return Vec::new();
        };

        let mut paths = Vec::new();
        let mut path = vec![s];
        let mut on_path = HashSet::from([s]);
        self.extend_paths(e, max_length, &mut path, &mut on_path, &mut paths);

        paths
            .into_iter()
            .map(|p| p.into_iter().map(|i| self.names[i].as_str()).collect())
            .collect()
    }

    fn extend_paths(
        &self,
        target: usize,
        max_length: usize,
        path: &mut Vec<usize>,
        on_path: &mut HashSet<usize>,
        paths: &mut Vec<Vec<usize>>,
    ) {
        if path.len() > max_length {
            return;
        }
        let Some(&current) = path.last() else {
            return;
        };
        if current == target {
            paths.push(path.clone());
            return;
        }
        for &(next, _) in &self.adjacency[current] {
            if on_path.insert(next) {
                path.push(next);
                self.extend_paths(target, max_length, path, on_path, paths);
                path.pop();
                on_path.remove(&next);
            }
        }
    }

    /// Connected components, each in BFS order, seeded in node insertion order.
    pub fn connected_components(&self) -> Vec<Vec<&str>> {
        let mut seen = vec![false; self.names.len()];
        let mut components = Vec::new();

        for start in 0..self.names.len() {
            if seen[start] {
                continue;
            }
            let component = self.bfs_indices(start);
            for &i in &component {
                seen[i] = true;
            }
            components.push(component.into_iter().map(|i| self.names[i].as_str()).collect());
        }
        components
    }

    /// Whether every node is reachable from every other. True when empty.
    pub fn is_connected(&self) -> bool {
        if self.names.is_empty() {
            return true;
        }
        self.bfs_indices(0).len() == self.names.len()
    }

    /// Structural summary.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            connected: self.is_connected(),
            components: self.connected_components().len(),
        }
    }
}

fn upsert(list: &mut Vec<(usize, f64)>, neighbour: usize, weight: f64) {
    match list.iter_mut().find(|(n, _)| *n == neighbour) {
        Some(slot) => slot.1 = weight,
        None => list.push((neighbour, weight)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> RouteGraph {
        let mut g = RouteGraph::new();
        g.add_edge("A", "B", 4.0);
        g.add_edge("B", "C", 3.0);
        g.add_edge("A", "C", 10.0);
        g.add_edge("C", "D", 2.0);
        g
    }

    #[test]
    fn test_add_edge_undirected() {
        let g = diamond();
        assert_eq!(g.weight("A", "B"), Some(4.0));
        assert_eq!(g.weight("B", "A"), Some(4.0));
        assert_eq!(g.weight("A", "D"), None);
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn test_add_edge_overwrites_weight() {
        let mut g = diamond();
        g.add_edge("B", "A", 1.5);
        assert_eq!(g.weight("A", "B"), Some(1.5));
        assert_eq!(g.edge_count(), 4);
        // position in adjacency is kept
        assert_eq!(g.neighbors("A"), vec!["B", "C"]);
    }

    #[test]
    fn test_bad_weights_fall_back() {
        let mut g = RouteGraph::new();
        g.add_edge("X", "Y", f64::NAN);
        g.add_edge("Y", "Z", -3.0);
        g.add_edge_raw("Z", "W", "far");
        g.add_edge_raw("W", "V", " 7.5 ");
        assert_eq!(g.weight("X", "Y"), Some(DEFAULT_EDGE_WEIGHT));
        assert_eq!(g.weight("Y", "Z"), Some(DEFAULT_EDGE_WEIGHT));
        assert_eq!(g.weight("Z", "W"), Some(DEFAULT_EDGE_WEIGHT));
        assert_eq!(g.weight("W", "V"), Some(7.5));
    }

    #[test]
    fn test_remove_edge() {
        let mut g = diamond();
        assert!(g.remove_edge("C", "A"));
        assert_eq!(g.weight("A", "C"), None);
        assert!(!g.remove_edge("A", "C"));
        assert!(!g.remove_edge("A", "Nowhere"));
        assert!(g.has_node("A"));
        assert_eq!(g.neighbors("C"), vec!["B", "D"]);
    }

    #[test]
    fn test_neighbors_unknown() {
        let g = diamond();
        assert!(g.neighbors("Z").is_empty());
    }

    #[test]
    fn test_bfs_order() {
        let g = diamond();
        assert_eq!(g.bfs("A"), vec!["A", "B", "C", "D"]);
        assert_eq!(g.bfs("D"), vec!["D", "C", "B", "A"]);
        assert!(g.bfs("Q").is_empty());
    }

    #[test]
    fn test_dfs_matches_recursive_order() {
        // A: [B, E], B: [A, C, D], C: [B], D: [B, E], E: [A, D]
        let mut g = RouteGraph::new();
        g.add_edge("A", "B", 1.0);
        g.add_edge("B", "C", 1.0);
        g.add_edge("B", "D", 1.0);
        g.add_edge("A", "E", 1.0);
        g.add_edge("D", "E", 1.0);

        // recursive: A → B → C, back to B → D → E
        assert_eq!(g.dfs("A"), vec!["A", "B", "C", "D", "E"]);
        assert!(g.dfs("Q").is_empty());
    }

    #[test]
    fn test_find_all_paths() {
        let g = diamond();
        let mut paths = g.find_all_paths("A", "D", 10);
        paths.sort();
        assert_eq!(
            paths,
            vec![vec!["A", "B", "C", "D"], vec!["A", "C", "D"]]
        );

        let short = g.find_all_paths("A", "D", 3);
        assert_eq!(short, vec![vec!["A", "C", "D"]]);

        assert!(g.find_all_paths("A", "Q", 10).is_empty());
        assert_eq!(g.find_all_paths("A", "A", 1), vec![vec!["A"]]);
    }

    #[test]
    fn test_components() {
        let mut g = diamond();
        g.add_edge("X", "Y", 2.0);
        g.add_node("Lonely");

        let components = g.connected_components();
        assert_eq!(components.len(), 3);
        assert_eq!(components[0], vec!["A", "B", "C", "D"]);
        assert_eq!(components[1], vec!["X", "Y"]);
        assert_eq!(components[2], vec!["Lonely"]);
        assert!(!g.is_connected());

        let stats = g.stats();
        assert_eq!(stats.nodes, 7);
        assert_eq!(stats.edges, 5);
        assert_eq!(stats.components, 3);
        assert!(!stats.connected);
    }

    #[test]
    fn test_empty_graph_is_connected() {
        assert!(RouteGraph::new().is_connected());
        assert!(diamond().is_connected());
    }

    #[test]
    fn test_case_sensitive_nodes() {
        let mut g = RouteGraph::new();
        g.add_edge("Pune", "pune", 1.0);
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn test_from_edges_round_trip() {
        let g = diamond();
        let rebuilt = RouteGraph::from_edges(&g.edges());
        assert_eq!(rebuilt.edges(), g.edges());
        assert_eq!(rebuilt.nodes(), g.nodes());
    }
}
