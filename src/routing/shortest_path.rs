//! Dijkstra shortest path over [`RouteGraph`].
//!
//! # Reference
//! Dijkstra, E. W. (1959). "A note on two problems in connexion with graphs"

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use super::RouteGraph;

/// A minimum-distance route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortestPath {
    /// Sum of edge distances along `path`.
    pub distance: f64,
    /// Node names from start to end, inclusive.
    pub path: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct State {
    cost: f64,
    node: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; index breaks ties deterministically.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl RouteGraph {
    /// Shortest route from `start` to `end`.
    ///
    /// `None` when either endpoint is unknown or `end` is unreachable.
    /// `start == end` yields distance 0 and a one-node path.
    pub fn dijkstra(&self, start: &str, end: &str) -> Option<ShortestPath> {
        let s = self.node_index(start)?;
        let e = self.node_index(end)?;

        let n = self.node_count();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut heap = BinaryHeap::new();

        dist[s] = 0.0;
        heap.push(State { cost: 0.0, node: s });

        while let Some(State { cost, node }) = heap.pop() {
            if node == e {
                break;
            }
            if cost > dist[node] {
                continue;
            }
            for &(next, w) in &self.adjacency[node] {
                let candidate = cost + w;
                if candidate < dist[next] {
                    dist[next] = candidate;
                    prev[next] = Some(node);
                    heap.push(State {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }

        if !dist[e].is_finite() {
            return None;
        }

        let mut path = vec![self.names[e].clone()];
        let mut cursor = e;
        while let Some(p) = prev[cursor] {
            path.push(self.names[p].clone());
            cursor = p;
        }
        path.reverse();

        Some(ShortestPath {
            distance: dist[e],
            path,
        })
    }

    /// Distance only; see [`RouteGraph::dijkstra`].
    pub fn distance(&self, start: &str, end: &str) -> Option<f64> {
        self.dijkstra(start, end).map(|p| p.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city() -> RouteGraph {
        let mut g = RouteGraph::new();
        g.add_edge("A", "B", 4.0);
        g.add_edge("B", "C", 3.0);
        g.add_edge("A", "C", 10.0);
        g.add_edge("C", "D", 2.0);
        g
    }

    #[test]
    fn test_dijkstra_prefers_cheaper_detour() {
        let route = city().dijkstra("A", "D").expect("reachable");
        assert!((route.distance - 9.0).abs() < 1e-10);
        assert_eq!(route.path, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_dijkstra_same_node() {
        let route = city().dijkstra("C", "C").expect("known node");
        assert_eq!(route.distance, 0.0);
        assert_eq!(route.path, vec!["C"]);
    }

    #[test]
    fn test_dijkstra_unreachable() {
        let mut g = city();
        g.add_edge("X", "Y", 1.0);
        assert!(g.dijkstra("A", "X").is_none());
        assert!(g.dijkstra("A", "Nowhere").is_none());
        assert!(g.dijkstra("Nowhere", "A").is_none());
    }

    #[test]
    fn test_dijkstra_path_consistent_with_weights() {
        let mut g = city();
        g.add_edge("B", "D", 7.5);
        g.add_edge("A", "E", 1.0);
        g.add_edge("E", "D", 20.0);

        let route = g.dijkstra("A", "D").expect("reachable");
        let summed: f64 = route
            .path
            .windows(2)
            .map(|w| g.weight(&w[0], &w[1]).expect("edge on path"))
            .sum();
        assert!((summed - route.distance).abs() < 1e-10);
        assert!((route.distance - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_weight_edges() {
        let mut g = RouteGraph::new();
        g.add_edge("P", "Q", 0.0);
        g.add_edge("Q", "R", 0.0);
        assert_eq!(g.distance("P", "R"), Some(0.0));
    }
}
