//! Route network between locations.
//!
//! Weighted undirected graph with Dijkstra shortest paths, BFS/DFS
//! traversal, bounded path enumeration, and connectivity analysis.
//!
//! # Algorithms
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | [`RouteGraph::dijkstra`] | O((V + E) log V) |
//! | [`RouteGraph::bfs`] / [`RouteGraph::dfs`] | O(V + E) |
//! | [`RouteGraph::connected_components`] | O(V + E) |
//! | [`RouteGraph::find_all_paths`] | exponential |
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22 (Elementary
//! Graph Algorithms), Ch. 24.3 (Dijkstra's algorithm)

mod graph;
mod network;
mod shortest_path;

pub use graph::{GraphStats, RouteEdge, RouteGraph, DEFAULT_EDGE_WEIGHT};
pub use network::{generate_network, BACKBONE_DISTANCE, EXTRA_DISTANCE};
pub use shortest_path::ShortestPath;
