//! Synthetic road networks for demos and load tests.

use rand::prelude::IndexedRandom;
use rand::Rng;

use super::RouteEdge;

/// Backbone edge distance range (inclusive).
pub const BACKBONE_DISTANCE: (u32, u32) = (5, 30);

/// Extra edge distance range (inclusive).
pub const EXTRA_DISTANCE: (u32, u32) = (10, 50);

/// Generates a connected network over `locations`.
///
/// Consecutive locations are chained into a backbone, so every location is
/// reachable. Then `extra_edges` random shortcuts are drawn between
/// distinct locations; a pair drawn twice keeps the later distance once
/// loaded into a graph.
pub fn generate_network<R: Rng + ?Sized>(
    locations: &[&str],
    extra_edges: usize,
    rng: &mut R,
) -> Vec<RouteEdge> {
    let mut edges = Vec::with_capacity(locations.len().saturating_sub(1) + extra_edges);

    for pair in locations.windows(2) {
        let d = rng.random_range(BACKBONE_DISTANCE.0..=BACKBONE_DISTANCE.1);
        edges.push(RouteEdge::new(pair[0], pair[1], f64::from(d)));
    }

    if locations.len() < 2 {
        return edges;
    }
    for _ in 0..extra_edges {
        let (Some(&a), Some(&b)) = (locations.choose(rng), locations.choose(rng)) else {
            break;
        };
        if a == b {
            continue;
        }
        let d = rng.random_range(EXTRA_DISTANCE.0..=EXTRA_DISTANCE.1);
        edges.push(RouteEdge::new(a, b, f64::from(d)));
    }
    edges
}
