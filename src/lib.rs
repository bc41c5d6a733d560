//! In-memory incident dispatch engine.
//!
//! Tracks reported incidents by urgency, keeps a pool of response units on a
//! weighted route network, assigns the nearest suitable units, and derives
//! response analytics from the incident history.
//!
//! # Modules
//!
//! - **`collections`**: Leaf containers: `PriorityQueue`, `IndexTable`,
//!   `ResolvedStore`, `LocationTrie`, `HistoryLog`
//! - **`routing`**: `RouteGraph` with Dijkstra, BFS/DFS, path enumeration,
//!   connected components, and random network generation
//! - **`models`**: Domain records: `Incident`, `Resource` and their enums
//! - **`incidents`**: `IncidentManager` (report, resolve, query, history)
//! - **`dispatching`**: `ResourceManager` (pool, nearest unit, auto-assign)
//! - **`analytics`**: Trends, hotspots, predictions, performance scores
//! - **`validation`**: Record and link integrity checks
//! - **`snapshot`**: JSON export/import of the whole state
//!
//! # Example
//!
//! ```
//! use u_dispatch::models::{IncidentDraft, IncidentType, ResourceType};
//! use u_dispatch::DispatchCenter;
//!
//! let mut center = DispatchCenter::default();
//! center.add_route("Bandra", "Kurla", 6.0);
//! center.add_resource(ResourceType::Ambulance, "Kurla", None).unwrap();
//!
//! let (id, assigned) = center
//!     .report_and_dispatch(IncidentDraft::new(IncidentType::MedicalEmergency, "Bandra"))
//!     .unwrap();
//! assert_eq!(assigned.len(), 1);
//! assert_eq!(assigned[0].path, vec!["Kurla", "Bandra"]);
//!
//! center.resolve(Some(&id));
//! assert_eq!(center.incidents().resolved_count(), 1);
//! ```
//!
//! # References
//!
//! - Cormen et al. (2009), "Introduction to Algorithms", Ch. 6, 11, 12, 22, 24
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod analytics;
pub mod clock;
pub mod collections;
pub mod config;
pub mod dispatching;
pub mod error;
pub mod ids;
pub mod incidents;
pub mod models;
pub mod routing;
pub mod snapshot;
pub mod validation;

mod center;

pub use center::DispatchCenter;
pub use config::{AnalyticsConfig, DispatchConfig};
pub use error::{DispatchError, Result};
pub use models::{Incident, IncidentDraft, IncidentStatus, IncidentType, Resource, ResourceStatus, ResourceType};
pub use snapshot::DispatchSnapshot;
