//! Resource dispatch over the route network.
//!
//! Owns the resource pool and the location graph, and deploys the nearest
//! reachable unit of each type an incident needs.
//!
//! # Usage
//!
//! ```
//! use u_dispatch::dispatching::ResourceManager;
//! use u_dispatch::incidents::IncidentManager;
//! use u_dispatch::models::{IncidentDraft, IncidentType, ResourceType};
//!
//! let mut incidents = IncidentManager::new();
//! let mut resources = ResourceManager::new();
//! resources.add_route("Depot", "Market", 3.0);
//! resources.add_resource(ResourceType::PoliceVehicle, "Depot", None).unwrap();
//!
//! let id = incidents.report(IncidentDraft::new(IncidentType::Crime, "Market")).unwrap();
//! let assigned = resources.auto_assign(&mut incidents, &id);
//! assert_eq!(assigned.len(), 1);
//! assert_eq!(assigned[0].eta_minutes, 6.0);
//! ```
//!
//! # Reference
//! Dijkstra, E. W. (1959). "A note on two problems in connexion with graphs"

mod manager;
mod requirements;

pub use manager::{
    Assignment, NearestResource, ResourceManager, ResourceStats, RouteInfo, TypeCount,
};
pub use requirements::RequirementTable;
