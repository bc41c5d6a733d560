//! Resource pool, route network, and nearest-unit dispatch.
//!
//! # Algorithm
//!
//! For each resource type an incident requires, every available unit of that
//! type is a candidate. Dijkstra runs from each candidate's location to the
//! incident location; the unit with the smallest finite distance wins and is
//! deployed. Unreachable candidates are skipped. Ties keep the unit
//! registered first.
//!
//! ETA is linear in distance: `distance × eta_minutes_per_unit`.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::collections::IndexTable;
use crate::config::DispatchConfig;
use crate::error::{DispatchError, Result};
use crate::ids::IdGenerator;
use crate::incidents::IncidentManager;
use crate::models::{Incident, Resource, ResourceStatus, ResourceType};
use crate::routing::{GraphStats, RouteEdge, RouteGraph, ShortestPath};

use super::RequirementTable;

/// A unit deployed by auto-assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// Deployed resource.
    pub resource_id: String,
    /// Its type.
    pub resource_type: ResourceType,
    /// Route distance to the incident.
    pub distance: f64,
    /// Route from the unit to the incident, inclusive.
    pub path: Vec<String>,
    /// Estimated travel minutes.
    pub eta_minutes: f64,
}

/// Nearest available unit, without deploying it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestResource {
    pub resource_id: String,
    pub route: ShortestPath,
}

/// Traversal views from one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub bfs_order: Vec<String>,
    pub dfs_order: Vec<String>,
    pub neighbors: Vec<String>,
}

/// Per-type pool counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TypeCount {
    pub total: usize,
    pub available: usize,
}

/// Pool counts by status and type.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResourceStats {
    pub total: usize,
    pub available: usize,
    pub deployed: usize,
    pub maintenance: usize,
    pub by_type: BTreeMap<ResourceType, TypeCount>,
}

/// Owns the resource pool and the route network.
#[derive(Debug, Clone)]
pub struct ResourceManager {
    ids: IdGenerator,
    pool: IndexTable<Resource>,
    // registration order; candidate scans and listings follow it
    order: Vec<String>,
    routes: RouteGraph,
    requirements: RequirementTable,
    eta_minutes_per_unit: f64,
}

impl ResourceManager {
    /// Creates an empty manager with default configuration.
    pub fn new() -> Self {
        Self::with_config(&DispatchConfig::default())
    }

    /// Creates an empty manager from `config`.
    pub fn with_config(config: &DispatchConfig) -> Self {
        Self {
            ids: IdGenerator::resources(config.resource_id_start),
            pool: IndexTable::with_load_factor(config.resource_buckets, config.max_load_factor),
            order: Vec::new(),
            routes: RouteGraph::new(),
            requirements: config.requirements.clone(),
            eta_minutes_per_unit: config.eta_minutes_per_unit,
        }
    }

    /// Replaces the route network.
    pub fn with_routes(mut self, routes: RouteGraph) -> Self {
        self.routes = routes;
        self
    }

    /// Resource id generator state.
    pub fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }

    /// Continues id generation after `counter`, if it is ahead.
    pub fn advance_ids_to(&mut self, counter: u64) {
        self.ids.advance_to(counter);
    }

    /// Registers a new available unit and returns its id.
    ///
    /// `capacity` defaults to the type's standard capacity. The location
    /// becomes a route node if it is not one already.
    ///
    /// # Errors
    /// [`DispatchError::InvalidCapacity`] or [`DispatchError::EmptyLocation`].
    pub fn add_resource(
        &mut self,
        resource_type: ResourceType,
        location: &str,
        capacity: Option<u32>,
    ) -> Result<String> {
        let mut resource = Resource::new(String::new(), resource_type, location);
        if let Some(capacity) = capacity {
            resource = resource.with_capacity(capacity);
        }
        resource.check()?;

        resource.id = self.ids.next_id();
        let id = resource.id.clone();
        self.insert(resource)?;
        Ok(id)
    }

    /// Registers a fully-formed record, keeping its id and status.
    ///
    /// # Errors
    /// Record check failures or [`DispatchError::DuplicateResource`].
    pub fn insert(&mut self, resource: Resource) -> Result<()> {
        resource.check()?;
        if self.pool.contains(&resource.id) {
            return Err(DispatchError::DuplicateResource(resource.id));
        }
        self.routes.add_node(&resource.location);
        self.order.push(resource.id.clone());
        self.pool.insert(resource.id.clone(), resource);
        Ok(())
    }

    /// Unit by id.
    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.pool.get(id)
    }

    /// Every unit in registration order.
    pub fn all(&self) -> Vec<&Resource> {
        self.order.iter().filter_map(|id| self.pool.get(id)).collect()
    }

    /// Units of one type.
    pub fn by_type(&self, resource_type: ResourceType) -> Vec<&Resource> {
        self.all()
            .into_iter()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    /// Available units, optionally of one type.
    pub fn available(&self, resource_type: Option<ResourceType>) -> Vec<&Resource> {
        self.all()
            .into_iter()
            .filter(|r| r.is_available())
            .filter(|r| resource_type.map_or(true, |t| r.resource_type == t))
            .collect()
    }

    /// Units deployed to `incident_id`.
    pub fn assignments_for(&self, incident_id: &str) -> Vec<&Resource> {
        self.all()
            .into_iter()
            .filter(|r| r.assigned_to.as_deref() == Some(incident_id))
            .collect()
    }

    /// Deploys `resource_id` to `incident_id`.
    ///
    /// Fails with no state change if the unit is unknown or not available,
    /// or the incident is not active.
    pub fn assign(
        &mut self,
        incidents: &mut IncidentManager,
        resource_id: &str,
        incident_id: &str,
    ) -> bool {
        if !self.pool.get(resource_id).is_some_and(Resource::is_available) {
            return false;
        }
        if !incidents.attach_resource(incident_id, resource_id) {
            return false;
        }
        if let Some(resource) = self.pool.get_mut(resource_id) {
            resource.status = ResourceStatus::Deployed;
            resource.assigned_to = Some(incident_id.to_string());
        }
        info!(resource_id, incident_id, "resource assigned");
        true
    }

    /// Returns a unit to the available pool and unlinks it from its incident.
    ///
    /// `false` only for unknown ids.
    pub fn release(&mut self, incidents: &mut IncidentManager, resource_id: &str) -> bool {
        let Some(resource) = self.pool.get_mut(resource_id) else {
            return false;
        };
        resource.status = ResourceStatus::Available;
        if let Some(incident_id) = resource.assigned_to.take() {
            incidents.detach_resource(&incident_id, resource_id);
            info!(resource_id, incident_id = %incident_id, "resource released");
        }
        true
    }

    /// Releases every unit deployed to `incident_id`. Returns their ids.
    pub fn release_all(&mut self, incidents: &mut IncidentManager, incident_id: &str) -> Vec<String> {
        let ids: Vec<String> = self
            .assignments_for(incident_id)
            .into_iter()
            .map(|r| r.id.clone())
            .collect();
        for id in &ids {
            self.release(incidents, id);
        }
        ids
    }

    /// Releases the incident's units, then resolves it.
    ///
    /// `None` targets the most urgent active incident. Returns `None` when
    /// the target is not active.
    pub fn resolve_incident(
        &mut self,
        incidents: &mut IncidentManager,
        incident_id: Option<&str>,
    ) -> Option<Incident> {
        let target = match incident_id {
            Some(id) => id.to_string(),
            None => incidents.peek()?.id.clone(),
        };
        if !incidents.is_active(&target) {
            return None;
        }

        let released = self.release_all(incidents, &target);
        if !released.is_empty() {
            info!(incident_id = %target, released = released.len(), "units released on resolve");
        }
        incidents.resolve(Some(&target))
    }

    /// Takes an available unit out of service.
    pub fn mark_maintenance(&mut self, resource_id: &str) -> bool {
        match self.pool.get_mut(resource_id) {
            Some(r) if r.is_available() => {
                r.status = ResourceStatus::Maintenance;
                true
            }
            _ => false,
        }
    }

    /// Puts a unit under maintenance back into service.
    pub fn return_to_service(&mut self, resource_id: &str) -> bool {
        match self.pool.get_mut(resource_id) {
            Some(r) if r.status == ResourceStatus::Maintenance => {
                r.status = ResourceStatus::Available;
                true
            }
            _ => false,
        }
    }

    /// Nearest available unit that can reach `location`.
    pub fn find_nearest(
        &self,
        location: &str,
        resource_type: Option<ResourceType>,
    ) -> Option<NearestResource> {
        let mut best: Option<NearestResource> = None;
        for candidate in self.available(resource_type) {
            let Some(route) = self.routes.dijkstra(&candidate.location, location) else {
                continue;
            };
            if best.as_ref().map_or(true, |b| route.distance < b.route.distance) {
                best = Some(NearestResource {
                    resource_id: candidate.id.clone(),
                    route,
                });
            }
        }
        best
    }

    /// Deploys the nearest reachable unit of each type the incident needs.
    ///
    /// Types with no reachable available unit are skipped. Returns nothing
    /// for unknown or resolved incidents.
    pub fn auto_assign(
        &mut self,
        incidents: &mut IncidentManager,
        incident_id: &str,
    ) -> Vec<Assignment> {
        let Some(incident) = incidents.get(incident_id).filter(|i| i.is_active()) else {
            return Vec::new();
        };
        let location = incident.location.clone();
        let required = self.requirements.required(incident.kind).to_vec();

        let mut assignments = Vec::new();
        for resource_type in required {
            let Some(nearest) = self.find_nearest(&location, Some(resource_type)) else {
                warn!(
                    incident_id,
                    resource_type = %resource_type,
                    "no reachable available unit"
                );
                continue;
            };
            if self.assign(incidents, &nearest.resource_id, incident_id) {
                let distance = nearest.route.distance;
                assignments.push(Assignment {
                    resource_id: nearest.resource_id,
                    resource_type,
                    distance,
                    path: nearest.route.path,
                    eta_minutes: distance * self.eta_minutes_per_unit,
                });
            }
        }
        assignments
    }

    /// Route network.
    pub fn routes(&self) -> &RouteGraph {
        &self.routes
    }

    /// Adds or re-weights a route.
    pub fn add_route(&mut self, from: &str, to: &str, distance: f64) {
        self.routes.add_edge(from, to, distance);
    }

    /// Adds a route whose distance arrives as text.
    pub fn add_route_raw(&mut self, from: &str, to: &str, distance: &str) {
        self.routes.add_edge_raw(from, to, distance);
    }

    /// Adds every edge in `edges`.
    pub fn load_routes(&mut self, edges: &[RouteEdge]) {
        for edge in edges {
            self.routes.add_edge(&edge.from, &edge.to, edge.distance);
        }
    }

    /// Shortest route between two locations.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<ShortestPath> {
        self.routes.dijkstra(from, to)
    }

    /// BFS, DFS and neighbour views from `location`.
    pub fn route_info(&self, location: &str) -> RouteInfo {
        RouteInfo {
            bfs_order: owned(self.routes.bfs(location)),
            dfs_order: owned(self.routes.dfs(location)),
            neighbors: owned(self.routes.neighbors(location)),
        }
    }

    /// Route network summary.
    pub fn graph_stats(&self) -> GraphStats {
        self.routes.stats()
    }

    /// Pool counts by status and type.
    pub fn resource_stats(&self) -> ResourceStats {
        let mut stats = ResourceStats::default();
        for r in self.all() {
            stats.total += 1;
            let per_type = stats.by_type.entry(r.resource_type).or_default();
            per_type.total += 1;
            match r.status {
                ResourceStatus::Available => {
                    stats.available += 1;
                    per_type.available += 1;
                }
                ResourceStatus::Deployed => stats.deployed += 1,
                ResourceStatus::Maintenance => stats.maintenance += 1,
            }
        }
        stats
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::{IncidentDraft, IncidentType};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn incidents() -> IncidentManager {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ));
        IncidentManager::with_config(&DispatchConfig::default(), clock)
    }

    // A -4- B -3- C -2- D, plus A -10- C
    fn city() -> ResourceManager {
        let mut rm = ResourceManager::new();
        rm.add_route("A", "B", 4.0);
        rm.add_route("B", "C", 3.0);
        rm.add_route("A", "C", 10.0);
        rm.add_route("C", "D", 2.0);
        rm
    }

    #[test]
    fn test_add_resource_ids_and_defaults() {
        let mut rm = city();
        let a = rm.add_resource(ResourceType::Ambulance, "A", None).unwrap();
        let b = rm.add_resource(ResourceType::FireTruck, "B", Some(9)).unwrap();
        assert_eq!(a, "RES1");
        assert_eq!(b, "RES2");
        assert_eq!(rm.get(&a).unwrap().capacity, 4);
        assert_eq!(rm.get(&b).unwrap().capacity, 9);
        assert!(rm.get(&a).unwrap().is_available());

        let err = rm.add_resource(ResourceType::Ambulance, "A", Some(0));
        assert!(matches!(err, Err(DispatchError::InvalidCapacity(0))));
        assert_eq!(rm.len(), 2);
    }

    #[test]
    fn test_resource_location_becomes_node() {
        let mut rm = ResourceManager::new();
        rm.add_resource(ResourceType::Helicopter, "Helipad", None).unwrap();
        assert!(rm.routes().has_node("Helipad"));
    }

    #[test]
    fn test_find_nearest_picks_shortest_route() {
        let mut rm = city();
        rm.add_resource(ResourceType::Ambulance, "A", None).unwrap();
        let near = rm.add_resource(ResourceType::Ambulance, "C", None).unwrap();
        rm.add_resource(ResourceType::FireTruck, "D", None).unwrap();

        let found = rm.find_nearest("D", Some(ResourceType::Ambulance)).unwrap();
        assert_eq!(found.resource_id, near);
        assert!((found.route.distance - 2.0).abs() < 1e-10);
        assert_eq!(found.route.path, vec!["C", "D"]);

        let any = rm.find_nearest("D", None).unwrap();
        assert_eq!(any.route.distance, 0.0);

        assert!(rm.find_nearest("D", Some(ResourceType::Helicopter)).is_none());
    }

    #[test]
    fn test_find_nearest_skips_unreachable() {
        let mut rm = city();
        rm.add_resource(ResourceType::Ambulance, "Island", None).unwrap();
        assert!(rm.find_nearest("A", Some(ResourceType::Ambulance)).is_none());

        let far = rm.add_resource(ResourceType::Ambulance, "D", None).unwrap();
        assert_eq!(rm.find_nearest("A", None).unwrap().resource_id, far);
    }

    #[test]
    fn test_auto_assign_links_both_sides() {
        let mut im = incidents();
        let mut rm = city();
        let truck = rm.add_resource(ResourceType::FireTruck, "A", None).unwrap();
        let amb = rm.add_resource(ResourceType::Ambulance, "C", None).unwrap();

        let id = im.report(IncidentDraft::new(IncidentType::Fire, "D")).unwrap();
        let assigned = rm.auto_assign(&mut im, &id);

        assert_eq!(assigned.len(), 2);
        assert_eq!(assigned[0].resource_id, truck);
        assert_eq!(assigned[0].resource_type, ResourceType::FireTruck);
        assert!((assigned[0].distance - 9.0).abs() < 1e-10);
        assert!((assigned[0].eta_minutes - 18.0).abs() < 1e-10);
        assert_eq!(assigned[0].path, vec!["A", "B", "C", "D"]);
        assert_eq!(assigned[1].resource_id, amb);

        for a in &assigned {
            let r = rm.get(&a.resource_id).unwrap();
            assert_eq!(r.status, ResourceStatus::Deployed);
            assert_eq!(r.assigned_to.as_deref(), Some(id.as_str()));
            assert!(im.get(&id).unwrap().has_resource(&a.resource_id));
        }
        assert_eq!(rm.assignments_for(&id).len(), 2);
    }

    #[test]
    fn test_auto_assign_partial_when_type_missing() {
        let mut im = incidents();
        let mut rm = city();
        rm.add_resource(ResourceType::Ambulance, "B", None).unwrap();

        let id = im.report(IncidentDraft::new(IncidentType::Accident, "A")).unwrap();
        let assigned = rm.auto_assign(&mut im, &id);
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].resource_type, ResourceType::Ambulance);
    }

    #[test]
    fn test_auto_assign_ignores_inactive_incident() {
        let mut im = incidents();
        let mut rm = city();
        rm.add_resource(ResourceType::PoliceVehicle, "B", None).unwrap();

        let id = im.report(IncidentDraft::new(IncidentType::Crime, "A")).unwrap();
        im.resolve(Some(&id));
        assert!(rm.auto_assign(&mut im, &id).is_empty());
        assert!(rm.auto_assign(&mut im, "EMG0").is_empty());
        assert_eq!(rm.available(None).len(), 1);
    }

    #[test]
    fn test_assign_rejects_unavailable() {
        let mut im = incidents();
        let mut rm = city();
        let r = rm.add_resource(ResourceType::Ambulance, "A", None).unwrap();
        let a = im.report(IncidentDraft::new(IncidentType::Other, "B")).unwrap();
        let b = im.report(IncidentDraft::new(IncidentType::Other, "C")).unwrap();

        assert!(!rm.assign(&mut im, "RES404", &a));
        assert!(!rm.assign(&mut im, &r, "EMG0"));
        assert!(rm.get(&r).unwrap().is_available());

        assert!(rm.assign(&mut im, &r, &a));
        assert!(!rm.assign(&mut im, &r, &b));
        assert!(im.get(&b).unwrap().assigned_resources.is_empty());
    }

    #[test]
    fn test_release_clears_links() {
        let mut im = incidents();
        let mut rm = city();
        let r = rm.add_resource(ResourceType::Ambulance, "A", None).unwrap();
        let id = im.report(IncidentDraft::new(IncidentType::Other, "B")).unwrap();
        assert!(rm.assign(&mut im, &r, &id));

        assert!(rm.release(&mut im, &r));
        let res = rm.get(&r).unwrap();
        assert_eq!(res.status, ResourceStatus::Available);
        assert!(res.assigned_to.is_none());
        assert!(im.get(&id).unwrap().assigned_resources.is_empty());

        assert!(!rm.release(&mut im, "RES404"));
    }

    #[test]
    fn test_release_all() {
        let mut im = incidents();
        let mut rm = city();
        rm.add_resource(ResourceType::RescueTeam, "A", None).unwrap();
        rm.add_resource(ResourceType::Ambulance, "B", None).unwrap();
        let id = im.report(IncidentDraft::new(IncidentType::Flood, "C")).unwrap();
        assert_eq!(rm.auto_assign(&mut im, &id).len(), 2);

        let released = rm.release_all(&mut im, &id);
        assert_eq!(released.len(), 2);
        assert_eq!(rm.available(None).len(), 2);
        assert!(im.get(&id).unwrap().assigned_resources.is_empty());
    }

    #[test]
    fn test_resolve_incident_frees_units() {
        let mut im = incidents();
        let mut rm = city();
        rm.add_resource(ResourceType::FireTruck, "A", None).unwrap();
        rm.add_resource(ResourceType::Ambulance, "D", None).unwrap();
        let minor = im.report(IncidentDraft::new(IncidentType::Other, "B")).unwrap();
        let fire = im.report(IncidentDraft::new(IncidentType::Fire, "C")).unwrap();
        assert_eq!(rm.auto_assign(&mut im, &fire).len(), 2);

        let done = rm.resolve_incident(&mut im, None).unwrap();
        assert_eq!(done.id, fire);
        assert!(done.assigned_resources.is_empty());
        assert_eq!(rm.available(None).len(), 2);
        assert!(rm.assignments_for(&fire).is_empty());
        assert!(crate::validation::validate_assignments(&im, &rm).is_ok());

        assert!(rm.resolve_incident(&mut im, Some(&fire)).is_none());
        assert_eq!(rm.resolve_incident(&mut im, Some(&minor)).unwrap().id, minor);
        assert!(rm.resolve_incident(&mut im, None).is_none());
    }

    #[test]
    fn test_maintenance_cycle() {
        let mut rm = city();
        let r = rm.add_resource(ResourceType::Ambulance, "A", None).unwrap();
        assert!(rm.mark_maintenance(&r));
        assert!(!rm.mark_maintenance(&r));
        assert!(rm.find_nearest("A", None).is_none());

        let stats = rm.resource_stats();
        assert_eq!(stats.maintenance, 1);
        assert_eq!(stats.available, 0);

        assert!(rm.return_to_service(&r));
        assert!(!rm.return_to_service(&r));
        assert_eq!(rm.resource_stats().available, 1);
    }

    #[test]
    fn test_resource_stats_by_type() {
        let mut im = incidents();
        let mut rm = city();
        rm.add_resource(ResourceType::Ambulance, "A", None).unwrap();
        rm.add_resource(ResourceType::Ambulance, "B", None).unwrap();
        rm.add_resource(ResourceType::PoliceVehicle, "C", None).unwrap();
        let id = im.report(IncidentDraft::new(IncidentType::Crime, "D")).unwrap();
        rm.auto_assign(&mut im, &id);

        let stats = rm.resource_stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.deployed, 1);
        assert_eq!(stats.by_type[&ResourceType::Ambulance], TypeCount { total: 2, available: 2 });
        assert_eq!(stats.by_type[&ResourceType::PoliceVehicle], TypeCount { total: 1, available: 0 });
    }

    #[test]
    fn test_route_info_and_stats() {
        let mut rm = city();
        rm.add_route_raw("D", "E", "oops");

        let info = rm.route_info("A");
        assert_eq!(info.bfs_order, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(info.dfs_order, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(info.neighbors, vec!["B", "C"]);

        let stats = rm.graph_stats();
        assert_eq!(stats.nodes, 5);
        assert_eq!(stats.edges, 5);
        assert!(stats.connected);

        assert_eq!(rm.routes().weight("D", "E"), Some(1.0));
        assert!((rm.shortest_path("A", "E").unwrap().distance - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut rm = city();
        rm.insert(Resource::ambulance("U1", "A")).unwrap();
        let err = rm.insert(Resource::ambulance("U1", "B"));
        assert!(matches!(err, Err(DispatchError::DuplicateResource(_))));
    }
}
