//! Top-level facade wiring the incident and resource managers together.
//!
//! Callers that only need the end-to-end flow (report, dispatch, resolve)
//! use [`DispatchCenter`]; the managers stay reachable for read access.

use std::collections::HashMap;
use std::sync::Arc;

use crate::analytics::AnalyticsEngine;
use crate::clock::{Clock, SystemClock};
use crate::config::DispatchConfig;
use crate::dispatching::{Assignment, ResourceManager};
use crate::error::{DispatchError, Result};
use crate::incidents::IncidentManager;
use crate::models::{Incident, IncidentDraft, IncidentStatus, ResourceType};
use crate::routing::RouteEdge;
use crate::snapshot::DispatchSnapshot;
use crate::validation::{validate_assignments, ValidationResult};

/// Owns both managers and keeps their links consistent.
#[derive(Debug)]
pub struct DispatchCenter {
    config: DispatchConfig,
    incidents: IncidentManager,
    resources: ResourceManager,
}

impl DispatchCenter {
    /// Creates an empty center.
    ///
    /// # Errors
    /// [`crate::DispatchError::Config`] if `config` fails validation.
    pub fn new(config: DispatchConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            incidents: IncidentManager::with_config(&config, clock),
            resources: ResourceManager::with_config(&config),
            config,
        })
    }

    /// Default configuration on the system clock.
    pub fn with_defaults() -> Self {
        let config = DispatchConfig::default();
        Self {
            incidents: IncidentManager::with_config(&config, Arc::new(SystemClock)),
            resources: ResourceManager::with_config(&config),
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Incident records and queries.
    pub fn incidents(&self) -> &IncidentManager {
        &self.incidents
    }

    /// Resource pool and routes.
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Reports an incident without dispatching.
    pub fn report(&mut self, draft: IncidentDraft) -> Result<String> {
        self.incidents.report(draft)
    }

    /// Reports an incident and immediately auto-assigns units to it.
    pub fn report_and_dispatch(&mut self, draft: IncidentDraft) -> Result<(String, Vec<Assignment>)> {
        let id = self.incidents.report(draft)?;
        let assignments = self.auto_assign(&id);
        Ok((id, assignments))
    }

    /// Deploys the nearest reachable unit of each required type.
    pub fn auto_assign(&mut self, incident_id: &str) -> Vec<Assignment> {
        self.resources.auto_assign(&mut self.incidents, incident_id)
    }

    /// Deploys a specific unit.
    pub fn assign(&mut self, resource_id: &str, incident_id: &str) -> bool {
        self.resources
            .assign(&mut self.incidents, resource_id, incident_id)
    }

    /// Returns a unit to the pool.
    pub fn release(&mut self, resource_id: &str) -> bool {
        self.resources.release(&mut self.incidents, resource_id)
    }

    /// Releases the incident's units, then resolves it.
    ///
    /// `None` resolves the most urgent active incident.
    pub fn resolve(&mut self, incident_id: Option<&str>) -> Option<Incident> {
        self.resources
            .resolve_incident(&mut self.incidents, incident_id)
    }

    /// Registers a unit.
    pub fn add_resource(
        &mut self,
        resource_type: ResourceType,
        location: &str,
        capacity: Option<u32>,
    ) -> Result<String> {
        self.resources.add_resource(resource_type, location, capacity)
    }

    /// Takes an available unit out of service.
    pub fn mark_maintenance(&mut self, resource_id: &str) -> bool {
        self.resources.mark_maintenance(resource_id)
    }

    /// Puts a unit back into service.
    pub fn return_to_service(&mut self, resource_id: &str) -> bool {
        self.resources.return_to_service(resource_id)
    }

    /// Adds or re-weights a route.
    pub fn add_route(&mut self, from: &str, to: &str, distance: f64) {
        self.resources.add_route(from, to, distance);
    }

    /// Adds every edge in `edges`.
    pub fn load_routes(&mut self, edges: &[RouteEdge]) {
        self.resources.load_routes(edges);
    }

    /// Analytics over the current incident state.
    pub fn analytics(&self) -> AnalyticsEngine<'_> {
        AnalyticsEngine::new(&self.incidents, &self.config.analytics)
    }

    /// Audits resource–incident links.
    pub fn validate(&self) -> ValidationResult {
        validate_assignments(&self.incidents, &self.resources)
    }

    /// Exports every record.
    pub fn snapshot(&self) -> DispatchSnapshot {
        let mut incidents: Vec<Incident> = self.incidents.history().into_iter().cloned().collect();
        incidents.extend(self.incidents.active(None).into_iter().cloned());

        DispatchSnapshot {
            taken_at: self.incidents.now(),
            incident_counter: self.incidents.id_generator().counter(),
            resource_counter: self.resources.id_generator().counter(),
            incidents,
            resources: self.resources.all().into_iter().cloned().collect(),
            history: self
                .incidents
                .history_ids()
                .into_iter()
                .map(str::to_string)
                .collect(),
            routes: self.resources.routes().edges(),
        }
    }

    /// Rebuilds a center from a snapshot.
    ///
    /// Resolved incidents are replayed in history order, then the rest in
    /// snapshot order, so dispatch order among equal priorities survives.
    ///
    /// # Errors
    /// Invalid configuration, records rejected on re-insertion, or
    /// [`DispatchError::UnknownIncident`] when the history names an id that
    /// is not a resolved incident of the snapshot.
    pub fn from_snapshot(
        snapshot: DispatchSnapshot,
        config: DispatchConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let mut center = Self::new(config, clock)?;
        center.resources.load_routes(&snapshot.routes);
        for resource in snapshot.resources {
            center.resources.insert(resource)?;
        }

        let mut pending: HashMap<String, Incident> = HashMap::new();
        let mut rest = Vec::new();
        for incident in snapshot.incidents {
            if incident.status == IncidentStatus::Resolved {
                pending.insert(incident.id.clone(), incident);
            } else {
                rest.push(incident);
            }
        }
        for id in snapshot.history {
            let Some(incident) = pending.remove(&id) else {
                return Err(DispatchError::UnknownIncident(id));
            };
            center.incidents.restore(incident)?;
        }
        let mut leftovers: Vec<Incident> = pending.into_values().collect();
        leftovers.sort_by(|a, b| a.id.cmp(&b.id));
        for incident in leftovers.into_iter().chain(rest) {
            center.incidents.restore(incident)?;
        }

        center.incidents.advance_ids_to(snapshot.incident_counter);
        center.resources.advance_ids_to(snapshot.resource_counter);
        Ok(center)
    }
}

impl Default for DispatchCenter {
    fn default() -> Self {
        Self::with_defaults()
    }
}
