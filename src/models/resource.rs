//! Resource model.
//!
//! Resources are the dispatchable response units: ambulances, fire trucks,
//! police vehicles, rescue and medical teams, helicopters. Each resource has
//! a type, a home location on the route graph, a crew/patient capacity, and
//! a status that changes as it is deployed and released.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// A dispatchable response unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: String,
    /// Unit classification.
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Current location (route graph node key).
    pub location: String,
    /// Crew or patient capacity (always positive).
    pub capacity: u32,
    /// Deployment state.
    pub status: ResourceStatus,
    /// Incident this unit is deployed to. `Some` iff `status == Deployed`.
    pub assigned_to: Option<String>,
}

/// Unit classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    Ambulance,
    #[serde(rename = "Fire Truck")]
    FireTruck,
    #[serde(rename = "Police Vehicle")]
    PoliceVehicle,
    #[serde(rename = "Rescue Team")]
    RescueTeam,
    #[serde(rename = "Medical Team")]
    MedicalTeam,
    Helicopter,
}

/// Deployment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceStatus {
    /// Idle and dispatchable.
    Available,
    /// Assigned to an active incident.
    Deployed,
    /// Out of service.
    Maintenance,
}

impl ResourceType {
    /// Every resource type, in declaration order.
    pub const ALL: [ResourceType; 6] = [
        ResourceType::Ambulance,
        ResourceType::FireTruck,
        ResourceType::PoliceVehicle,
        ResourceType::RescueTeam,
        ResourceType::MedicalTeam,
        ResourceType::Helicopter,
    ];

    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Ambulance => "Ambulance",
            ResourceType::FireTruck => "Fire Truck",
            ResourceType::PoliceVehicle => "Police Vehicle",
            ResourceType::RescueTeam => "Rescue Team",
            ResourceType::MedicalTeam => "Medical Team",
            ResourceType::Helicopter => "Helicopter",
        }
    }

    /// Capacity used when none is given.
    pub fn default_capacity(&self) -> u32 {
        match self {
            ResourceType::Ambulance | ResourceType::PoliceVehicle => 4,
            ResourceType::MedicalTeam => 5,
            ResourceType::FireTruck => 6,
            ResourceType::RescueTeam => 8,
            ResourceType::Helicopter => 10,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Resource {
    /// Creates an available resource with the type's default capacity.
    pub fn new(
        id: impl Into<String>,
        resource_type: ResourceType,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type,
            location: location.into(),
            capacity: resource_type.default_capacity(),
            status: ResourceStatus::Available,
            assigned_to: None,
        }
    }

    /// Creates an ambulance.
    pub fn ambulance(id: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new(id, ResourceType::Ambulance, location)
    }

    /// Creates a fire truck.
    pub fn fire_truck(id: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new(id, ResourceType::FireTruck, location)
    }

    /// Creates a police vehicle.
    pub fn police(id: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new(id, ResourceType::PoliceVehicle, location)
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the initial status.
    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the unit can be dispatched right now.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == ResourceStatus::Available
    }

    /// Checks the record's own invariants.
    ///
    /// # Errors
    /// [`DispatchError::InvalidCapacity`] for zero capacity,
    /// [`DispatchError::EmptyLocation`] for a blank location.
    pub fn check(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(DispatchError::InvalidCapacity(self.capacity));
        }
        if self.location.trim().is_empty() {
            return Err(DispatchError::EmptyLocation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_builder() {
        let r = Resource::fire_truck("RES1", "Mumbai - Dadar").with_capacity(7);

        assert_eq!(r.id, "RES1");
        assert_eq!(r.resource_type, ResourceType::FireTruck);
        assert_eq!(r.location, "Mumbai - Dadar");
        assert_eq!(r.capacity, 7);
        assert!(r.is_available());
        assert!(r.assigned_to.is_none());
        assert!(r.check().is_ok());
    }

    #[test]
    fn test_default_capacities() {
        assert_eq!(Resource::ambulance("A", "X").capacity, 4);
        assert_eq!(Resource::police("P", "X").capacity, 4);
        assert_eq!(Resource::new("H", ResourceType::Helicopter, "X").capacity, 10);
        assert_eq!(Resource::new("R", ResourceType::RescueTeam, "X").capacity, 8);
    }

    #[test]
    fn test_check_rejects_zero_capacity() {
        let r = Resource::ambulance("A", "Pune").with_capacity(0);
        assert!(matches!(r.check(), Err(DispatchError::InvalidCapacity(0))));
    }

    #[test]
    fn test_check_rejects_blank_location() {
        let r = Resource::ambulance("A", "");
        assert!(matches!(r.check(), Err(DispatchError::EmptyLocation)));
    }

    #[test]
    fn test_serde_names() {
        let r = Resource::new("RES9", ResourceType::MedicalTeam, "Kochi")
            .with_status(ResourceStatus::Maintenance);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["type"], "Medical Team");
        assert_eq!(json["status"], "Maintenance");
        assert!(json["assigned_to"].is_null());
    }
}
