//! Incident type → required resource types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{IncidentType, ResourceType};

/// Which resource types an incident type needs, one unit each.
///
/// Types with no entry fall back to `fallback` (a single ambulance by default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementTable {
    /// Explicit requirements per incident type, in dispatch order.
    pub by_type: BTreeMap<IncidentType, Vec<ResourceType>>,
    /// Requirement for incident types without an entry.
    pub fallback: Vec<ResourceType>,
}

impl RequirementTable {
    /// A table with no entries; every type gets `fallback`.
    pub fn empty(fallback: Vec<ResourceType>) -> Self {
        Self {
            by_type: BTreeMap::new(),
            fallback,
        }
    }

    /// Sets the requirement for `kind`.
    pub fn with_requirement(mut self, kind: IncidentType, types: Vec<ResourceType>) -> Self {
        self.by_type.insert(kind, types);
        self
    }

    /// Resource types required by `kind`, in dispatch order.
    pub fn required(&self, kind: IncidentType) -> &[ResourceType] {
        self.by_type
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&self.fallback)
    }
}

impl Default for RequirementTable {
    fn default() -> Self {
        use IncidentType as I;
        use ResourceType as R;

        Self::empty(vec![R::Ambulance])
            .with_requirement(I::Fire, vec![R::FireTruck, R::Ambulance])
            .with_requirement(I::MedicalEmergency, vec![R::Ambulance, R::MedicalTeam])
            .with_requirement(I::Accident, vec![R::Ambulance, R::PoliceVehicle])
            .with_requirement(I::Crime, vec![R::PoliceVehicle])
            .with_requirement(I::Flood, vec![R::RescueTeam, R::Ambulance])
            .with_requirement(
                I::Earthquake,
                vec![R::RescueTeam, R::Ambulance, R::FireTruck],
            )
            .with_requirement(
                I::BuildingCollapse,
                vec![R::RescueTeam, R::FireTruck, R::Ambulance],
            )
            .with_requirement(I::GasLeak, vec![R::FireTruck])
    }
}
