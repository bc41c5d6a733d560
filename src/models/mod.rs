//! Dispatch domain records.
//!
//! Plain, serde-friendly records exchanged with display, generator, and
//! persistence collaborators. Field names are part of the external contract.
//!
//! # Domain Mappings
//!
//! | u-dispatch | Emergency services | Field service | Logistics |
//! |------------|--------------------|---------------|-----------|
//! | Incident | Emergency call | Work order | Delivery request |
//! | Resource | Ambulance/Truck | Technician | Vehicle |
//! | Location | Locality | Site | Depot/Stop |

mod incident;
mod resource;

pub use incident::{
    Incident, IncidentDraft, IncidentStatus, IncidentType, Severity, PRIORITY_MAX, PRIORITY_MIN,
};
pub use resource::{Resource, ResourceStatus, ResourceType};
