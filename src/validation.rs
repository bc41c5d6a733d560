//! Consistency checks over incident and resource records.
//!
//! Collects every problem instead of stopping at the first. Detects:
//! - Duplicate ids
//! - Out-of-range priorities, blank locations, zero capacities
//! - Deployed status without an assignment (or the reverse)
//! - Assignments to unknown or resolved incidents
//! - One-sided assignment links between a resource and its incident

use std::collections::{HashMap, HashSet};

use crate::dispatching::ResourceManager;
use crate::incidents::IncidentManager;
use crate::models::{Incident, Resource, ResourceStatus, PRIORITY_MAX, PRIORITY_MIN};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two records share the same id.
    DuplicateId,
    /// Incident priority outside 1..=5.
    InvalidPriority,
    /// Blank location.
    EmptyLocation,
    /// Resource capacity of zero.
    InvalidCapacity,
    /// `Deployed` status and assignment link disagree.
    StatusMismatch,
    /// A link names a record that does not exist.
    UnknownReference,
    /// A resource is deployed to an incident that is no longer active.
    InactiveAssignment,
    /// Only one side of a resource–incident link is present.
    AsymmetricAssignment,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates plain record collections, e.g. a decoded snapshot.
pub fn validate_records(incidents: &[Incident], resources: &[Resource]) -> ValidationResult {
    let incidents: Vec<&Incident> = incidents.iter().collect();
    let resources: Vec<&Resource> = resources.iter().collect();
    check(&incidents, &resources)
}

/// Validates the live state of both managers.
pub fn validate_assignments(incidents: &IncidentManager, resources: &ResourceManager) -> ValidationResult {
    check(&incidents.all(), &resources.all())
}

fn check(incidents: &[&Incident], resources: &[&Resource]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut by_id: HashMap<&str, &Incident> = HashMap::new();
    for &incident in incidents {
        if by_id.insert(incident.id.as_str(), incident).is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate incident ID: {}", incident.id),
            ));
        }
        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&incident.priority) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPriority,
                format!("Incident '{}' has priority {}", incident.id, incident.priority),
            ));
        }
        if incident.location.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyLocation,
                format!("Incident '{}' has no location", incident.id),
            ));
        }
    }

    let mut resource_ids = HashSet::new();
    for &r in resources {
        if !resource_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate resource ID: {}", r.id),
            ));
        }
        if r.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCapacity,
                format!("Resource '{}' has zero capacity", r.id),
            ));
        }
        if r.location.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyLocation,
                format!("Resource '{}' has no location", r.id),
            ));
        }

        let deployed = r.status == ResourceStatus::Deployed;
        match (&r.assigned_to, deployed) {
            (Some(_), false) | (None, true) => errors.push(ValidationError::new(
                ValidationErrorKind::StatusMismatch,
                format!(
                    "Resource '{}' is {:?} but assigned_to is {:?}",
                    r.id, r.status, r.assigned_to
                ),
            )),
            _ => {}
        }

        let Some(incident_id) = r.assigned_to.as_deref() else {
            continue;
        };
        match by_id.get(incident_id) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("Resource '{}' is assigned to unknown incident '{incident_id}'", r.id),
            )),
            Some(incident) => {
                if !incident.is_active() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InactiveAssignment,
                        format!("Resource '{}' is assigned to resolved incident '{incident_id}'", r.id),
                    ));
                }
                if !incident.has_resource(&r.id) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::AsymmetricAssignment,
                        format!("Incident '{incident_id}' does not list resource '{}'", r.id),
                    ));
                }
            }
        }
    }

    // Incident side of each link
    let resources_by_id: HashMap<&str, &Resource> =
        resources.iter().map(|&r| (r.id.as_str(), r)).collect();
    for &incident in incidents {
        for rid in &incident.assigned_resources {
            match resources_by_id.get(rid.as_str()) {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Incident '{}' lists unknown resource '{rid}'", incident.id),
                )),
                Some(r) if r.assigned_to.as_deref() != Some(incident.id.as_str()) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::AsymmetricAssignment,
                        format!("Resource '{rid}' is not assigned to incident '{}'", incident.id),
                    ))
                }
                Some(_) => {}
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
