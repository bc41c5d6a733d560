//! Incident model.
//!
//! An incident is a reported emergency moving through a single lifecycle:
//! `Active` on report, `Resolved` exactly once. Records are created from an
//! [`IncidentDraft`], which carries only what the reporter knows; the manager
//! fills the rest (id, timestamp, type-derived priority) when it builds the
//! final [`Incident`].

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// Most urgent priority.
pub const PRIORITY_MIN: u8 = 1;
/// Least urgent priority.
pub const PRIORITY_MAX: u8 = 5;

/// A reported emergency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique incident identifier.
    pub id: String,
    /// Incident classification.
    #[serde(rename = "type")]
    pub kind: IncidentType,
    /// Free-text location; also the routing graph node key.
    pub location: String,
    /// Urgency, 1 (most urgent) to 5.
    pub priority: u8,
    /// Reporter's description.
    pub description: String,
    /// Severity tag.
    pub severity: Severity,
    /// Number of people affected.
    pub affected_people: u32,
    /// When the incident was reported.
    pub reported_at: DateTime<Utc>,
    /// Lifecycle state.
    pub status: IncidentStatus,
    /// When the incident was resolved.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Minutes between report and resolution. Present only once resolved.
    pub resolution_minutes: Option<f64>,
    /// Ids of resources currently deployed to this incident.
    pub assigned_resources: Vec<String>,
}

/// Incident lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentStatus {
    /// Queued for dispatch.
    Active,
    /// Closed and archived.
    Resolved,
}

/// Severity tag attached by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Fixed incident classification.
///
/// Ordering follows the display name, so a tree keyed by type iterates
/// alphabetically ("Accident" < "Building Collapse" < ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentType {
    Earthquake,
    Tsunami,
    #[serde(rename = "Tornado/Cyclone")]
    TornadoCyclone,
    Fire,
    Flood,
    #[serde(rename = "Medical Emergency")]
    MedicalEmergency,
    Accident,
    Crime,
    #[serde(rename = "Power Outage")]
    PowerOutage,
    #[serde(rename = "Gas Leak")]
    GasLeak,
    #[serde(rename = "Building Collapse")]
    BuildingCollapse,
    Other,
}

impl IncidentType {
    /// Every incident type, in declaration order.
    pub const ALL: [IncidentType; 12] = [
        IncidentType::Earthquake,
        IncidentType::Tsunami,
        IncidentType::TornadoCyclone,
        IncidentType::Fire,
        IncidentType::Flood,
        IncidentType::MedicalEmergency,
        IncidentType::Accident,
        IncidentType::Crime,
        IncidentType::PowerOutage,
        IncidentType::GasLeak,
        IncidentType::BuildingCollapse,
        IncidentType::Other,
    ];

    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::Earthquake => "Earthquake",
            IncidentType::Tsunami => "Tsunami",
            IncidentType::TornadoCyclone => "Tornado/Cyclone",
            IncidentType::Fire => "Fire",
            IncidentType::Flood => "Flood",
            IncidentType::MedicalEmergency => "Medical Emergency",
            IncidentType::Accident => "Accident",
            IncidentType::Crime => "Crime",
            IncidentType::PowerOutage => "Power Outage",
            IncidentType::GasLeak => "Gas Leak",
            IncidentType::BuildingCollapse => "Building Collapse",
            IncidentType::Other => "Other",
        }
    }

    /// Looks up a type by display name (exact match).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Priority assigned when the reporter does not give one.
    pub fn default_priority(&self) -> u8 {
        match self {
            IncidentType::Earthquake
            | IncidentType::Tsunami
            | IncidentType::TornadoCyclone
            | IncidentType::BuildingCollapse => 1,
            IncidentType::Fire
            | IncidentType::Flood
            | IncidentType::MedicalEmergency
            | IncidentType::GasLeak => 2,
            IncidentType::Accident | IncidentType::Crime => 3,
            IncidentType::PowerOutage => 4,
            IncidentType::Other => 5,
        }
    }
}

impl PartialOrd for IncidentType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IncidentType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Incident {
    /// Whether the incident is still queued.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == IncidentStatus::Active
    }

    /// Whether `resource_id` is deployed to this incident.
    pub fn has_resource(&self, resource_id: &str) -> bool {
        self.assigned_resources.iter().any(|r| r == resource_id)
    }
}

/// Partial incident input.
///
/// Only type and location are required. Missing fields are filled by
/// [`IncidentDraft::build`]: priority from the type, severity `Medium`,
/// one affected person, empty description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentDraft {
    /// Caller-supplied id. `None` = generate one.
    pub id: Option<String>,
    /// Incident classification.
    pub kind: IncidentType,
    /// Free-text location.
    pub location: String,
    /// Explicit priority. `None` = type default.
    pub priority: Option<u8>,
    /// Reporter's description.
    pub description: String,
    /// Severity tag. `None` = `Medium`.
    pub severity: Option<Severity>,
    /// Number of people affected. `None` = 1.
    pub affected_people: Option<u32>,
    /// Report time. `None` = stamped by the manager's clock.
    pub reported_at: Option<DateTime<Utc>>,
}

impl IncidentDraft {
    /// Creates a draft with the two required fields.
    pub fn new(kind: IncidentType, location: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            location: location.into(),
            priority: None,
            description: String::new(),
            severity: None,
            affected_people: None,
            reported_at: None,
        }
    }

    /// Sets an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Overrides the type-derived priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the severity tag.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Sets the affected-people count.
    pub fn with_affected_people(mut self, count: u32) -> Self {
        self.affected_people = Some(count);
        self
    }

    /// Sets the report time.
    pub fn with_reported_at(mut self, at: DateTime<Utc>) -> Self {
        self.reported_at = Some(at);
        self
    }

    /// Effective priority after applying the type default.
    pub fn effective_priority(&self) -> u8 {
        self.priority.unwrap_or_else(|| self.kind.default_priority())
    }

    /// Builds the final record.
    ///
    /// `id` and `now` are used only when the draft leaves them unset.
    ///
    /// # Errors
    /// [`DispatchError::InvalidPriority`] for a priority outside 1..=5,
    /// [`DispatchError::EmptyLocation`] for a blank location.
    pub fn build(self, id: impl FnOnce() -> String, now: DateTime<Utc>) -> Result<Incident> {
        let priority = self.effective_priority();
        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&priority) {
            return Err(DispatchError::InvalidPriority(priority));
        }
        if self.location.trim().is_empty() {
            return Err(DispatchError::EmptyLocation);
        }

        Ok(Incident {
            id: self.id.unwrap_or_else(id),
            kind: self.kind,
            location: self.location,
            priority,
            description: self.description,
            severity: self.severity.unwrap_or(Severity::Medium),
            affected_people: self.affected_people.unwrap_or(1),
            reported_at: self.reported_at.unwrap_or(now),
            status: IncidentStatus::Active,
            resolved_at: None,
            resolution_minutes: None,
            assigned_resources: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_draft_defaults() {
        let incident = IncidentDraft::new(IncidentType::Fire, "Mumbai - Bandra")
            .build(|| "EMG1".to_string(), t0())
            .unwrap();

        assert_eq!(incident.id, "EMG1");
        assert_eq!(incident.priority, 2);
        assert_eq!(incident.severity, Severity::Medium);
        assert_eq!(incident.affected_people, 1);
        assert_eq!(incident.reported_at, t0());
        assert_eq!(incident.status, IncidentStatus::Active);
        assert!(incident.resolution_minutes.is_none());
        assert!(incident.assigned_resources.is_empty());
    }

    #[test]
    fn test_draft_overrides() {
        let at = t0() - chrono::Duration::hours(1);
        let incident = IncidentDraft::new(IncidentType::Other, "Pune")
            .with_id("custom")
            .with_priority(1)
            .with_description("Stray cattle on highway")
            .with_severity(Severity::High)
            .with_affected_people(12)
            .with_reported_at(at)
            .build(|| unreachable!(), t0())
            .unwrap();

        assert_eq!(incident.id, "custom");
        assert_eq!(incident.priority, 1);
        assert_eq!(incident.severity, Severity::High);
        assert_eq!(incident.affected_people, 12);
        assert_eq!(incident.reported_at, at);
    }

    #[test]
    fn test_draft_rejects_bad_priority() {
        let err = IncidentDraft::new(IncidentType::Crime, "Delhi")
            .with_priority(0)
            .build(|| "x".into(), t0())
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidPriority(0)));

        let err = IncidentDraft::new(IncidentType::Crime, "Delhi")
            .with_priority(6)
            .build(|| "x".into(), t0())
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidPriority(6)));
    }

    #[test]
    fn test_draft_rejects_blank_location() {
        let err = IncidentDraft::new(IncidentType::Flood, "   ")
            .build(|| "x".into(), t0())
            .unwrap_err();
        assert!(matches!(err, DispatchError::EmptyLocation));
    }

    #[test]
    fn test_type_order_is_alphabetical() {
        let mut types = IncidentType::ALL.to_vec();
        types.sort();
        let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(types[0], IncidentType::Accident);
    }

    #[test]
    fn test_type_names_round_trip() {
        for kind in IncidentType::ALL {
            assert_eq!(IncidentType::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(IncidentType::from_name("Volcano"), None);

        let json = serde_json::to_string(&IncidentType::MedicalEmergency).unwrap();
        assert_eq!(json, "\"Medical Emergency\"");
    }
}
