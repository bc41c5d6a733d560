//! Plain-record export of the whole engine state.
//!
//! A snapshot is what an external persistence layer stores: incident and
//! resource records, the resolution order, the route edges, and the id
//! counters. Encoding is JSON through `serde_json`; where the bytes go is the
//! caller's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Incident, Resource};
use crate::routing::RouteEdge;
use crate::validation::{validate_records, ValidationResult};

/// Serializable engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSnapshot {
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// Last issued incident counter.
    pub incident_counter: u64,
    /// Last issued resource counter.
    pub resource_counter: u64,
    /// Resolved incidents in history order, then active ones in dispatch order.
    pub incidents: Vec<Incident>,
    /// Resources in registration order.
    pub resources: Vec<Resource>,
    /// Resolved incident ids, oldest first.
    pub history: Vec<String>,
    /// Route network edges.
    #[serde(default)]
    pub routes: Vec<RouteEdge>,
}

impl DispatchSnapshot {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes JSON produced by [`DispatchSnapshot::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Record-level consistency checks.
    pub fn validate(&self) -> ValidationResult {
        validate_records(&self.incidents, &self.resources)
    }
}
