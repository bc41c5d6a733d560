//! Engine configuration.
//!
//! Every tunable the managers read lives here: table sizing, autocomplete
//! limits, the ETA factor, id counter starts, the incident → resource
//! requirement table, and analytics scoring parameters. All fields have
//! defaults, so a JSON document only needs the keys it overrides.
//!
//! ```
//! use u_dispatch::DispatchConfig;
//!
//! let config = DispatchConfig::from_json_str(r#"{ "eta_minutes_per_unit": 1.5 }"#).unwrap();
//! assert_eq!(config.eta_minutes_per_unit, 1.5);
//! assert_eq!(config.incident_buckets, 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::collections::DEFAULT_MAX_LOAD_FACTOR;
use crate::dispatching::RequirementTable;
use crate::error::{DispatchError, Result};

/// Longest accepted analytics window, in days.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Initial buckets of the incident id table.
    pub incident_buckets: usize,
    /// Initial buckets of the location index.
    pub location_buckets: usize,
    /// Initial buckets of the resource pool.
    pub resource_buckets: usize,
    /// Load factor above which tables double.
    pub max_load_factor: f64,
    /// Maximum locations returned by location search.
    pub autocomplete_limit: usize,
    /// Shortest prefix location search accepts.
    pub min_prefix_len: usize,
    /// Minutes of travel per unit of route distance.
    pub eta_minutes_per_unit: f64,
    /// Incident counter start; first generated id is `EMG<start + 1>`.
    pub incident_id_start: u64,
    /// Resource counter start; first generated id is `RES<start + 1>`.
    pub resource_id_start: u64,
    /// Required resource types per incident type.
    pub requirements: RequirementTable,
    /// Analytics parameters.
    pub analytics: AnalyticsConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            incident_buckets: 100,
            location_buckets: 100,
            resource_buckets: 50,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            autocomplete_limit: 10,
            min_prefix_len: 2,
            eta_minutes_per_unit: 2.0,
            incident_id_start: 1000,
            resource_id_start: 0,
            requirements: RequirementTable::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl DispatchConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the initial bucket counts of all three tables.
    pub fn with_buckets(mut self, incidents: usize, locations: usize, resources: usize) -> Self {
        self.incident_buckets = incidents;
        self.location_buckets = locations;
        self.resource_buckets = resources;
        self
    }

    /// Sets the ETA factor.
    pub fn with_eta_minutes_per_unit(mut self, minutes: f64) -> Self {
        self.eta_minutes_per_unit = minutes;
        self
    }

    /// Sets both id counter starts.
    pub fn with_id_start(mut self, incident: u64, resource: u64) -> Self {
        self.incident_id_start = incident;
        self.resource_id_start = resource;
        self
    }

    /// Replaces the requirement table.
    pub fn with_requirements(mut self, requirements: RequirementTable) -> Self {
        self.requirements = requirements;
        self
    }

    /// Replaces the analytics parameters.
    pub fn with_analytics(mut self, analytics: AnalyticsConfig) -> Self {
        self.analytics = analytics;
        self
    }

    /// Sets the location search limits.
    pub fn with_autocomplete(mut self, limit: usize, min_prefix_len: usize) -> Self {
        self.autocomplete_limit = limit;
        self.min_prefix_len = min_prefix_len;
        self
    }

    /// Rejects values the managers cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.incident_buckets == 0 || self.location_buckets == 0 || self.resource_buckets == 0 {
            return Err(DispatchError::Config("bucket counts must be positive".into()));
        }
        if !(self.max_load_factor.is_finite() && self.max_load_factor > 0.0) {
            return Err(DispatchError::Config(format!(
                "max_load_factor must be positive, got {}",
                self.max_load_factor
            )));
        }
        if !(self.eta_minutes_per_unit.is_finite() && self.eta_minutes_per_unit >= 0.0) {
            return Err(DispatchError::Config(format!(
                "eta_minutes_per_unit must be non-negative, got {}",
                self.eta_minutes_per_unit
            )));
        }
        self.analytics.validate()
    }
}

/// Analytics and scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Default trend/prediction window.
    pub lookback_days: i64,
    /// How far back resolved incidents count toward hotspots.
    pub hotspot_window_days: i64,
    /// Response time that still scores 100.
    pub target_response_minutes: f64,
    /// Score points lost per active incident.
    pub active_penalty: f64,
    /// Score points lost per minute above target.
    pub response_penalty: f64,
    /// Weight of the active-load sub-score.
    pub active_weight: f64,
    /// Weight of the response-time sub-score.
    pub response_weight: f64,
    /// Sample count at which prediction confidence reaches 1.0.
    pub prediction_saturation: usize,
    /// Heatmap side length.
    pub heatmap_grid: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            hotspot_window_days: 7,
            target_response_minutes: 15.0,
            active_penalty: 2.0,
            response_penalty: 2.0,
            active_weight: 0.4,
            response_weight: 0.6,
            prediction_saturation: 50,
            heatmap_grid: 20,
        }
    }
}

impl AnalyticsConfig {
    /// Sets the sub-score weights.
    pub fn with_weights(mut self, active: f64, response: f64) -> Self {
        self.active_weight = active;
        self.response_weight = response;
        self
    }

    /// Sets the response-time target.
    pub fn with_target_response_minutes(mut self, minutes: f64) -> Self {
        self.target_response_minutes = minutes;
        self
    }

    /// Sets both lookback windows.
    pub fn with_windows(mut self, lookback_days: i64, hotspot_window_days: i64) -> Self {
        self.lookback_days = lookback_days;
        self.hotspot_window_days = hotspot_window_days;
        self
    }

    /// Rejects unusable scoring parameters.
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("active_weight", self.active_weight),
            ("response_weight", self.response_weight),
            ("active_penalty", self.active_penalty),
            ("response_penalty", self.response_penalty),
        ];
        for (name, value) in weights {
            if !(value.is_finite() && value >= 0.0) {
                return Err(DispatchError::Config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        for (name, days) in [
            ("lookback_days", self.lookback_days),
            ("hotspot_window_days", self.hotspot_window_days),
        ] {
            if !(0..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(DispatchError::Config(format!(
                    "{name} must be within 0..={MAX_WINDOW_DAYS}, got {days}"
                )));
            }
        }
        if self.prediction_saturation == 0 {
            return Err(DispatchError::Config("prediction_saturation must be positive".into()));
        }
        if self.heatmap_grid == 0 {
            return Err(DispatchError::Config("heatmap_grid must be positive".into()));
        }
        Ok(())
    }
}
