//! Read-only analytics over an [`IncidentManager`].
//!
//! Every view is recomputed on demand from the manager's records; the engine
//! holds no state besides its borrow, its parameters, and the reference
//! instant windows are measured from.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::config::AnalyticsConfig;
use crate::incidents::IncidentManager;
use crate::models::{Incident, IncidentType};

use super::metrics::{PerformanceScore, ResponseMetrics};

/// Counts of resolved incidents reported inside a window.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TrendReport {
    /// Window length in days.
    pub days: i64,
    /// Incidents in the window.
    pub total: usize,
    pub daily: BTreeMap<NaiveDate, usize>,
    /// Keyed by UTC hour of report, 0..=23.
    pub hourly: BTreeMap<u32, usize>,
    pub by_type: BTreeMap<IncidentType, usize>,
    pub by_location: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<u8, usize>,
}

/// A location and its recent incident count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hotspot {
    pub location: String,
    pub count: usize,
}

/// Most frequent type, location and hour in the lookback window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// `None` with no samples.
    pub predicted_type: Option<IncidentType>,
    /// `None` with no samples.
    pub predicted_location: Option<String>,
    /// Peak hour; the current hour with no samples.
    pub predicted_hour: u32,
    /// `HH:00`.
    pub predicted_time: String,
    /// `min(samples / saturation, 1)`.
    pub confidence: f64,
    pub samples: usize,
}

/// Reported and lifecycle counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub by_type: BTreeMap<IncidentType, usize>,
    pub by_priority: BTreeMap<u8, usize>,
    pub active: usize,
    pub resolved: usize,
}

/// Lookback-window digest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub total: usize,
    pub avg_per_day: f64,
    /// `None` with no samples.
    pub most_common_type: Option<IncidentType>,
    /// 0 with no samples.
    pub busiest_hour: u32,
}

/// Derived views over incident history.
///
/// # Example
/// ```
/// use u_dispatch::analytics::AnalyticsEngine;
/// use u_dispatch::config::AnalyticsConfig;
/// use u_dispatch::incidents::IncidentManager;
///
/// let manager = IncidentManager::new();
/// let config = AnalyticsConfig::default();
/// let engine = AnalyticsEngine::new(&manager, &config);
/// assert_eq!(engine.performance_score().overall, 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct AnalyticsEngine<'a> {
    incidents: &'a IncidentManager,
    config: &'a AnalyticsConfig,
    now: DateTime<Utc>,
}

impl<'a> AnalyticsEngine<'a> {
    /// Creates an engine measuring windows from the manager's clock.
    pub fn new(incidents: &'a IncidentManager, config: &'a AnalyticsConfig) -> Self {
        Self {
            incidents,
            config,
            now: incidents.now(),
        }
    }

    /// Measures windows from `now` instead.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn resolved_since(&self, days: i64) -> impl Iterator<Item = &'a Incident> + '_ {
        // windows reaching past the representable range cover everything
        let cutoff = Duration::try_days(days)
            .and_then(|d| self.now.checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.incidents
            .all_resolved()
            .into_iter()
            .filter(move |i| i.reported_at >= cutoff)
    }

    /// Counts over resolved incidents reported in the last `days` days.
    pub fn trends(&self, days: i64) -> TrendReport {
        let mut report = TrendReport {
            days,
            ..TrendReport::default()
        };
        for incident in self.resolved_since(days) {
            report.total += 1;
            *report.daily.entry(incident.reported_at.date_naive()).or_insert(0) += 1;
            *report.hourly.entry(incident.reported_at.hour()).or_insert(0) += 1;
            *report.by_type.entry(incident.kind).or_insert(0) += 1;
            *report
                .by_location
                .entry(incident.location.clone())
                .or_insert(0) += 1;
            *report.by_priority.entry(incident.priority).or_insert(0) += 1;
        }
        report
    }

    /// Locations ranked by active plus recently resolved incidents.
    ///
    /// Ties rank by location name.
    pub fn hotspots(&self, limit: usize) -> Vec<Hotspot> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for incident in self.incidents.active(None) {
            *counts.entry(incident.location.as_str()).or_insert(0) += 1;
        }
        for incident in self.resolved_since(self.config.hotspot_window_days) {
            *counts.entry(incident.location.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<Hotspot> = counts
            .into_iter()
            .map(|(location, count)| Hotspot {
                location: location.to_string(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.location.cmp(&b.location)));
        ranked.truncate(limit);
        ranked
    }

    /// Resolution-time statistics over every resolved incident.
    pub fn response_metrics(&self) -> ResponseMetrics {
        ResponseMetrics::calculate(
            self.incidents
                .all_resolved()
                .into_iter()
                .filter_map(|i| i.resolution_minutes),
        )
    }

    /// Frequency-based guess at the next incident.
    pub fn predict(&self) -> Prediction {
        let trends = self.trends(self.config.lookback_days);
        let predicted_hour = most_frequent(&trends.hourly)
            .copied()
            .unwrap_or_else(|| self.now.hour());
        let saturation = self.config.prediction_saturation.max(1) as f64;

        Prediction {
            predicted_type: most_frequent(&trends.by_type).copied(),
            predicted_location: most_frequent(&trends.by_location).cloned(),
            predicted_hour,
            predicted_time: format!("{predicted_hour:02}:00"),
            confidence: (trends.total as f64 / saturation).min(1.0),
            samples: trends.total,
        }
    }

    /// Composite score from the active count and average response time.
    pub fn performance_score(&self) -> PerformanceScore {
        PerformanceScore::calculate(
            self.incidents.active_count(),
            self.response_metrics().avg,
            self.config,
        )
    }

    /// Reported counts plus active versus resolved.
    pub fn distribution(&self) -> Distribution {
        let stats = self.incidents.statistics();
        Distribution {
            by_type: stats.by_type.clone(),
            by_priority: stats.by_priority.clone(),
            active: stats.total_active,
            resolved: stats.total_resolved,
        }
    }

    /// `grid × grid` matrix of hotspot counts, filled row-major.
    pub fn heatmap(&self, grid: usize) -> Vec<Vec<usize>> {
        let mut cells = vec![vec![0; grid]; grid];
        if grid == 0 {
            return cells;
        }
        for (i, spot) in self.hotspots(grid * grid).into_iter().enumerate() {
            cells[i / grid][i % grid] = spot.count;
        }
        cells
    }

    /// Heatmap at the configured grid size.
    pub fn default_heatmap(&self) -> Vec<Vec<usize>> {
        self.heatmap(self.config.heatmap_grid)
    }

    /// Totals over the lookback window.
    pub fn weekly_summary(&self) -> WeeklySummary {
        let trends = self.trends(self.config.lookback_days);
        let days = self.config.lookback_days.max(1) as f64;
        WeeklySummary {
            total: trends.total,
            avg_per_day: trends.total as f64 / days,
            most_common_type: most_frequent(&trends.by_type).copied(),
            busiest_hour: most_frequent(&trends.hourly).copied().unwrap_or(0),
        }
    }
}

/// Key with the highest count; the smallest such key on ties.
fn most_frequent<K: Ord>(counts: &BTreeMap<K, usize>) -> Option<&K> {
    let mut best: Option<(&K, usize)> = None;
    for (key, &count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((key, count));
        }
    }
    best.map(|(k, _)| k)
}
