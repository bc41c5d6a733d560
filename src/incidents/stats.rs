//! Running incident counters and manager summaries.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::collections::TableStats;
use crate::models::IncidentType;

/// Counters maintained incrementally by report and resolve.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IncidentStatistics {
    /// Incidents ever reported.
    pub total_reported: usize,
    /// Incidents currently queued.
    pub total_active: usize,
    /// Incidents resolved.
    pub total_resolved: usize,
    /// Running mean of resolution minutes.
    pub avg_resolution_minutes: f64,
    /// Reported count per type.
    pub by_type: BTreeMap<IncidentType, usize>,
    /// Reported count per priority at report time.
    pub by_priority: BTreeMap<u8, usize>,
}

impl IncidentStatistics {
    pub(crate) fn record_report(&mut self, kind: IncidentType, priority: u8) {
        self.total_reported += 1;
        self.total_active += 1;
        *self.by_type.entry(kind).or_insert(0) += 1;
        *self.by_priority.entry(priority).or_insert(0) += 1;
    }

    /// Incremental mean: `new = (old * (n - 1) + x) / n`.
    pub(crate) fn record_resolution(&mut self, minutes: f64) {
        self.total_active = self.total_active.saturating_sub(1);
        self.total_resolved += 1;
        let n = self.total_resolved as f64;
        self.avg_resolution_minutes = (self.avg_resolution_minutes * (n - 1.0) + minutes) / n;
    }
}

/// Point-in-time view across every structure the manager owns.
#[derive(Debug, Clone, Serialize)]
pub struct ManagerSummary {
    /// Running counters.
    pub statistics: IncidentStatistics,
    /// Queued incidents per current priority.
    pub active_by_priority: BTreeMap<u8, usize>,
    /// Resolved incidents per type.
    pub resolved_by_type: BTreeMap<IncidentType, usize>,
    /// Height of the resolved-record tree.
    pub resolved_tree_height: usize,
    /// Nodes in the resolved-record tree.
    pub resolved_tree_size: usize,
    /// Shape of the location index.
    pub location_index: TableStats,
    /// Entries in the resolution history.
    pub history_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incremental_mean() {
        let mut stats = IncidentStatistics::default();
        for _ in 0..3 {
            stats.record_report(IncidentType::Fire, 2);
        }
        stats.record_resolution(10.0);
        stats.record_resolution(20.0);
        stats.record_resolution(60.0);

        assert!((stats.avg_resolution_minutes - 30.0).abs() < 1e-10);
        assert_eq!(stats.total_active, 0);
        assert_eq!(stats.total_resolved, 3);
        assert_eq!(stats.by_type[&IncidentType::Fire], 3);
        assert_eq!(stats.by_priority[&2], 3);
    }
}
