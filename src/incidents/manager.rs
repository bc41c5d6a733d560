//! Incident lifecycle orchestration.
//!
//! The id table is the single owner of every incident record. The other
//! structures hold ids only:
//!
//! | Structure | Holds | Purpose |
//! |-----------|-------|---------|
//! | `queue` | id + priority ticket | active incidents in dispatch order |
//! | `by_location` | id lists | lookup by exact location |
//! | `locations` | location name | prefix search over location tokens |
//! | `resolved` | type → id | resolved lookup by type |
//! | `history` | id | resolution order |
//!
//! Read accessors resolve ids back through the id table, so an update made by
//! resolve or by resource assignment is visible from every view.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::collections::{HistoryLog, IndexTable, LocationTrie, Prioritized, PriorityQueue, ResolvedStore};
use crate::config::DispatchConfig;
use crate::error::{DispatchError, Result};
use crate::ids::IdGenerator;
use crate::models::{Incident, IncidentDraft, IncidentStatus, IncidentType, PRIORITY_MAX, PRIORITY_MIN};

use super::stats::{IncidentStatistics, ManagerSummary};

/// Queue entry for an active incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueTicket {
    /// Incident id.
    pub id: String,
    /// Current priority.
    pub priority: u8,
}

impl Prioritized for QueueTicket {
    fn key(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn set_priority(&mut self, priority: u8) {
        self.priority = priority;
    }
}

/// Trie payload: the original-case location a token came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationHit {
    pub location: String,
}

/// Owns every incident and the structures indexing them.
#[derive(Debug)]
pub struct IncidentManager {
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
    search_limit: usize,
    min_prefix_len: usize,
    queue: PriorityQueue<QueueTicket>,
    by_id: IndexTable<Incident>,
    by_location: IndexTable<Vec<String>>,
    locations: LocationTrie<LocationHit>,
    resolved: ResolvedStore<IncidentType, String>,
    history: HistoryLog<String>,
    stats: IncidentStatistics,
}

impl IncidentManager {
    /// Creates a manager with default configuration and the system clock.
    pub fn new() -> Self {
        Self::with_config(&DispatchConfig::default(), Arc::new(SystemClock))
    }

    /// Creates a manager from `config`, reading time from `clock`.
    pub fn with_config(config: &DispatchConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            ids: IdGenerator::incidents(config.incident_id_start),
            search_limit: config.autocomplete_limit,
            min_prefix_len: config.min_prefix_len,
            queue: PriorityQueue::new(),
            by_id: IndexTable::with_load_factor(config.incident_buckets, config.max_load_factor),
            by_location: IndexTable::with_load_factor(config.location_buckets, config.max_load_factor),
            locations: LocationTrie::new(),
            resolved: ResolvedStore::new(),
            history: HistoryLog::new(),
            stats: IncidentStatistics::default(),
        }
    }

    /// Current time from the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Incident id generator state.
    pub fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }

    /// Reports a new incident and returns its id.
    ///
    /// Fills unset draft fields (id, timestamp, priority), queues the
    /// incident, indexes it by id and location, and adds each lowercase
    /// location token plus the full lowercase location to the trie.
    ///
    /// # Errors
    /// Draft validation errors, or [`DispatchError::DuplicateIncident`] when
    /// the id is already known.
    pub fn report(&mut self, draft: IncidentDraft) -> Result<String> {
        let now = self.clock.now();
        let ids = &mut self.ids;
        let incident = draft.build(|| ids.next_id(), now)?;
        if self.by_id.contains(&incident.id) {
            return Err(DispatchError::DuplicateIncident(incident.id));
        }

        let id = incident.id.clone();
        info!(
            incident_id = %id,
            kind = %incident.kind,
            location = %incident.location,
            priority = incident.priority,
            "incident reported"
        );

        self.queue.push(QueueTicket {
            id: id.clone(),
            priority: incident.priority,
        });
        self.stats.record_report(incident.kind, incident.priority);
        self.index(incident);
        Ok(id)
    }

    // Id table, location index and trie.
    fn index(&mut self, incident: Incident) {
        let id = incident.id.clone();
        let location = incident.location.clone();

        match self.by_location.get_mut(&location) {
            Some(ids) => ids.push(id.clone()),
            None => self.by_location.insert(location.clone(), vec![id.clone()]),
        }

        let lowered = location.to_lowercase();
        for token in lowered.split_whitespace() {
            self.locations.insert(token, LocationHit { location: location.clone() });
        }
        self.locations.insert(&lowered, LocationHit { location });

        self.by_id.insert(id, incident);
    }

    /// Resolves `id`, or the most urgent active incident when `id` is `None`.
    ///
    /// Returns the resolved record, or `None` if the id is not active (or the
    /// queue is empty). Resolving the same id twice yields `None` the second
    /// time.
    ///
    /// Deployed units are not touched: a unit still assigned here keeps
    /// pointing at a resolved incident. Use
    /// [`ResourceManager::resolve_incident`](crate::dispatching::ResourceManager::resolve_incident)
    /// or `DispatchCenter::resolve` to release them first.
    pub fn resolve(&mut self, id: Option<&str>) -> Option<Incident> {
        let ticket = match id {
            Some(id) => self.queue.remove_by_id(id)?,
            None => self.queue.pop()?,
        };

        let now = self.clock.now();
        let incident = self.by_id.get_mut(&ticket.id)?;
        incident.status = IncidentStatus::Resolved;
        incident.resolved_at = Some(now);
        let minutes = (now - incident.reported_at).num_milliseconds() as f64 / 60_000.0;
        incident.resolution_minutes = Some(minutes);
        let resolved = incident.clone();

        self.resolved.insert(resolved.kind, resolved.id.clone());
        self.history.append(resolved.id.clone());
        self.stats.record_resolution(minutes);

        info!(
            incident_id = %resolved.id,
            kind = %resolved.kind,
            resolution_minutes = minutes,
            "incident resolved"
        );
        Some(resolved)
    }

    /// Re-inserts a record as-is, keeping its id, status and timestamps.
    ///
    /// Active records are queued; resolved records go to the resolved store
    /// and the end of the history.
    pub fn restore(&mut self, incident: Incident) -> Result<()> {
        if self.by_id.contains(&incident.id) {
            return Err(DispatchError::DuplicateIncident(incident.id));
        }
        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&incident.priority) {
            return Err(DispatchError::InvalidPriority(incident.priority));
        }
        if incident.location.trim().is_empty() {
            return Err(DispatchError::EmptyLocation);
        }

        self.stats.record_report(incident.kind, incident.priority);
        match incident.status {
            IncidentStatus::Active => self.queue.push(QueueTicket {
                id: incident.id.clone(),
                priority: incident.priority,
            }),
            IncidentStatus::Resolved => {
                self.resolved.insert(incident.kind, incident.id.clone());
                self.history.append(incident.id.clone());
                self.stats
                    .record_resolution(incident.resolution_minutes.unwrap_or(0.0));
            }
        }
        self.index(incident);
        Ok(())
    }

    /// Continues id generation after `counter`, if it is ahead.
    pub fn advance_ids_to(&mut self, counter: u64) {
        self.ids.advance_to(counter);
    }

    /// Record by id, active or resolved.
    pub fn get(&self, id: &str) -> Option<&Incident> {
        self.by_id.get(id)
    }

    /// Every incident reported at exactly `location`, in report order.
    pub fn by_location(&self, location: &str) -> Vec<&Incident> {
        self.by_location
            .get(location)
            .map(|ids| self.resolve_ids(ids.iter()))
            .unwrap_or_default()
    }

    /// Active incidents in dispatch order, optionally at one priority.
    pub fn active(&self, priority: Option<u8>) -> Vec<&Incident> {
        let tickets = match priority {
            Some(p) => self.queue.by_priority(p),
            None => self.queue.all_by_priority_order(),
        };
        self.resolve_ids(tickets.into_iter().map(|t| &t.id))
    }

    /// The `n` most urgent active incidents.
    pub fn top(&self, n: usize) -> Vec<&Incident> {
        let mut active = self.active(None);
        active.truncate(n);
        active
    }

    /// Most urgent active incident.
    pub fn peek(&self) -> Option<&Incident> {
        self.queue.peek().and_then(|t| self.by_id.get(&t.id))
    }

    /// Whether `id` is currently active.
    pub fn is_active(&self, id: &str) -> bool {
        self.queue.contains(id)
    }

    /// Distinct original-case locations matching `prefix`.
    ///
    /// Prefixes shorter than the configured minimum return nothing. Order
    /// follows the trie's lexicographic order of matched words, first
    /// occurrence kept.
    pub fn search_locations(&self, prefix: &str) -> Vec<String> {
        if prefix.chars().count() < self.min_prefix_len {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        self.locations
            .autocomplete(prefix, self.search_limit)
            .into_iter()
            .filter(|(_, hit)| seen.insert(hit.location.clone()))
            .map(|(_, hit)| hit.location.clone())
            .take(self.search_limit)
            .collect()
    }

    /// Resolved incidents of `kind`.
    pub fn resolved_by_type(&self, kind: IncidentType) -> Vec<&Incident> {
        self.resolve_ids(self.resolved.search(&kind))
    }

    /// Every resolved incident, grouped by type name.
    pub fn all_resolved(&self) -> Vec<&Incident> {
        self.resolve_ids(self.resolved.inorder())
    }

    /// Resolution history, oldest first.
    pub fn history(&self) -> Vec<&Incident> {
        self.resolve_ids(self.history.iter())
    }

    /// The last `n` resolutions, oldest first.
    pub fn recent_history(&self, n: usize) -> Vec<&Incident> {
        self.resolve_ids(self.history.last_n(n))
    }

    /// Ids in resolution order.
    pub fn history_ids(&self) -> Vec<&str> {
        self.history.iter().map(String::as_str).collect()
    }

    /// Resolved count per type.
    pub fn resolved_counts(&self) -> BTreeMap<IncidentType, usize> {
        self.resolved
            .count_by_key()
            .into_iter()
            .map(|(k, n)| (*k, n))
            .collect()
    }

    /// Re-queues an active incident at `priority`.
    ///
    /// The incident moves behind everything already queued at that
    /// priority. Returns `false` for unknown ids and out-of-range priorities.
    pub fn update_priority(&mut self, id: &str, priority: u8) -> bool {
        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&priority) {
            warn!(incident_id = id, priority, "priority update rejected");
            return false;
        }
        if !self.queue.update_priority(id, priority) {
            return false;
        }
        if let Some(incident) = self.by_id.get_mut(id) {
            incident.priority = priority;
        }
        true
    }

    /// Every record, active and resolved, in no particular order.
    pub fn all(&self) -> Vec<&Incident> {
        self.by_id.values()
    }

    /// Active incident count.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.queue.len()
    }

    /// Resolved incident count.
    #[inline]
    pub fn resolved_count(&self) -> usize {
        self.history.len()
    }

    /// Running counters.
    pub fn statistics(&self) -> &IncidentStatistics {
        &self.stats
    }

    /// Counters plus the shape of every internal structure.
    pub fn summary(&self) -> ManagerSummary {
        ManagerSummary {
            statistics: self.stats.clone(),
            active_by_priority: self.queue.stats(),
            resolved_by_type: self.resolved_counts(),
            resolved_tree_height: self.resolved.height(),
            resolved_tree_size: self.resolved.size(),
            location_index: self.by_location.stats(),
            history_len: self.history.len(),
        }
    }

    /// Links a resource to an active incident. `false` if not active.
    pub(crate) fn attach_resource(&mut self, incident_id: &str, resource_id: &str) -> bool {
        if !self.queue.contains(incident_id) {
            return false;
        }
        match self.by_id.get_mut(incident_id) {
            Some(incident) => {
                if !incident.has_resource(resource_id) {
                    incident.assigned_resources.push(resource_id.to_string());
                }
                true
            }
            None => false,
        }
    }

    /// Unlinks a resource from an incident, active or not.
    pub(crate) fn detach_resource(&mut self, incident_id: &str, resource_id: &str) {
        if let Some(incident) = self.by_id.get_mut(incident_id) {
            incident.assigned_resources.retain(|r| r != resource_id);
        }
    }

    fn resolve_ids<'a>(&self, ids: impl IntoIterator<Item = &'a String>) -> Vec<&Incident> {
        ids.into_iter().filter_map(|id| self.by_id.get(id)).collect()
    }
}

impl Default for IncidentManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::Severity;
    use chrono::{Duration, TimeZone};

    fn setup() -> (IncidentManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ));
        let manager = IncidentManager::with_config(&DispatchConfig::default(), clock.clone());
        (manager, clock)
    }

    fn report(m: &mut IncidentManager, kind: IncidentType, location: &str, priority: u8) -> String {
        m.report(IncidentDraft::new(kind, location).with_priority(priority))
            .unwrap()
    }

    #[test]
    fn test_report_assigns_sequential_ids() {
        let (mut m, _) = setup();
        let a = m.report(IncidentDraft::new(IncidentType::Fire, "Andheri West")).unwrap();
        let b = m.report(IncidentDraft::new(IncidentType::Crime, "Bandra")).unwrap();
        assert_eq!(a, "EMG1001");
        assert_eq!(b, "EMG1002");

        let fire = m.get(&a).unwrap();
        assert_eq!(fire.priority, 2);
        assert_eq!(fire.status, IncidentStatus::Active);
        assert_eq!(fire.reported_at, m.now());
    }

    #[test]
    fn test_report_rejects_duplicate_and_invalid() {
        let (mut m, _) = setup();
        m.report(IncidentDraft::new(IncidentType::Fire, "Pune").with_id("X1"))
            .unwrap();
        let dup = m.report(IncidentDraft::new(IncidentType::Flood, "Pune").with_id("X1"));
        assert!(matches!(dup, Err(DispatchError::DuplicateIncident(_))));

        let bad = m.report(IncidentDraft::new(IncidentType::Fire, "Pune").with_priority(9));
        assert!(matches!(bad, Err(DispatchError::InvalidPriority(9))));
        assert_eq!(m.statistics().total_reported, 1);
        assert_eq!(m.active_count(), 1);
    }

    #[test]
    fn test_resolve_next_follows_priority_then_fifo() {
        let (mut m, _) = setup();
        let p1 = report(&mut m, IncidentType::Fire, "A", 2);
        let p2 = report(&mut m, IncidentType::Fire, "B", 1);
        let p3 = report(&mut m, IncidentType::Fire, "C", 1);

        let order: Vec<String> = (0..3).filter_map(|_| m.resolve(None)).map(|i| i.id).collect();
        assert_eq!(order, vec![p2, p3, p1]);
        assert!(m.resolve(None).is_none());
    }

    #[test]
    fn test_resolve_lifecycle() {
        let (mut m, clock) = setup();
        let id = report(&mut m, IncidentType::Accident, "Thane Station", 3);
        clock.advance(Duration::minutes(45));

        let resolved = m.resolve(Some(&id)).unwrap();
        assert_eq!(resolved.status, IncidentStatus::Resolved);
        assert!((resolved.resolution_minutes.unwrap() - 45.0).abs() < 1e-10);
        assert_eq!(resolved.resolved_at, Some(clock.now()));

        assert!(!m.is_active(&id));
        assert_eq!(m.active_count(), 0);
        assert_eq!(m.resolved_count(), 1);
        assert_eq!(m.history_ids(), vec![id.as_str()]);
        assert_eq!(m.resolved_by_type(IncidentType::Accident).len(), 1);
        assert_eq!(m.get(&id).unwrap().status, IncidentStatus::Resolved);

        assert!(m.resolve(Some(&id)).is_none());
        assert_eq!(m.resolved_count(), 1);
        assert!(m.resolve(Some("EMG9999")).is_none());
    }

    #[test]
    fn test_average_resolution_time() {
        let (mut m, clock) = setup();
        let a = report(&mut m, IncidentType::Fire, "A", 2);
        let b = report(&mut m, IncidentType::Fire, "B", 2);
        clock.advance(Duration::minutes(10));
        m.resolve(Some(&a));
        clock.advance(Duration::minutes(20));
        m.resolve(Some(&b));

        // 10 and 30 minutes
        assert!((m.statistics().avg_resolution_minutes - 20.0).abs() < 1e-10);
        assert_eq!(m.statistics().total_active, 0);
    }

    #[test]
    fn test_location_index_and_search() {
        let (mut m, _) = setup();
        report(&mut m, IncidentType::Fire, "Andheri West", 2);
        report(&mut m, IncidentType::Crime, "Andheri East", 3);
        report(&mut m, IncidentType::Flood, "Andheri West", 2);

        assert_eq!(m.by_location("Andheri West").len(), 2);
        assert!(m.by_location("andheri west").is_empty());

        // "andheri" itself sorts first and points at the latest report there
        assert_eq!(
            m.search_locations("andh"),
            vec!["Andheri West".to_string(), "Andheri East".to_string()]
        );
        // token match
        assert_eq!(m.search_locations("WE"), vec!["Andheri West".to_string()]);
        assert!(m.search_locations("a").is_empty());
        assert!(m.search_locations("").is_empty());
    }

    #[test]
    fn test_search_caps_results() {
        let (mut m, _) = setup();
        for i in 0..15 {
            report(&mut m, IncidentType::Other, &format!("Sector{i:02}"), 5);
        }
        assert_eq!(m.search_locations("se").len(), 10);
    }

    #[test]
    fn test_update_priority_requeues() {
        let (mut m, _) = setup();
        let a = report(&mut m, IncidentType::Crime, "A", 1);
        let b = report(&mut m, IncidentType::Crime, "B", 3);
        assert!(m.update_priority(&b, 1));
        assert_eq!(m.get(&b).unwrap().priority, 1);

        let order: Vec<&str> = m.active(None).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec![a.as_str(), b.as_str()]);

        assert!(!m.update_priority(&a, 0));
        assert!(!m.update_priority("missing", 2));
    }

    #[test]
    fn test_active_filters_and_top() {
        let (mut m, _) = setup();
        report(&mut m, IncidentType::Fire, "A", 2);
        report(&mut m, IncidentType::Fire, "B", 1);
        report(&mut m, IncidentType::Fire, "C", 2);

        assert_eq!(m.active(Some(2)).len(), 2);
        assert_eq!(m.top(1)[0].location, "B");
        assert_eq!(m.top(10).len(), 3);
        assert_eq!(m.peek().unwrap().location, "B");
    }

    #[test]
    fn test_history_and_counts() {
        let (mut m, _) = setup();
        let ids: Vec<String> = ["A", "B", "C"]
            .iter()
            .map(|loc| report(&mut m, IncidentType::Fire, loc, 2))
            .collect();
        let crime = report(&mut m, IncidentType::Crime, "D", 3);
        for id in ids.iter().rev() {
            m.resolve(Some(id));
        }
        m.resolve(Some(&crime));

        let recent: Vec<&str> = m.recent_history(2).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(recent, vec![ids[0].as_str(), crime.as_str()]);

        let counts = m.resolved_counts();
        assert_eq!(counts[&IncidentType::Fire], 3);
        assert_eq!(counts[&IncidentType::Crime], 1);
        assert_eq!(m.all_resolved()[0].kind, IncidentType::Crime);
    }

    #[test]
    fn test_summary() {
        let (mut m, _) = setup();
        let a = report(&mut m, IncidentType::Fire, "A", 2);
        report(&mut m, IncidentType::Crime, "B", 3);
        m.resolve(Some(&a));

        let s = m.summary();
        assert_eq!(s.statistics.total_reported, 2);
        assert_eq!(s.active_by_priority.get(&3), Some(&1));
        assert_eq!(s.resolved_by_type.get(&IncidentType::Fire), Some(&1));
        assert_eq!(s.resolved_tree_size, 1);
        assert_eq!(s.resolved_tree_height, 1);
        assert_eq!(s.location_index.count, 2);
        assert_eq!(s.history_len, 1);
    }

    #[test]
    fn test_attach_requires_active() {
        let (mut m, _) = setup();
        let id = report(&mut m, IncidentType::Fire, "A", 2);
        assert!(m.attach_resource(&id, "RES1"));
        assert!(m.attach_resource(&id, "RES1"));
        assert_eq!(m.get(&id).unwrap().assigned_resources, vec!["RES1"]);

        m.detach_resource(&id, "RES1");
        assert!(m.get(&id).unwrap().assigned_resources.is_empty());

        m.resolve(Some(&id));
        assert!(!m.attach_resource(&id, "RES2"));
        assert!(!m.attach_resource("nope", "RES2"));
    }

    #[test]
    fn test_restore_keeps_state() {
        let (mut m, clock) = setup();
        let a = m
            .report(
                IncidentDraft::new(IncidentType::GasLeak, "Kurla")
                    .with_severity(Severity::High),
            )
            .unwrap();
        clock.advance(Duration::minutes(30));
        let resolved = m.resolve(Some(&a)).unwrap();

        let (mut fresh, _) = setup();
        fresh.restore(resolved.clone()).unwrap();
        assert_eq!(fresh.get(&a), Some(&resolved));
        assert_eq!(fresh.resolved_count(), 1);
        assert!(!fresh.is_active(&a));
        assert!((fresh.statistics().avg_resolution_minutes - 30.0).abs() < 1e-10);
        assert!(matches!(
            fresh.restore(resolved),
            Err(DispatchError::DuplicateIncident(_))
        ));

        fresh.advance_ids_to(1001);
        let next = fresh.report(IncidentDraft::new(IncidentType::Fire, "X")).unwrap();
        assert_eq!(next, "EMG1002");
    }
}
