//! Incident lifecycle: report, prioritize, search, resolve, archive.
//!
//! # Lifecycle
//!
//! ```text
//! report ──▶ Active (queued, indexed) ──resolve──▶ Resolved (tree + history)
//! ```
//!
//! A record transitions exactly once. Reported records are never deleted.

mod manager;
mod stats;

pub use manager::{IncidentManager, LocationHit, QueueTicket};
pub use stats::{IncidentStatistics, ManagerSummary};
