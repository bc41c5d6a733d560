//! Identifier generation.
//!
//! Each manager owns one generator for the records it issues: incidents get
//! `EMG<n>`, resources get `RES<n>`. Counters start from injectable values so a
//! restored or replayed system can continue a sequence without collisions.

use serde::{Deserialize, Serialize};

/// Incident id prefix.
pub const INCIDENT_PREFIX: &str = "EMG";

/// Resource id prefix.
pub const RESOURCE_PREFIX: &str = "RES";

/// Counter-backed id source for one record kind.
///
/// Ids are `<prefix><n>`, where `n` is the counter value *after* increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    prefix: String,
    counter: u64,
}

impl IdGenerator {
    /// Creates a generator whose first id is `<prefix><start + 1>`.
    pub fn new(prefix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: prefix.into(),
            counter: start,
        }
    }

    /// `EMG` ids.
    pub fn incidents(start: u64) -> Self {
        Self::new(INCIDENT_PREFIX, start)
    }

    /// `RES` ids.
    pub fn resources(start: u64) -> Self {
        Self::new(RESOURCE_PREFIX, start)
    }

    /// Issues the next id.
    pub fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("{}{}", self.prefix, self.counter)
    }

    /// Moves the counter forward to `counter`; never moves it back.
    pub fn advance_to(&mut self, counter: u64) {
        self.counter = self.counter.max(counter);
    }

    /// Last issued counter value.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Id prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences() {
        let mut incidents = IdGenerator::incidents(1000);
        assert_eq!(incidents.next_id(), "EMG1001");
        assert_eq!(incidents.next_id(), "EMG1002");
        assert_eq!(incidents.counter(), 1002);

        let mut resources = IdGenerator::resources(499);
        assert_eq!(resources.next_id(), "RES500");
        assert_eq!(resources.prefix(), "RES");
    }

    #[test]
    fn test_advance_is_monotonic() {
        let mut ids = IdGenerator::incidents(10);
        ids.advance_to(40);
        assert_eq!(ids.next_id(), "EMG41");
        ids.advance_to(5);
        assert_eq!(ids.next_id(), "EMG42");
    }
}
