//! Notification deduplication

use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Tracks which transition keys (or per-hour event keys) have already
/// produced a notification for one subscription.
///
/// Entries are stamped with the local time they were recorded so the
/// engine can evict anything older than the monitoring horizon; within
/// retention a key fires at most once. The log lives in process memory
/// only — losing it on restart costs one redundant re-alert per open
/// transition, which is acceptable.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: HashMap<String, NaiveDateTime>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fired(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn mark_fired(&mut self, key: impl Into<String>, at: NaiveDateTime) {
        self.entries.insert(key.into(), at);
    }

    /// Drop entries recorded more than `max_age_hours` before `now`.
    pub fn evict_older_than(&mut self, now: NaiveDateTime, max_age_hours: i64) {
        self.entries
            .retain(|_, at| (now - *at).num_hours() <= max_age_hours);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_mark_and_query() {
        let mut log = NotificationLog::new();
        assert!(!log.has_fired("2026031410_to_2026031412"));

        log.mark_fired("2026031410_to_2026031412", at(8));
        assert!(log.has_fired("2026031410_to_2026031412"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_eviction_by_age() {
        let mut log = NotificationLog::new();
        log.mark_fired("old", at(0) - Duration::hours(60));
        log.mark_fired("recent", at(0) - Duration::hours(10));

        log.evict_older_than(at(0), 48);
        assert!(!log.has_fired("old"));
        assert!(log.has_fired("recent"));
    }

    #[test]
    fn test_eviction_keeps_boundary_entry() {
        let mut log = NotificationLog::new();
        log.mark_fired("edge", at(0) - Duration::hours(48));
        log.evict_older_than(at(0), 48);
        assert!(log.has_fired("edge"));
    }
}
