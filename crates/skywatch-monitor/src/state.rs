//! Per-subscription monitor state map

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use skywatch_core::SubscriptionState;

/// (user id, city) — one monitored subscription.
pub type SubscriptionKey = (String, String);

/// Map of live subscription states.
///
/// Entries are created lazily on first successful fetch and evicted as
/// soon as the subscription disappears from the store snapshot, so
/// unsubscribing never leaves orphaned state behind.
#[derive(Debug, Default)]
pub struct MonitorState {
    states: HashMap<SubscriptionKey, SubscriptionState>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&mut self, user_id: &str, city: &str) -> &mut SubscriptionState {
        self.states
            .entry((user_id.to_string(), city.to_string()))
            .or_default()
    }

    pub fn get(&self, user_id: &str, city: &str) -> Option<&SubscriptionState> {
        self.states
            .get(&(user_id.to_string(), city.to_string()))
    }

    /// Drop state for subscriptions no longer in the live set.
    pub fn retain_live(&mut self, live: &HashSet<SubscriptionKey>) {
        self.states.retain(|key, _| live.contains(key));
    }

    /// Age out dedup keys and cached hours in every entry.
    pub fn prune_all(&mut self, now: NaiveDateTime, max_age_hours: i64) {
        for state in self.states.values_mut() {
            state.prune(now, max_age_hours);
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
