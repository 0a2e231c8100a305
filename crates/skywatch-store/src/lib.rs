//! Subscription persistence
//!
//! A flat JSON mapping of user id to subscribed city names, loaded at
//! startup and rewritten on every mutation. Command handlers mutate
//! it; the monitor reads a fresh snapshot each cycle.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// File-backed subscription list.
#[derive(Debug)]
pub struct SubscriptionStore {
    path: PathBuf,
    subs: HashMap<String, Vec<String>>,
}

impl SubscriptionStore {
    /// Load subscriptions from `path`. A missing or corrupt file
    /// starts an empty store rather than failing startup.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let subs = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(subs) => subs,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "subscription file corrupt, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no subscription file, starting empty");
                HashMap::new()
            }
        };
        Self { path, subs }
    }

    /// Rewrite the backing file (write to a sibling temp file, then
    /// rename over the original).
    pub fn save(&self) -> StoreResult<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.subs)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Add a city for a user. Returns false if already subscribed.
    /// City names are normalized to lowercase.
    pub fn subscribe(&mut self, user_id: &str, city: &str) -> bool {
        let city = normalize_city(city);
        let cities = self.subs.entry(user_id.to_string()).or_default();
        if cities.contains(&city) {
            return false;
        }
        cities.push(city);
        true
    }

    /// Remove a city for a user. Dropping a user's last city removes
    /// the user entry entirely. Returns false if not subscribed.
    pub fn unsubscribe(&mut self, user_id: &str, city: &str) -> bool {
        let city = normalize_city(city);
        let Some(cities) = self.subs.get_mut(user_id) else {
            return false;
        };
        let Some(idx) = cities.iter().position(|c| *c == city) else {
            return false;
        };
        cities.remove(idx);
        if cities.is_empty() {
            self.subs.remove(user_id);
        }
        true
    }

    /// Cities a user is subscribed to (empty if none).
    pub fn cities(&self, user_id: &str) -> Vec<String> {
        self.subs.get(user_id).cloned().unwrap_or_default()
    }

    /// All (user, city) pairs, the monitor's per-cycle work list.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .subs
            .iter()
            .flat_map(|(user, cities)| {
                cities.iter().map(move |c| (user.clone(), c.clone()))
            })
            .collect();
        pairs.sort();
        pairs
    }

    pub fn len(&self) -> usize {
        self.subs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}

fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SubscriptionStore {
        SubscriptionStore::load(dir.path().join("subscriptions.json"))
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subscriptions.json");
        fs::write(&path, "{not json").unwrap();

        let store = SubscriptionStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_subscribe_normalizes_and_dedups() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        assert!(store.subscribe("42", "  Berlin "));
        assert!(!store.subscribe("42", "berlin"));
        assert_eq!(store.cities("42"), vec!["berlin".to_string()]);
    }

    #[test]
    fn test_unsubscribe_removes_empty_user() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store.subscribe("42", "berlin");
        assert!(store.unsubscribe("42", "Berlin"));
        assert!(!store.unsubscribe("42", "berlin"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subscriptions.json");

        let mut store = SubscriptionStore::load(&path);
        store.subscribe("42", "berlin");
        store.subscribe("42", "hamburg");
        store.subscribe("7", "oslo");
        store.save().unwrap();

        let reloaded = SubscriptionStore::load(&path);
        assert_eq!(reloaded.len(), 3);
        assert_eq!(
            reloaded.snapshot(),
            vec![
                ("42".to_string(), "berlin".to_string()),
                ("42".to_string(), "hamburg".to_string()),
                ("7".to_string(), "oslo".to_string()),
            ]
        );
    }
}
