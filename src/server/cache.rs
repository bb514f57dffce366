use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde_json::Value;

/// Process-local cache of rendered read views.
///
/// Read handlers consult it before recomputing; every mutating handler
/// invalidates the keys its change can affect, so the next read always
/// recomputes. Entries are JSON snapshots keyed by view:
/// `dashboard:{user}:{day}` for day views, `workout:{id}` for detail views.
#[derive(Default)]
pub struct ViewCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl ViewCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries().get(key).cloned()
    }

    pub fn put(&self, key: impl Into<String>, value: Value) {
        self.entries().insert(key.into(), value);
    }

    /// Drops a single entry.
    pub fn invalidate(&self, key: &str) {
        self.entries().remove(key);
    }

    /// Drops every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.entries().retain(|key, _| !key.starts_with(prefix));
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub fn dashboard_key(user_id: &str, day: NaiveDate) -> String {
    format!("dashboard:{user_id}:{day}")
}

pub fn dashboard_prefix(user_id: &str) -> String {
    format!("dashboard:{user_id}:")
}

pub fn workout_key(workout_id: i64) -> String {
    format!("workout:{workout_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_get_roundtrip() {
        let cache = ViewCache::new();
        cache.put(workout_key(1), json!({"id": 1}));

        assert_eq!(cache.get("workout:1"), Some(json!({"id": 1})));
        assert!(cache.get("workout:2").is_none());
    }

    #[test]
    fn test_invalidate_is_exact() {
        let cache = ViewCache::new();
        cache.put(workout_key(1), json!(1));
        cache.put(workout_key(10), json!(10));

        cache.invalidate(&workout_key(1));

        assert!(cache.get(&workout_key(1)).is_none());
        assert!(cache.get(&workout_key(10)).is_some());
    }

    #[test]
    fn test_invalidate_prefix_scopes_by_user() {
        let cache = ViewCache::new();
        let day = NaiveDate::from_ymd_opt(2025, 1, 27).unwrap();
        cache.put(dashboard_key("u1", day), json!([1]));
        cache.put(dashboard_key("u2", day), json!([2]));

        cache.invalidate_prefix(&dashboard_prefix("u1"));

        assert!(cache.get(&dashboard_key("u1", day)).is_none());
        assert!(cache.get(&dashboard_key("u2", day)).is_some());
    }
}
