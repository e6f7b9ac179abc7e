use dashmap::DashMap;
use std::sync::{Arc, Mutex};

use super::{Notice, Platform};

/// In-process platform that keeps storage in memory and records every
/// navigation and notification for later inspection.
#[derive(Clone, Default)]
pub struct MemoryPlatform {
    storage: Arc<DashMap<String, String>>,
    navigations: Arc<Mutex<Vec<String>>>,
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths navigated to, oldest first.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Notifications emitted, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn clear_log(&self) {
        if let Ok(mut log) = self.navigations.lock() {
            log.clear();
        }
        if let Ok(mut log) = self.notices.lock() {
            log.clear();
        }
    }
}

impl Platform for MemoryPlatform {
    fn storage_get(&self, key: &str) -> Option<String> {
        self.storage.get(key).map(|entry| entry.value().clone())
    }

    fn storage_set(&self, key: &str, value: &str) {
        self.storage.insert(key.to_string(), value.to_string());
    }

    fn storage_remove(&self, key: &str) {
        self.storage.remove(key);
    }

    fn navigate(&self, path: &str) {
        if let Ok(mut log) = self.navigations.lock() {
            log.push(path.to_string());
        }
    }

    fn notify(&self, notice: Notice) {
        if let Ok(mut log) = self.notices.lock() {
            log.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::TOKEN_KEY;

    #[test]
    fn test_records_side_effects() {
        let platform = MemoryPlatform::new();
        platform.storage_set(TOKEN_KEY, "abc");
        platform.navigate("/login");
        platform.notify(Notice::error("boom"));

        assert_eq!(platform.storage_get(TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(platform.navigations(), vec!["/login".to_string()]);
        assert_eq!(platform.notices(), vec![Notice::error("boom")]);

        platform.storage_remove(TOKEN_KEY);
        assert_eq!(platform.storage_get(TOKEN_KEY), None);
    }

    #[test]
    fn test_clones_share_state() {
        let platform = MemoryPlatform::new();
        let other = platform.clone();
        other.storage_set("k", "v");
        assert_eq!(platform.storage_get("k").as_deref(), Some("v"));
    }
}
