use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Notice, NoticeLevel, Platform};

/// Platform for the terminal front end: storage is a small JSON file,
/// navigation becomes a hint on stderr and notices are printed.
pub struct TerminalPlatform {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl TerminalPlatform {
    /// Opens (or lazily creates) the state file. A missing or unreadable
    /// file starts out empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt state file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// `$TASKS_STATE_FILE`, else `$HOME/.config/task-manager-client/state.json`,
    /// else `./.task-manager-client.json`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("TASKS_STATE_FILE") {
            return PathBuf::from(path);
        }
        match std::env::var("HOME") {
            Ok(home) => Path::new(&home)
                .join(".config")
                .join("task-manager-client")
                .join("state.json"),
            Err(_) => PathBuf::from(".task-manager-client.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) {
        let result = (|| -> std::io::Result<()> {
            if let Some(dir) = self.path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let raw = serde_json::to_string_pretty(values)?;
            std::fs::write(&self.path, raw)
        })();

        if let Err(e) = result {
            tracing::error!("Failed to write {}: {}", self.path.display(), e);
        }
    }
}

impl Platform for TerminalPlatform {
    fn storage_get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn storage_set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
            self.persist(&values);
        }
    }

    fn storage_remove(&self, key: &str) {
        if let Ok(mut values) = self.values.lock() {
            if values.remove(key).is_some() {
                self.persist(&values);
            }
        }
    }

    fn navigate(&self, path: &str) {
        if path.contains("login") {
            eprintln!("Session ended. Run `task-manager-client login` to sign in again.");
        } else {
            tracing::debug!("navigate {}", path);
        }
    }

    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => println!("{}", notice.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let path = std::env::temp_dir().join(format!("tmc-{}.json", uuid::Uuid::new_v4()));

        let platform = TerminalPlatform::open(&path);
        platform.storage_set("theme", "dark");
        platform.storage_set("auth_token", "abc");
        platform.storage_remove("auth_token");

        let reopened = TerminalPlatform::open(&path);
        assert_eq!(reopened.storage_get("theme").as_deref(), Some("dark"));
        assert_eq!(reopened.storage_get("auth_token"), None);

        let _ = std::fs::remove_file(&path);
    }
}
