pub mod memory_platform;
pub mod terminal_platform;

pub use memory_platform::MemoryPlatform;
pub use terminal_platform::TerminalPlatform;

use serde::{Deserialize, Serialize};

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key of the theme preference.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient user notification ("toast").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Capabilities of the environment the client runs in.
///
/// Every side effect of the client (persisted strings, navigation,
/// notifications) goes through this trait. Environments without a given
/// capability implement it as a no-op.
pub trait Platform: Send + Sync {
    fn storage_get(&self, key: &str) -> Option<String>;
    fn storage_set(&self, key: &str, value: &str);
    fn storage_remove(&self, key: &str);
    fn navigate(&self, path: &str);
    fn notify(&self, notice: Notice);
}

/// No storage, no navigation, no notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessPlatform;

impl Platform for HeadlessPlatform {
    fn storage_get(&self, _key: &str) -> Option<String> {
        None
    }

    fn storage_set(&self, _key: &str, _value: &str) {}

    fn storage_remove(&self, _key: &str) {}

    fn navigate(&self, path: &str) {
        tracing::debug!("Navigation to {} suppressed (headless)", path);
    }

    fn notify(&self, _notice: Notice) {}
}
