use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::platform::{Platform, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// What actually gets painted once `System` is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
}

impl Theme {
    /// Persisted preference, `System` when absent or unrecognised.
    pub fn load(platform: &dyn Platform) -> Self {
        platform
            .storage_get(THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn resolve(self, system_prefers_dark: bool) -> Appearance {
        match self {
            Theme::Light => Appearance::Light,
            Theme::Dark => Appearance::Dark,
            Theme::System if system_prefers_dark => Appearance::Dark,
            Theme::System => Appearance::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme '{}' (expected light, dark or system)", other)),
        }
    }
}

/// The persisted theme preference.
#[derive(Clone)]
pub struct ThemePreference {
    platform: Arc<dyn Platform>,
}

impl ThemePreference {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    pub fn get(&self) -> Theme {
        Theme::load(self.platform.as_ref())
    }

    pub fn set(&self, theme: Theme) {
        self.platform.storage_set(THEME_KEY, &theme.to_string());
    }

    /// Flips between light and dark based on what is currently shown.
    pub fn toggle(&self, system_prefers_dark: bool) -> Theme {
        let next = match self.get().resolve(system_prefers_dark) {
            Appearance::Dark => Theme::Light,
            Appearance::Light => Theme::Dark,
        };
        self.set(next);
        next
    }
}
