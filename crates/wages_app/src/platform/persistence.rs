use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use wages_core::{Preferences, SectorFilter, SortKey, ViewMode, ViewState};
use wages_engine::write_atomic;
use wages_logging::{wages_error, wages_info, wages_warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedView {
    search_term: String,
    sector_filter: String,
    sort_key: String,
    view_mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedPreferences {
    notifications_enabled: bool,
    last_seen_update: Option<String>,
    view: PersistedView,
}

impl From<&Preferences> for PersistedPreferences {
    fn from(preferences: &Preferences) -> Self {
        let view = &preferences.view;
        Self {
            notifications_enabled: preferences.notifications_enabled,
            last_seen_update: preferences.last_seen_update.clone(),
            view: PersistedView {
                search_term: view.search_term.clone(),
                sector_filter: view.sector_filter.as_str().to_string(),
                sort_key: view.sort_key.as_str().to_string(),
                view_mode: view.view_mode.as_str().to_string(),
            },
        }
    }
}

impl From<PersistedPreferences> for Preferences {
    /// Unknown values fall back to the defaults.
    fn from(persisted: PersistedPreferences) -> Self {
        let view = persisted.view;
        Self {
            notifications_enabled: persisted.notifications_enabled,
            last_seen_update: persisted.last_seen_update,
            view: ViewState {
                search_term: view.search_term,
                sector_filter: SectorFilter::parse(&view.sector_filter).unwrap_or_default(),
                sort_key: SortKey::parse(&view.sort_key).unwrap_or_default(),
                view_mode: ViewMode::parse(&view.view_mode).unwrap_or_default(),
            },
        }
    }
}

/// Viewer preferences saved by an earlier run; `None` when absent or
/// unreadable.
pub fn load_preferences(path: &Path) -> Option<Preferences> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return None;
        }
        Err(err) => {
            wages_warn!("Failed to read preferences from {:?}: {}", path, err);
            return None;
        }
    };

    match ron::from_str::<PersistedPreferences>(&content) {
        Ok(persisted) => {
            wages_info!("Loaded preferences from {:?}", path);
            Some(persisted.into())
        }
        Err(err) => {
            wages_warn!("Failed to parse preferences from {:?}: {}", path, err);
            None
        }
    }
}

pub fn save_preferences(path: &Path, preferences: &Preferences) {
    let persisted = PersistedPreferences::from(preferences);
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&persisted, pretty) {
        Ok(text) => text,
        Err(err) => {
            wages_error!("Failed to serialize preferences: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomic(path, content.as_bytes()) {
        wages_error!("Failed to write preferences to {:?}: {}", path, err);
    }
}
