//! Resolves command line settings into concrete stores and notifiers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use wages_core::WageError;
use wages_engine::{
    ChangeNotifier, EngineConfig, FileRecordStore, HttpNotifier, HttpRecordStore, MemoryNotifier,
    RecordStore, SignalFileNotifier,
};

/// Data file used when no store is configured.
pub const DEFAULT_STORE: &str = "wage-data.json";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const PREFERENCES_FILENAME: &str = ".wage_board_prefs.ron";

fn is_url(raw: &str) -> bool {
    raw.starts_with("http://") || raw.starts_with("https://")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    File(PathBuf),
    /// Base URL of a server exposing `/api/wages`.
    Http(String),
}

impl StoreTarget {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if is_url(raw) {
            StoreTarget::Http(raw.to_string())
        } else {
            StoreTarget::File(PathBuf::from(raw))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierTarget {
    /// Events stay inside this process.
    Memory,
    SignalFile(PathBuf),
    Http(String),
}

impl NotifierTarget {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "none" | "memory" => NotifierTarget::Memory,
            _ if is_url(raw) => NotifierTarget::Http(raw.to_string()),
            _ => NotifierTarget::SignalFile(PathBuf::from(raw)),
        }
    }

    /// Signal file beside a file store; the same server for an HTTP store.
    pub fn default_for(store: &StoreTarget) -> Self {
        match store {
            StoreTarget::File(path) => {
                let path = match path.parent() {
                    Some(parent) => parent.join(wages_engine::SIGNAL_FILE_NAME),
                    None => PathBuf::from(wages_engine::SIGNAL_FILE_NAME),
                };
                NotifierTarget::SignalFile(path)
            }
            StoreTarget::Http(base) => NotifierTarget::Http(base.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreTarget,
    pub notifier: NotifierTarget,
    pub engine: EngineConfig,
    pub preferences_path: PathBuf,
}

impl AppConfig {
    pub fn new(store: &str, notifier: Option<&str>) -> Self {
        let store = StoreTarget::parse(store);
        let notifier = match notifier {
            Some(raw) => NotifierTarget::parse(raw),
            None => NotifierTarget::default_for(&store),
        };
        Self {
            store,
            notifier,
            engine: EngineConfig::default(),
            preferences_path: PathBuf::from(PREFERENCES_FILENAME),
        }
    }

    pub fn with_preferences_dir(mut self, dir: &Path) -> Self {
        self.preferences_path = dir.join(PREFERENCES_FILENAME);
        self
    }

    pub fn record_store(&self) -> Result<Arc<dyn RecordStore>, WageError> {
        Ok(match &self.store {
            StoreTarget::File(path) => Arc::new(FileRecordStore::new(path)),
            StoreTarget::Http(base) => Arc::new(HttpRecordStore::new(base, &self.engine.store)?),
        })
    }

    pub fn change_notifier(&self) -> Result<Arc<dyn ChangeNotifier>, WageError> {
        Ok(match &self.notifier {
            NotifierTarget::Memory => Arc::new(MemoryNotifier::new()),
            NotifierTarget::SignalFile(path) => Arc::new(SignalFileNotifier::new(path)),
            NotifierTarget::Http(base) => Arc::new(HttpNotifier::new(base, &self.engine.store)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_select_http_targets() {
        let config = AppConfig::new("http://localhost:8080/board", None);
        assert_eq!(
            config.store,
            StoreTarget::Http("http://localhost:8080/board".to_string())
        );
        assert_eq!(
            config.notifier,
            NotifierTarget::Http("http://localhost:8080/board".to_string())
        );
    }

    #[test]
    fn file_store_signals_beside_data_file() {
        let config = AppConfig::new("data/wages.json", None);
        assert_eq!(config.store, StoreTarget::File(PathBuf::from("data/wages.json")));
        assert_eq!(
            config.notifier,
            NotifierTarget::SignalFile(PathBuf::from("data/wage-data-update.json"))
        );
    }

    #[test]
    fn notifier_can_be_overridden() {
        let config = AppConfig::new("wages.json", Some("none"));
        assert_eq!(config.notifier, NotifierTarget::Memory);
    }
}
