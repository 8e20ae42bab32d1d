use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, SecondsFormat, Utc};
use wages_core::{Document, RequestId, UpdateEvent, WageError};

use crate::store::transport_error;

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl StoreSettings {
    pub(crate) fn build_client(&self) -> Result<reqwest::Client, WageError> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .map_err(transport_error)
    }
}

/// Source of the dates stamped on saved documents and published events.
#[derive(Clone)]
pub struct Clock {
    today: Arc<dyn Fn() -> String + Send + Sync>,
    timestamp: Arc<dyn Fn() -> String + Send + Sync>,
}

impl Clock {
    /// Local calendar date and UTC RFC 3339 timestamps.
    pub fn system() -> Self {
        Self {
            today: Arc::new(|| Local::now().format("%Y-%m-%d").to_string()),
            timestamp: Arc::new(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    pub fn fixed(today: impl Into<String>, timestamp: impl Into<String>) -> Self {
        let today = today.into();
        let timestamp = timestamp.into();
        Self {
            today: Arc::new(move || today.clone()),
            timestamp: Arc::new(move || timestamp.clone()),
        }
    }

    /// `YYYY-MM-DD`.
    pub fn today(&self) -> String {
        (self.today)()
    }

    pub fn timestamp(&self) -> String {
        (self.timestamp)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("today", &self.today())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub store: StoreSettings,
    /// How often the change notifier is polled while watching.
    pub poll_interval: Duration,
    pub clock: Clock,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store: StoreSettings::default(),
            poll_interval: Duration::from_secs(2),
            clock: Clock::system(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    DocumentLoaded {
        request_id: RequestId,
        result: Result<Document, WageError>,
    },
    /// Carries the event that was published for the save.
    DocumentSaved {
        request_id: RequestId,
        result: Result<UpdateEvent, WageError>,
    },
    UpdateObserved(UpdateEvent),
}
