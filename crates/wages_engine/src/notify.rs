use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;
use url::Url;
use wages_core::{UpdateEvent, WageError};
use wages_logging::wages_debug;

use crate::persist::write_atomic;
use crate::store::{endpoint, response_error, transport_error};
use crate::types::StoreSettings;

/// Name of the signal file written next to the data file.
pub const SIGNAL_FILE_NAME: &str = "wage-data-update.json";

/// Decodes and validates an update event payload.
pub fn parse_update_event(raw: &str) -> Result<UpdateEvent, WageError> {
    let event: UpdateEvent = serde_json::from_str(raw)
        .map_err(|err| WageError::format(format!("invalid update event: {err}")))?;
    event.validate()?;
    Ok(event)
}

/// Delivers "data changed" announcements. Delivery is at-least-once;
/// receivers dedupe on the event timestamp.
#[async_trait::async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn publish(&self, event: &UpdateEvent) -> Result<(), WageError>;
    /// Most recent event, if any was published.
    async fn latest(&self) -> Result<Option<UpdateEvent>, WageError>;
}

/// In-process notifier; backs the server's `/api/updates` channel.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    latest: Mutex<Option<UpdateEvent>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<UpdateEvent> {
        match self.latest.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn store(&self, event: UpdateEvent) {
        match self.latest.lock() {
            Ok(mut guard) => *guard = Some(event),
            Err(poisoned) => *poisoned.into_inner() = Some(event),
        }
    }
}

#[async_trait::async_trait]
impl ChangeNotifier for MemoryNotifier {
    async fn publish(&self, event: &UpdateEvent) -> Result<(), WageError> {
        event.validate()?;
        self.store(event.clone());
        Ok(())
    }

    async fn latest(&self) -> Result<Option<UpdateEvent>, WageError> {
        Ok(self.snapshot())
    }
}

/// Writes the latest event to a small JSON file that other viewers poll.
#[derive(Debug, Clone)]
pub struct SignalFileNotifier {
    path: PathBuf,
}

impl SignalFileNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Signal file stored beside `data_file`.
    pub fn beside(data_file: &std::path::Path) -> Self {
        let path = match data_file.parent() {
            Some(parent) => parent.join(SIGNAL_FILE_NAME),
            None => PathBuf::from(SIGNAL_FILE_NAME),
        };
        Self::new(path)
    }
}

#[async_trait::async_trait]
impl ChangeNotifier for SignalFileNotifier {
    async fn publish(&self, event: &UpdateEvent) -> Result<(), WageError> {
        let encoded = serde_json::to_vec(event)
            .map_err(|err| WageError::format(format!("cannot encode update event: {err}")))?;
        write_atomic(&self.path, &encoded)?;
        wages_debug!("Signalled update {} via {}", event.timestamp, self.path.display());
        Ok(())
    }

    async fn latest(&self) -> Result<Option<UpdateEvent>, WageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => parse_update_event(&raw).map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(WageError::transport(err.to_string())),
        }
    }
}

/// Notifier behind the `/api/updates` endpoint.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpNotifier {
    pub fn new(base_url: &str, settings: &StoreSettings) -> Result<Self, WageError> {
        Ok(Self {
            endpoint: endpoint(base_url, "api/updates")?,
            client: settings.build_client()?,
        })
    }
}

#[async_trait::async_trait]
impl ChangeNotifier for HttpNotifier {
    async fn publish(&self, event: &UpdateEvent) -> Result<(), WageError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(event)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        match response_error(status, &body) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn latest(&self) -> Result<Option<UpdateEvent>, WageError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|err| WageError::format(format!("invalid update event: {err}")))?;
        if let Some(err) = response_error(status, &body) {
            return Err(err);
        }
        if body.is_null() {
            return Ok(None);
        }
        let event: UpdateEvent = serde_json::from_value(body)
            .map_err(|err| WageError::format(format!("invalid update event: {err}")))?;
        event.validate()?;
        Ok(Some(event))
    }
}
