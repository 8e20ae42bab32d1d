use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use url::Url;
use wages_core::{Document, WageError};
use wages_logging::{wages_debug, wages_warn};

use crate::codec::{decode_document, decode_value, encode_document};
use crate::persist::write_atomic;
use crate::types::StoreSettings;

pub const DATA_NOT_FOUND: &str = "Data file not found";
pub const CANNOT_READ: &str = "Cannot read data file";
pub const INVALID_JSON: &str = "Invalid JSON in data file";
pub const CANNOT_WRITE: &str = "Cannot write data file";

/// Whole-document read/replace. No partial updates, no locking: the last
/// writer wins.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn read(&self) -> Result<Document, WageError>;
    async fn replace(&self, document: &Document) -> Result<(), WageError>;
}

/// Document kept as pretty-printed JSON in a local file.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_blocking(&self) -> Result<Document, WageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(WageError::NotFound(DATA_NOT_FOUND.to_string()));
            }
            Err(err) => {
                wages_warn!("Reading {} failed: {}", self.path.display(), err);
                return Err(WageError::transport(CANNOT_READ));
            }
        };
        decode_document(&raw).map_err(|err| match err {
            WageError::Format(reason) => WageError::format(format!("{INVALID_JSON}: {reason}")),
            other => other,
        })
    }

    pub fn replace_blocking(&self, document: &Document) -> Result<(), WageError> {
        let encoded = encode_document(document)?;
        write_atomic(&self.path, encoded.as_bytes()).map_err(|err| {
            wages_warn!("Writing {} failed: {}", self.path.display(), err);
            WageError::transport(CANNOT_WRITE)
        })?;
        wages_debug!(
            "Stored {} regions in {}",
            document.regions.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for FileRecordStore {
    async fn read(&self) -> Result<Document, WageError> {
        self.read_blocking()
    }

    async fn replace(&self, document: &Document) -> Result<(), WageError> {
        self.replace_blocking(document)
    }
}

/// Record store behind the `/api/wages` endpoint.
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpRecordStore {
    pub fn new(base_url: &str, settings: &StoreSettings) -> Result<Self, WageError> {
        let endpoint = endpoint(base_url, "api/wages")?;
        let client = settings.build_client()?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Joins `path` onto `base_url`, treating the base as a directory.
pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<Url, WageError> {
    let mut base = Url::parse(base_url)
        .map_err(|err| WageError::transport(format!("invalid store url `{base_url}`: {err}")))?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
        .map_err(|err| WageError::transport(format!("invalid store url `{base_url}`: {err}")))
}

pub(crate) fn transport_error(err: reqwest::Error) -> WageError {
    if err.is_timeout() {
        return WageError::transport(format!("request timed out: {err}"));
    }
    WageError::transport(err.to_string())
}

/// A response carrying an `error` field is a failure whatever its status.
pub(crate) fn response_error(status: reqwest::StatusCode, body: &Value) -> Option<WageError> {
    if let Some(message) = body.get("error") {
        let message = message
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| message.to_string());
        return Some(if status == reqwest::StatusCode::NOT_FOUND {
            WageError::NotFound(message)
        } else {
            WageError::transport(message)
        });
    }
    if !status.is_success() {
        return Some(WageError::transport(format!("HTTP {status}")));
    }
    None
}

async fn json_body(response: reqwest::Response) -> Result<(reqwest::StatusCode, Value), WageError> {
    let status = response.status();
    let text = response.text().await.map_err(transport_error)?;
    let body = serde_json::from_str(&text).unwrap_or(Value::Null);
    Ok((status, body))
}

#[async_trait::async_trait]
impl RecordStore for HttpRecordStore {
    async fn read(&self) -> Result<Document, WageError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(transport_error)?;
        let (status, body) = json_body(response).await?;
        if let Some(err) = response_error(status, &body) {
            return Err(err);
        }
        decode_value(body)
    }

    async fn replace(&self, document: &Document) -> Result<(), WageError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(document)
            .send()
            .await
            .map_err(transport_error)?;
        let (status, body) = json_body(response).await?;
        match response_error(status, &body) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
