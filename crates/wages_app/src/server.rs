//! Thin HTTP front for a file-backed record store.
//!
//! `GET/POST /api/wages` read and replace the whole document; failures are
//! reported as `{"error": ...}` bodies. `GET/POST /api/updates` hold the most
//! recent change event for polling viewers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use wages_core::WageError;
use wages_engine::codec::decode_value;
use wages_engine::{parse_update_event, Clock, FileRecordStore, MemoryNotifier, RecordStore};
use wages_logging::{wages_info, wages_warn};

const INVALID_INPUT: &str = "Invalid JSON input";
const CANNOT_SAVE: &str = "Cannot save data file";
const DATA_UPDATED: &str = "Data updated";

#[derive(Clone)]
pub struct ServerState {
    store: Arc<FileRecordStore>,
    updates: Arc<MemoryNotifier>,
    clock: Clock,
}

impl ServerState {
    pub fn new(store: FileRecordStore, clock: Clock) -> Self {
        Self {
            store: Arc::new(store),
            updates: Arc::new(MemoryNotifier::new()),
            clock,
        }
    }
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Store read failures keep the store's own wording.
impl From<WageError> for ApiError {
    fn from(err: WageError) -> Self {
        match err {
            WageError::NotFound(message) => ApiError::new(StatusCode::NOT_FOUND, message),
            WageError::Format(message) | WageError::Transport(message) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            WageError::Validation(message) => ApiError::new(StatusCode::BAD_REQUEST, message),
        }
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/wages", get(read_wages).post(replace_wages))
        .route("/api/updates", get(latest_update).post(publish_update))
        .with_state(state)
}

async fn read_wages(State(state): State<ServerState>) -> Result<Response, ApiError> {
    let document = state.store.read().await?;
    Ok(Json(document).into_response())
}

async fn replace_wages(
    State(state): State<ServerState>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let value: Value = serde_json::from_str(&body)
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, INVALID_INPUT))?;
    let mut document =
        decode_value(value).map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, err.to_string()))?;
    if document.last_updated.trim().is_empty() {
        document.last_updated = state.clock.today();
    }

    state.store.replace(&document).await.map_err(|err| {
        wages_warn!("Replacing wage data failed: {}", err);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, CANNOT_SAVE)
    })?;
    wages_info!(
        "Stored {} regions (last updated {})",
        document.regions.len(),
        document.last_updated
    );
    Ok(Json(json!({ "success": true, "message": DATA_UPDATED })))
}

async fn latest_update(State(state): State<ServerState>) -> Json<Value> {
    Json(json!(state.updates.snapshot()))
}

async fn publish_update(
    State(state): State<ServerState>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let event = parse_update_event(&body)
        .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, err.to_string()))?;
    wages_info!("Update event {} received", event.timestamp);
    state.updates.store(event);
    Ok(Json(json!({ "success": true })))
}

/// Serves until ctrl-c.
pub async fn serve(addr: SocketAddr, state: ServerState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    wages_info!("Serving wage data on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    wages_info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        wages_warn!("Cannot listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
}
