use std::sync::{mpsc, Arc};
use std::thread;

use wages_core::{Document, RequestId, UpdateEvent, WageError};
use wages_logging::{wages_error, wages_info, wages_warn};

use crate::notify::ChangeNotifier;
use crate::store::RecordStore;
use crate::types::{Clock, EngineEvent};

enum EngineCommand {
    Load { request_id: RequestId },
    Save { request_id: RequestId, document: Document },
    PollUpdates,
}

/// Runs store and notifier IO on a background runtime; results come back
/// as [`EngineEvent`]s through [`EngineHandle::try_recv`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

struct Backend {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn ChangeNotifier>,
    clock: Clock,
}

impl EngineHandle {
    pub fn new(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn ChangeNotifier>,
        clock: Clock,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let backend = Arc::new(Backend {
            store,
            notifier,
            clock,
        });

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    wages_error!("Cannot start engine runtime: {}", err);
                    fail_commands(cmd_rx, event_tx, &err.to_string());
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let backend = backend.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(&backend, command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn load(&self, request_id: RequestId) {
        let _ = self.cmd_tx.send(EngineCommand::Load { request_id });
    }

    pub fn save(&self, request_id: RequestId, document: Document) {
        let _ = self.cmd_tx.send(EngineCommand::Save {
            request_id,
            document,
        });
    }

    /// Asks the notifier for its latest event; reported as `UpdateObserved`.
    pub fn poll_updates(&self) {
        let _ = self.cmd_tx.send(EngineCommand::PollUpdates);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn fail_commands(
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    reason: &str,
) {
    while let Ok(command) = cmd_rx.recv() {
        let error = WageError::transport(format!("engine unavailable: {reason}"));
        let event = match command {
            EngineCommand::Load { request_id } => EngineEvent::DocumentLoaded {
                request_id,
                result: Err(error),
            },
            EngineCommand::Save { request_id, .. } => EngineEvent::DocumentSaved {
                request_id,
                result: Err(error),
            },
            EngineCommand::PollUpdates => continue,
        };
        let _ = event_tx.send(event);
    }
}

async fn handle_command(
    backend: &Backend,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Load { request_id } => {
            let result = backend.store.read().await;
            match &result {
                Ok(document) => wages_info!(
                    "Loaded {} regions (request {})",
                    document.regions.len(),
                    request_id
                ),
                Err(err) => wages_warn!("Load {} failed: {}", request_id, err),
            }
            EngineEvent::DocumentLoaded { request_id, result }
        }
        EngineCommand::Save {
            request_id,
            document,
        } => {
            let result = save_document(backend, document).await;
            if let Err(err) = &result {
                wages_warn!("Save {} failed: {}", request_id, err);
            }
            EngineEvent::DocumentSaved { request_id, result }
        }
        EngineCommand::PollUpdates => match backend.notifier.latest().await {
            Ok(Some(event)) => EngineEvent::UpdateObserved(event),
            Ok(None) => return,
            Err(err) => {
                wages_warn!("Polling for updates failed: {}", err);
                return;
            }
        },
    };
    let _ = event_tx.send(event);
}

/// Stamps `last_updated`, replaces the stored document and announces the
/// change. A failed announcement does not fail the save.
async fn save_document(backend: &Backend, mut document: Document) -> Result<UpdateEvent, WageError> {
    document.validate()?;
    document.last_updated = backend.clock.today();
    backend.store.replace(&document).await?;

    let event = UpdateEvent::wage_update(document.last_updated.clone(), backend.clock.timestamp());
    if let Err(err) = backend.notifier.publish(&event).await {
        wages_warn!("Publishing update {} failed: {}", event.timestamp, err);
    }
    wages_info!(
        "Saved {} regions, last updated {}",
        document.regions.len(),
        document.last_updated
    );
    Ok(event)
}
