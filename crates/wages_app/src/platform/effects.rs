use std::path::PathBuf;
use std::time::Duration;

use wages_core::{Effect, Msg};
use wages_engine::{EngineEvent, EngineHandle};
use wages_logging::{wages_debug, wages_info};

use super::persistence::save_preferences;

/// Executes effects emitted by `update` and turns engine events back into
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
    preferences_path: PathBuf,
    notifications: Vec<String>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, preferences_path: PathBuf) -> Self {
        Self {
            engine,
            preferences_path,
            notifications: Vec::new(),
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadDocument { request_id } => {
                    wages_debug!("LoadDocument request_id={}", request_id);
                    self.engine.load(request_id);
                }
                Effect::SaveDocument {
                    request_id,
                    document,
                } => {
                    wages_info!(
                        "SaveDocument request_id={} regions={}",
                        request_id,
                        document.regions.len()
                    );
                    self.engine.save(request_id, document);
                }
                Effect::ShowNotification { last_updated } => {
                    wages_info!("Showing update notification for {}", last_updated);
                    self.notifications.push(last_updated);
                }
                Effect::PersistPreferences(preferences) => {
                    save_preferences(&self.preferences_path, &preferences);
                }
            }
        }
    }

    /// `lastUpdated` values of notifications raised since the last call.
    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    pub fn poll_updates(&self) {
        self.engine.poll_updates();
    }

    /// Waits up to `timeout` for the next engine result.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }

    pub fn try_next_msg(&self) -> Option<Msg> {
        self.engine.try_recv().map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::DocumentLoaded { request_id, result } => {
            Msg::DocumentLoaded { request_id, result }
        }
        EngineEvent::DocumentSaved { request_id, result } => {
            Msg::SaveCompleted { request_id, result }
        }
        EngineEvent::UpdateObserved(event) => Msg::UpdateReceived(event),
    }
}
