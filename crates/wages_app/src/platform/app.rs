use std::time::{Duration, Instant};

use wages_core::{update, AppState, AppViewModel, Msg};
use wages_engine::EngineHandle;

use super::effects::EffectRunner;
use super::persistence::load_preferences;
use crate::config::AppConfig;

/// How long a command waits for outstanding loads and saves.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the controller state and feeds it messages, one at a time.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
}

impl Session {
    pub fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
        }
    }

    /// Builds the engine from `config`, restores preferences and issues the
    /// first load.
    pub fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let engine = EngineHandle::new(
            config.record_store()?,
            config.change_notifier()?,
            config.engine.clock.clone(),
        );
        let mut session = Self::new(EffectRunner::new(engine, config.preferences_path.clone()));
        if let Some(preferences) = load_preferences(&config.preferences_path) {
            session.dispatch(Msg::PreferencesRestored(preferences));
        }
        session.dispatch(Msg::Started);
        Ok(session)
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    /// View to draw when something changed since the last call.
    pub fn take_render(&mut self) -> Option<AppViewModel> {
        if self.state.consume_dirty() {
            Some(self.state.view())
        } else {
            None
        }
    }

    pub fn take_notifications(&mut self) -> Vec<String> {
        self.runner.take_notifications()
    }

    fn busy(&self) -> bool {
        self.state.is_loading() || self.state.is_saving()
    }

    /// Applies engine results until no load or save is outstanding.
    /// Returns `false` on timeout.
    pub fn settle(&mut self) -> bool {
        self.settle_within(SETTLE_TIMEOUT)
    }

    pub fn settle_within(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.runner.next_msg(remaining) {
                Some(msg) => self.dispatch(msg),
                None => return false,
            }
        }
        true
    }

    /// One watch cycle: asks the notifier for news, then applies whatever
    /// the engine reports within `wait`.
    pub fn poll_once(&mut self, wait: Duration) {
        self.runner.poll_updates();
        let deadline = Instant::now() + wait;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.runner.next_msg(remaining) {
                Some(msg) => self.dispatch(msg),
                None => break,
            }
        }
        while let Some(msg) = self.runner.try_next_msg() {
            self.dispatch(msg);
        }
    }
}
