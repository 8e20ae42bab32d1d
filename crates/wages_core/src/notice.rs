use serde::{Deserialize, Serialize};

use crate::{ViewState, WageError};

pub const WAGE_UPDATE_KIND: &str = "wage-update";
pub const WAGE_UPDATE_MESSAGE: &str = "Minimum wage rates have been updated";

/// Change announcement published after every successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    pub last_updated: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl UpdateEvent {
    pub fn wage_update(last_updated: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            last_updated: last_updated.into(),
            timestamp: timestamp.into(),
            kind: WAGE_UPDATE_KIND.to_string(),
            message: WAGE_UPDATE_MESSAGE.to_string(),
        }
    }

    pub fn is_wage_update(&self) -> bool {
        self.kind == WAGE_UPDATE_KIND
    }

    /// A usable event names the wage-update kind and carries both dates.
    pub fn validate(&self) -> Result<(), WageError> {
        if !self.is_wage_update() {
            return Err(WageError::format(format!(
                "unexpected update event type `{}`",
                self.kind
            )));
        }
        if self.timestamp.trim().is_empty() {
            return Err(WageError::format("update event has an empty timestamp"));
        }
        if self.last_updated.trim().is_empty() {
            return Err(WageError::format("update event has an empty lastUpdated"));
        }
        Ok(())
    }
}

/// Viewer settings kept between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "enabled")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub last_seen_update: Option<String>,
    #[serde(default)]
    pub view: ViewState,
}

fn enabled() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            last_seen_update: None,
            view: ViewState::default(),
        }
    }
}
