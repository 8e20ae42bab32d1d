use crate::format::format_date_long;
use crate::project::{admin_rows, project};
use crate::view_model::{AppViewModel, Banner, BannerLevel};
use crate::{statistics, Document, Preferences, RegionsView, UpdateEvent, ViewState, WageError};

pub type RequestId = u64;

pub const NOT_LOADED_MESSAGE: &str = "Wage data has not been loaded yet.";

/// Which editor action a pending save belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Import,
    Upsert,
    Delete,
}

impl SaveKind {
    fn success_message(self) -> &'static str {
        match self {
            SaveKind::Import => "Data imported successfully",
            SaveKind::Upsert => "Region saved successfully",
            SaveKind::Delete => "Region deleted successfully",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingSave {
    pub(crate) request_id: RequestId,
    pub(crate) kind: SaveKind,
    /// Document as it was before the mutation; restored when the save fails.
    pub(crate) backup: Option<Document>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    document: Option<Document>,
    view: ViewState,
    notifications_enabled: bool,
    last_seen_update: Option<String>,
    next_request_id: RequestId,
    pending_load: Option<RequestId>,
    pending_save: Option<PendingSave>,
    import_preview: Option<Document>,
    banner: Option<Banner>,
    started: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            document: None,
            view: ViewState::default(),
            notifications_enabled: true,
            last_seen_update: None,
            next_request_id: 1,
            pending_load: None,
            pending_save: None,
            import_preview: None,
            banner: None,
            started: false,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let regions = match &self.document {
            Some(document) => project(&document.regions, &self.view),
            None => RegionsView::Empty {
                message: NOT_LOADED_MESSAGE.to_string(),
            },
        };
        AppViewModel {
            regions,
            statistics: self
                .document
                .as_ref()
                .map(|document| statistics(&document.regions))
                .unwrap_or_default(),
            last_updated: self
                .document
                .as_ref()
                .filter(|document| !document.last_updated.is_empty())
                .map(|document| format_date_long(&document.last_updated)),
            view: self.view.clone(),
            notifications_enabled: self.notifications_enabled,
            loading: self.pending_load,
            saving: self.pending_save.is_some(),
            banner: self.banner.clone(),
            admin_rows: self.document.as_ref().map(admin_rows).unwrap_or_default(),
            import_preview: self.import_preview.as_ref().map(admin_rows),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn import_preview(&self) -> Option<&Document> {
        self.import_preview.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            notifications_enabled: self.notifications_enabled,
            last_seen_update: self.last_seen_update.clone(),
            view: self.view.clone(),
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.started, true)
    }

    pub(crate) fn view_mut(&mut self) -> &mut ViewState {
        self.dirty = true;
        &mut self.view
    }

    pub(crate) fn apply_preferences(&mut self, preferences: Preferences) {
        self.notifications_enabled = preferences.notifications_enabled;
        self.last_seen_update = preferences.last_seen_update;
        self.view = preferences.view;
        self.dirty = true;
    }

    pub(crate) fn toggle_notifications(&mut self) {
        self.notifications_enabled = !self.notifications_enabled;
        self.dirty = true;
    }

    pub(crate) fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }

    pub(crate) fn last_seen_update(&self) -> Option<&str> {
        self.last_seen_update.as_deref()
    }

    pub(crate) fn set_last_seen_update(&mut self, timestamp: String) {
        self.last_seen_update = Some(timestamp);
    }

    fn next_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Issues a new load; any earlier load still in flight becomes stale.
    pub(crate) fn begin_load(&mut self) -> RequestId {
        let id = self.next_request_id();
        self.pending_load = Some(id);
        self.dirty = true;
        id
    }

    /// Applies a load result when it answers the most recent request.
    pub(crate) fn finish_load(
        &mut self,
        request_id: RequestId,
        result: Result<Document, WageError>,
    ) -> bool {
        if self.pending_load != Some(request_id) {
            return false;
        }
        self.pending_load = None;
        match result {
            Ok(document) => {
                self.document = Some(document);
                if self.banner.as_ref().is_some_and(|banner| banner.retry) {
                    self.banner = None;
                }
            }
            Err(err) => {
                self.banner = Some(Banner {
                    level: BannerLevel::Error,
                    message: format!("Failed to load wage data: {err}"),
                    retry: true,
                });
            }
        }
        self.dirty = true;
        true
    }

    /// Replaces the document and records a backup of the previous one.
    /// A load still in flight predates the edit and becomes stale.
    pub(crate) fn begin_save(&mut self, document: Document, kind: SaveKind) -> RequestId {
        let request_id = self.next_request_id();
        self.pending_load = None;
        let backup = self.document.replace(document);
        self.pending_save = Some(PendingSave {
            request_id,
            kind,
            backup,
        });
        self.dirty = true;
        request_id
    }

    pub(crate) fn finish_save(
        &mut self,
        request_id: RequestId,
        result: Result<UpdateEvent, WageError>,
    ) -> bool {
        let Some(pending) = self
            .pending_save
            .take_if(|pending| pending.request_id == request_id)
        else {
            return false;
        };
        match result {
            Ok(event) => {
                if let Some(document) = self.document.as_mut() {
                    document.last_updated = event.last_updated;
                }
                self.last_seen_update = Some(event.timestamp);
                if pending.kind == SaveKind::Import {
                    self.import_preview = None;
                }
                self.banner = Some(Banner {
                    level: BannerLevel::Success,
                    message: pending.kind.success_message().to_string(),
                    retry: false,
                });
            }
            Err(err) => {
                self.document = pending.backup;
                self.banner = Some(Banner {
                    level: BannerLevel::Error,
                    message: format!("Failed to save wage data: {err}"),
                    retry: false,
                });
            }
        }
        self.dirty = true;
        true
    }

    pub(crate) fn set_import_preview(&mut self, preview: Option<Document>) {
        self.import_preview = preview;
        self.dirty = true;
    }

    pub(crate) fn take_import_preview(&mut self) -> Option<Document> {
        self.dirty = true;
        self.import_preview.take()
    }

    pub(crate) fn show_banner(&mut self, level: BannerLevel, message: impl Into<String>) {
        self.banner = Some(Banner {
            level,
            message: message.into(),
            retry: false,
        });
        self.dirty = true;
    }

    pub(crate) fn dismiss_banner(&mut self) {
        if self.banner.take().is_some() {
            self.dirty = true;
        }
    }
}
