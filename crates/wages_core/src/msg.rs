use crate::{
    Document, Preferences, RegionDraft, RequestId, SectorFilter, SortKey, UpdateEvent, WageError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Viewer opened; issues the first load exactly once.
    Started,
    /// User asked to reload after a failure.
    RetryClicked,
    /// Record store answered a load request.
    DocumentLoaded {
        request_id: RequestId,
        result: Result<Document, WageError>,
    },
    SearchChanged(String),
    SectorFilterChanged(SectorFilter),
    SortChanged(SortKey),
    ViewToggled,
    NotificationsToggled,
    /// Settings restored from disk at startup.
    PreferencesRestored(Preferences),
    /// Change notifier delivered an event.
    UpdateReceived(UpdateEvent),
    /// An import file was decoded; shown as a preview until confirmed.
    ImportParsed(Result<Document, WageError>),
    ImportConfirmed,
    ImportCancelled,
    /// Editor form submitted. `index` is `None` for a new region.
    RegionSubmitted {
        index: Option<usize>,
        draft: RegionDraft,
    },
    RegionDeleted { index: usize },
    /// Record store answered a save; carries the published event on success.
    SaveCompleted {
        request_id: RequestId,
        result: Result<UpdateEvent, WageError>,
    },
    BannerDismissed,
    /// Render tick.
    Tick,
    NoOp,
}
