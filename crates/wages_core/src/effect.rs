use crate::{Document, Preferences, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadDocument { request_id: RequestId },
    /// Replace the stored document; the runner stamps `lastUpdated`.
    SaveDocument {
        request_id: RequestId,
        document: Document,
    },
    ShowNotification { last_updated: String },
    PersistPreferences(Preferences),
}
