use crate::state::SaveKind;
use crate::view_model::BannerLevel;
use crate::{AppState, Document, Effect, Msg, RegionDraft, UpdateEvent, WageError};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => {
            if state.start() {
                vec![load(&mut state)]
            } else {
                Vec::new()
            }
        }
        Msg::RetryClicked => {
            state.dismiss_banner();
            vec![load(&mut state)]
        }
        Msg::DocumentLoaded { request_id, result } => {
            // Stale responses are dropped by `finish_load`.
            state.finish_load(request_id, result);
            Vec::new()
        }
        Msg::SearchChanged(term) => {
            state.view_mut().search_term = term;
            Vec::new()
        }
        Msg::SectorFilterChanged(filter) => {
            state.view_mut().sector_filter = filter;
            vec![persist(&state)]
        }
        Msg::SortChanged(key) => {
            state.view_mut().sort_key = key;
            vec![persist(&state)]
        }
        Msg::ViewToggled => {
            let view = state.view_mut();
            view.view_mode = view.view_mode.toggled();
            vec![persist(&state)]
        }
        Msg::NotificationsToggled => {
            state.toggle_notifications();
            vec![persist(&state)]
        }
        Msg::PreferencesRestored(preferences) => {
            state.apply_preferences(preferences);
            Vec::new()
        }
        Msg::UpdateReceived(event) => apply_update_event(&mut state, event),
        Msg::ImportParsed(Ok(document)) => match document.validate() {
            Ok(()) => {
                let count = document.regions.len();
                state.set_import_preview(Some(document));
                state.show_banner(
                    BannerLevel::Info,
                    format!("Ready to import {count} regions"),
                );
                Vec::new()
            }
            Err(err) => {
                reject_import(&mut state, err);
                Vec::new()
            }
        },
        Msg::ImportParsed(Err(err)) => {
            reject_import(&mut state, err);
            Vec::new()
        }
        Msg::ImportConfirmed => {
            if state.is_saving() {
                save_in_progress(&mut state)
            } else {
                match state.take_import_preview() {
                    Some(document) => vec![save(&mut state, document, SaveKind::Import)],
                    None => Vec::new(),
                }
            }
        }
        Msg::ImportCancelled => {
            state.set_import_preview(None);
            Vec::new()
        }
        Msg::RegionSubmitted { index, draft } => {
            if state.is_saving() {
                save_in_progress(&mut state)
            } else {
                match upserted(&state, index, draft) {
                    Ok(document) => vec![save(&mut state, document, SaveKind::Upsert)],
                    Err(err) => {
                        state.show_banner(BannerLevel::Error, err.to_string());
                        Vec::new()
                    }
                }
            }
        }
        Msg::RegionDeleted { index } => {
            if state.is_saving() {
                save_in_progress(&mut state)
            } else {
                match deleted(&state, index) {
                    Ok(document) => vec![save(&mut state, document, SaveKind::Delete)],
                    Err(err) => {
                        state.show_banner(BannerLevel::Error, err.to_string());
                        Vec::new()
                    }
                }
            }
        }
        Msg::SaveCompleted { request_id, result } => {
            if state.finish_save(request_id, result) {
                vec![persist(&state)]
            } else {
                Vec::new()
            }
        }
        Msg::BannerDismissed => {
            state.dismiss_banner();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn load(state: &mut AppState) -> Effect {
    Effect::LoadDocument {
        request_id: state.begin_load(),
    }
}

fn save(state: &mut AppState, document: Document, kind: SaveKind) -> Effect {
    let request_id = state.begin_save(document.clone(), kind);
    Effect::SaveDocument {
        request_id,
        document,
    }
}

fn persist(state: &AppState) -> Effect {
    Effect::PersistPreferences(state.preferences())
}

fn save_in_progress(state: &mut AppState) -> Vec<Effect> {
    state.show_banner(BannerLevel::Error, "A save is already in progress");
    Vec::new()
}

fn reject_import(state: &mut AppState, err: WageError) {
    state.set_import_preview(None);
    state.show_banner(BannerLevel::Error, format!("Import failed: {err}"));
}

/// Duplicate timestamps are ignored. The first event seen with no recorded
/// timestamp only reloads; later ones also notify when enabled.
fn apply_update_event(state: &mut AppState, event: UpdateEvent) -> Vec<Effect> {
    if event.validate().is_err() {
        return Vec::new();
    }
    let first_seen = match state.last_seen_update() {
        Some(seen) if seen == event.timestamp => return Vec::new(),
        Some(_) => false,
        None => true,
    };

    state.set_last_seen_update(event.timestamp);
    state.mark_dirty();

    let mut effects = Vec::with_capacity(3);
    if !first_seen && state.notifications_enabled() {
        effects.push(Effect::ShowNotification {
            last_updated: event.last_updated,
        });
    }
    effects.push(load(state));
    effects.push(persist(state));
    effects
}

fn loaded_document(state: &AppState) -> Result<&Document, WageError> {
    state
        .document()
        .ok_or_else(|| WageError::NotFound("wage data has not been loaded".to_string()))
}

/// Document with `draft` inserted (`index == None`) or replacing `index`.
fn upserted(
    state: &AppState,
    index: Option<usize>,
    draft: RegionDraft,
) -> Result<Document, WageError> {
    let mut document = loaded_document(state)?.clone();
    let region = draft.into_region()?;

    let clash = document
        .regions
        .iter()
        .enumerate()
        .any(|(position, existing)| Some(position) != index && existing.id == region.id);
    if clash {
        return Err(WageError::validation(format!(
            "region id `{}` already exists",
            region.id
        )));
    }

    match index {
        Some(position) => {
            let slot = document.regions.get_mut(position).ok_or_else(|| {
                WageError::NotFound(format!("no region at position {position}"))
            })?;
            *slot = region;
        }
        None => document.regions.push(region),
    }
    Ok(document)
}

fn deleted(state: &AppState, index: usize) -> Result<Document, WageError> {
    let mut document = loaded_document(state)?.clone();
    if index >= document.regions.len() {
        return Err(WageError::NotFound(format!("no region at position {index}")));
    }
    document.regions.remove(index);
    Ok(document)
}
