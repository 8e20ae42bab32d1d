//! Wage board core: data model, rate normalization, view projection and the
//! pure controller state machine.
mod aggregate;
mod draft;
mod effect;
mod error;
pub mod format;
mod model;
mod msg;
mod normalize;
mod notice;
mod project;
mod state;
mod update;
mod view_model;

pub use aggregate::{
    max_wage, min_wage, rate_amounts, statistics, union_tranche_statuses, RegionStatistics,
};
pub use draft::{FormField, FormSchema, RateDraft, RateMode, RegionDraft, TrancheDraft};
pub use effect::Effect;
pub use error::WageError;
pub use model::{Document, Rate, RateSchedule, Region, Sector, Tranche, TrancheStatus};
pub use msg::Msg;
pub use normalize::{current_tranche, display_amount, normalize, tranche_with_status, NormalizedRate};
pub use notice::{Preferences, UpdateEvent, WAGE_UPDATE_KIND, WAGE_UPDATE_MESSAGE};
pub use project::{
    admin_rows, build_card, build_table, current_amount_and_coverage, filter_regions,
    matches_search, matches_sector, project, searchable_text, sort_regions, NO_MATCH_MESSAGE,
};
pub use state::{AppState, RequestId, SaveKind, NOT_LOADED_MESSAGE};
pub use update::update;
pub use view_model::{
    AdminRow, AppViewModel, Banner, BannerLevel, ColumnGroup, ColumnKind, RateSection, RateTable,
    RegionCard, RegionsView, SectorFilter, SortKey, TableCell, TableColumn, TableRow, TrancheSlot,
    ViewMode, ViewState,
};
