use serde::{Deserialize, Serialize};

use crate::{RegionStatistics, RequestId, Sector, TrancheStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectorFilter {
    #[default]
    All,
    Agriculture,
    NonAgriculture,
}

impl SectorFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            SectorFilter::All => "all",
            SectorFilter::Agriculture => "agriculture",
            SectorFilter::NonAgriculture => "non-agriculture",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(SectorFilter::All),
            "agriculture" => Some(SectorFilter::Agriculture),
            "non-agriculture" => Some(SectorFilter::NonAgriculture),
            _ => None,
        }
    }

    pub fn includes(self, sector: Sector) -> bool {
        match self {
            SectorFilter::All => true,
            SectorFilter::Agriculture => sector == Sector::Agriculture,
            SectorFilter::NonAgriculture => sector == Sector::NonAgriculture,
        }
    }

    /// Sectors shown under this filter, in display order.
    pub fn sectors(self) -> Vec<Sector> {
        Sector::ALL
            .into_iter()
            .filter(|sector| self.includes(*sector))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    RegionAsc,
    RegionDesc,
    WageHigh,
    WageLow,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::RegionAsc => "region-asc",
            SortKey::RegionDesc => "region-desc",
            SortKey::WageHigh => "wage-high",
            SortKey::WageLow => "wage-low",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "region-asc" => Some(SortKey::RegionAsc),
            "region-desc" => Some(SortKey::RegionDesc),
            "wage-high" => Some(SortKey::WageHigh),
            "wage-low" => Some(SortKey::WageLow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "grid" => Some(ViewMode::Grid),
            "list" => Some(ViewMode::List),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }
}

/// Viewer controls. Projection is a pure function of regions and this state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub sector_filter: SectorFilter,
    #[serde(default)]
    pub sort_key: SortKey,
    #[serde(default)]
    pub view_mode: ViewMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrancheSlot {
    Current,
    Upcoming,
}

/// One rate block on a region card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateSection {
    pub sector: Sector,
    pub slot: TrancheSlot,
    pub title: String,
    pub amount: String,
    pub details: Option<String>,
    pub effective: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCard {
    pub region_id: String,
    pub name: String,
    pub sections: Vec<RateSection>,
    pub wage_order: String,
    pub effective: String,
    pub status_label: &'static str,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Amount,
    Effective,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGroup {
    pub sector: Sector,
    pub span: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    pub sector: Sector,
    pub status: TrancheStatus,
    pub kind: ColumnKind,
    pub header: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCell {
    Amount { display: String, coverage: Option<String> },
    Date(String),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub region_id: String,
    pub name: String,
    pub wage_order: String,
    /// Always the same length as [`RateTable::columns`].
    pub cells: Vec<TableCell>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    pub groups: Vec<ColumnGroup>,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionsView {
    Empty { message: String },
    Grid(Vec<RegionCard>),
    List(RateTable),
}

impl Default for RegionsView {
    fn default() -> Self {
        RegionsView::Empty {
            message: String::new(),
        }
    }
}

/// Row of the editor's region list and of the import preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRow {
    pub index: usize,
    pub region_id: String,
    pub name: String,
    pub wage_order: String,
    pub effective: String,
    pub non_agriculture: String,
    pub agriculture: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Info,
    Success,
    Error,
}

/// Dismissible message; `retry` marks failures a reload may fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
    pub retry: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub regions: RegionsView,
    pub statistics: RegionStatistics,
    pub last_updated: Option<String>,
    pub view: ViewState,
    pub notifications_enabled: bool,
    pub loading: Option<RequestId>,
    pub saving: bool,
    pub banner: Option<Banner>,
    pub admin_rows: Vec<AdminRow>,
    pub import_preview: Option<Vec<AdminRow>>,
    pub dirty: bool,
}
