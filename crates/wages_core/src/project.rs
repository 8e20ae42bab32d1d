//! View projector: filter, search, sort and shape regions for display.
//!
//! The pipeline order is fixed: sector filter, search filter, sort, then
//! projection into grid cards or one consolidated table.

use std::cmp::Ordering;

use crate::aggregate::{max_wage, min_wage, union_tranche_statuses};
use crate::format::{format_currency, format_date_short, plain_amount};
use crate::normalize::{current_tranche, display_amount, normalize, tranche_with_status};
use crate::{
    AdminRow, ColumnGroup, ColumnKind, Document, RateSchedule, RateSection, RateTable, Region,
    RegionCard, RegionsView, Sector, SectorFilter, SortKey, TableCell, TableColumn, TableRow,
    TrancheSlot, TrancheStatus, ViewMode, ViewState,
};

pub const NO_MATCH_MESSAGE: &str = "No regions found matching your search. Try a different term.";

/// A region passes when any of its rates belongs to the filtered sector.
pub fn matches_sector(region: &Region, filter: SectorFilter) -> bool {
    match filter {
        SectorFilter::All => true,
        _ => region.rates.iter().any(|rate| filter.includes(rate.sector)),
    }
}

/// Lower-cased blob of every searchable attribute of a region.
pub fn searchable_text(region: &Region) -> String {
    let mut parts: Vec<String> = vec![
        region.name.clone(),
        region.id.clone(),
        region.wage_order.clone(),
        region.date_effective.clone(),
        region.notes.clone(),
    ];
    for rate in &region.rates {
        parts.push(rate.sector.label().to_string());
        match &rate.schedule {
            RateSchedule::Single { amount, coverage } => {
                parts.push(coverage.clone());
                parts.push(plain_amount(*amount));
            }
            RateSchedule::Tranches(tranches) => {
                for tranche in tranches {
                    parts.push(plain_amount(tranche.amount));
                    parts.push(tranche.coverage.clone());
                    parts.push(tranche.effective_date.clone());
                    parts.push(tranche.status.as_str().to_string());
                }
            }
        }
    }
    parts.retain(|part| !part.is_empty());
    parts.join(" ").to_lowercase()
}

/// Case-insensitive substring match; a blank term matches everything.
pub fn matches_search(region: &Region, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    needle.is_empty() || searchable_text(region).contains(&needle)
}

pub fn filter_regions<'a>(regions: &'a [Region], state: &ViewState) -> Vec<&'a Region> {
    regions
        .iter()
        .filter(|region| matches_sector(region, state.sector_filter))
        .filter(|region| matches_search(region, &state.search_term))
        .collect()
}

fn compare_names(a: &Region, b: &Region) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Regions without any rate sort last under both wage orders.
fn compare_wages(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort; ties fall back to region id so output is deterministic.
pub fn sort_regions(regions: &mut [&Region], key: SortKey) {
    regions.sort_by(|a, b| {
        let primary = match key {
            SortKey::RegionAsc => compare_names(a, b),
            SortKey::RegionDesc => compare_names(b, a),
            SortKey::WageHigh => compare_wages(max_wage(a), max_wage(b), true),
            SortKey::WageLow => compare_wages(min_wage(a), min_wage(b), false),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    });
}

pub fn project(regions: &[Region], state: &ViewState) -> RegionsView {
    let mut visible = filter_regions(regions, state);
    if visible.is_empty() {
        return RegionsView::Empty {
            message: NO_MATCH_MESSAGE.to_string(),
        };
    }
    sort_regions(&mut visible, state.sort_key);

    match state.view_mode {
        ViewMode::Grid => RegionsView::Grid(
            visible
                .iter()
                .map(|region| build_card(region, state.sector_filter))
                .collect(),
        ),
        ViewMode::List => RegionsView::List(build_table(&visible, state.sector_filter)),
    }
}

pub fn build_card(region: &Region, filter: SectorFilter) -> RegionCard {
    let mut sections = Vec::new();
    let mut multi_tranche = false;

    for sector in Sector::ALL {
        let Some(rate) = region.rate(sector) else {
            continue;
        };
        let normalized = normalize(rate, &region.date_effective);
        multi_tranche |= normalized.has_upcoming();
        if !filter.includes(sector) {
            continue;
        }

        let hide_current = sector == Sector::Agriculture && normalized.current_amount == 0.0;
        if !hide_current {
            let mut details = normalized.current_coverage.clone();
            if let Some(date) = &normalized.upcoming_effective_date {
                details.push_str(&format!(" (Next: {date})"));
            }
            sections.push(RateSection {
                sector,
                slot: TrancheSlot::Current,
                title: sector.label().to_string(),
                amount: format_currency(normalized.current_amount),
                details: non_empty(details.trim().to_string()),
                effective: None,
            });
        }

        if let Some(amount) = normalized.upcoming_amount {
            sections.push(RateSection {
                sector,
                slot: TrancheSlot::Upcoming,
                title: format!("{} (2nd Tranche)", sector.label()),
                amount: format_currency(amount),
                details: Some("Upcoming Rate".to_string()),
                effective: normalized
                    .upcoming_effective_date
                    .as_deref()
                    .filter(|date| !date.is_empty())
                    .map(|date| format!("Date Effective: {}", format_date_short(date))),
            });
        }
    }

    RegionCard {
        region_id: region.id.clone(),
        name: region.name.clone(),
        sections,
        wage_order: region.wage_order.clone(),
        effective: format_date_short(&region.date_effective),
        status_label: if multi_tranche {
            "Multi-tranche"
        } else {
            "Single rate"
        },
        notes: non_empty(region.notes.clone()),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn status_header(status: &TrancheStatus, position: usize) -> String {
    let (label, number) = match status {
        TrancheStatus::Current => ("Current".to_string(), 1),
        TrancheStatus::Upcoming => ("Upcoming".to_string(), 2),
        TrancheStatus::Other(raw) => {
            let mut chars = raw.chars();
            let label = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            (label, position + 1)
        }
    };
    format!("{label} (Tranche {number})")
}

/// Columns: for every displayed sector, an amount and an effective-date
/// column per tranche status present anywhere in `regions`.
pub fn build_table(regions: &[&Region], filter: SectorFilter) -> RateTable {
    let statuses = union_tranche_statuses(regions.iter().copied(), filter);
    let sectors = filter.sectors();

    let mut groups = Vec::new();
    let mut columns = Vec::new();
    for sector in &sectors {
        groups.push(ColumnGroup {
            sector: *sector,
            span: statuses.len() * 2,
        });
        for (position, status) in statuses.iter().enumerate() {
            columns.push(TableColumn {
                sector: *sector,
                status: status.clone(),
                kind: ColumnKind::Amount,
                header: status_header(status, position),
            });
            columns.push(TableColumn {
                sector: *sector,
                status: status.clone(),
                kind: ColumnKind::Effective,
                header: "Effective".to_string(),
            });
        }
    }

    let rows = regions
        .iter()
        .map(|region| {
            let mut cells = Vec::with_capacity(columns.len());
            for sector in &sectors {
                for status in &statuses {
                    cells.extend(status_cells(region, *sector, status));
                }
            }
            TableRow {
                region_id: region.id.to_uppercase(),
                name: region.name.clone(),
                wage_order: region.wage_order.clone(),
                cells,
                notes: non_empty(region.notes.clone()),
            }
        })
        .collect();

    RateTable {
        groups,
        columns,
        rows,
    }
}

/// Amount and date cell for one (sector, status) slot of a region.
fn status_cells(region: &Region, sector: Sector, status: &TrancheStatus) -> [TableCell; 2] {
    let placeholder = [TableCell::Placeholder, TableCell::Placeholder];
    let Some(rate) = region.rate(sector) else {
        return placeholder;
    };

    let entry = match &rate.schedule {
        RateSchedule::Single { amount, coverage } => (*status == TrancheStatus::Current)
            .then(|| (*amount, coverage.as_str(), region.date_effective.as_str())),
        RateSchedule::Tranches(tranches) => tranche_with_status(tranches, status)
            .map(|t| (t.amount, t.coverage.as_str(), t.effective_date.as_str())),
    };

    match entry {
        Some((amount, _, _)) if sector == Sector::Agriculture && amount == 0.0 => placeholder,
        Some((amount, coverage, date)) => [
            TableCell::Amount {
                display: format!("{}/day", format_currency(amount)),
                coverage: non_empty(coverage.to_string()),
            },
            TableCell::Date(format_date_short(date)),
        ],
        None => placeholder,
    }
}

/// Editor list rows, in document order.
pub fn admin_rows(document: &Document) -> Vec<AdminRow> {
    document
        .regions
        .iter()
        .enumerate()
        .map(|(index, region)| AdminRow {
            index,
            region_id: region.id.clone(),
            name: region.name.clone(),
            wage_order: region.wage_order.clone(),
            effective: format_date_short(&region.date_effective),
            non_agriculture: region
                .rate(Sector::NonAgriculture)
                .map(display_amount)
                .unwrap_or_else(|| "N/A".to_string()),
            agriculture: region
                .rate(Sector::Agriculture)
                .map(display_amount)
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect()
}

/// Current amount and coverage of a sector, as exported to flat formats.
pub fn current_amount_and_coverage(region: &Region, sector: Sector) -> (f64, String) {
    match region.rate(sector).map(|rate| &rate.schedule) {
        Some(RateSchedule::Single { amount, coverage }) => (*amount, coverage.clone()),
        Some(RateSchedule::Tranches(tranches)) => current_tranche(tranches)
            .map(|t| (t.amount, t.coverage.clone()))
            .unwrap_or((0.0, String::new())),
        None => (0.0, String::new()),
    }
}
