use std::sync::Once;

use pretty_assertions::assert_eq;
use wages_core::{
    filter_regions, matches_search, matches_sector, project, statistics, ColumnKind, Rate,
    RateSection, Region, RegionsView, Sector, SectorFilter, SortKey, TableCell, Tranche,
    TrancheSlot, TrancheStatus, ViewMode, ViewState, NO_MATCH_MESSAGE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(wages_logging::initialize_for_tests);
}

fn regions() -> Vec<Region> {
    vec![
        Region {
            id: "ncr".to_string(),
            name: "National Capital Region".to_string(),
            wage_order: "NCR-25".to_string(),
            date_effective: "2024-07-17".to_string(),
            rates: vec![
                Rate::with_tranches(
                    Sector::NonAgriculture,
                    vec![
                        Tranche::new(
                            610.0,
                            "2024-07-17",
                            "Non-agriculture workers",
                            TrancheStatus::Current,
                        ),
                        Tranche::new(645.0, "2025-07-18", "", TrancheStatus::Upcoming),
                    ],
                ),
                Rate::single(Sector::Agriculture, 573.0, "Agriculture workers"),
            ],
            notes: String::new(),
        },
        Region {
            id: "region1".to_string(),
            name: "Ilocos Region".to_string(),
            wage_order: "RB1-22".to_string(),
            date_effective: "2024-01-01".to_string(),
            rates: vec![Rate::single(
                Sector::NonAgriculture,
                468.0,
                "Non-agriculture establishments",
            )],
            notes: "Applies to all provinces".to_string(),
        },
        Region {
            id: "car".to_string(),
            name: "Cordillera Administrative Region".to_string(),
            wage_order: "CAR-24".to_string(),
            date_effective: "2024-12-02".to_string(),
            rates: vec![
                Rate::single(Sector::NonAgriculture, 470.0, "All establishments"),
                Rate::single(Sector::Agriculture, 0.0, ""),
            ],
            notes: String::new(),
        },
    ]
}

fn view(search: &str, filter: SectorFilter, sort: SortKey, mode: ViewMode) -> ViewState {
    ViewState {
        search_term: search.to_string(),
        sector_filter: filter,
        sort_key: sort,
        view_mode: mode,
    }
}

fn ids(regions: &[&Region]) -> Vec<String> {
    regions.iter().map(|region| region.id.clone()).collect()
}

fn card_ids(view: &RegionsView) -> Vec<String> {
    match view {
        RegionsView::Grid(cards) => cards.iter().map(|card| card.region_id.clone()).collect(),
        other => panic!("expected grid, got {other:?}"),
    }
}

#[test]
fn search_matches_id_and_wage_order() {
    init_logging();
    let all = regions();
    let state = view("NCR", SectorFilter::All, SortKey::RegionAsc, ViewMode::Grid);

    assert_eq!(ids(&filter_regions(&all, &state)), vec!["ncr"]);
}

#[test]
fn search_matches_rate_type_labels() {
    init_logging();
    let all = regions();
    let state = view("agri", SectorFilter::All, SortKey::RegionAsc, ViewMode::Grid);

    assert_eq!(filter_regions(&all, &state).len(), 3);
}

#[test]
fn search_covers_notes_amounts_and_statuses() {
    init_logging();
    let all = regions();
    assert!(matches_search(&all[1], "all provinces"));
    assert!(matches_search(&all[0], "645"));
    assert!(matches_search(&all[0], "upcoming"));
    assert!(matches_search(&all[0], "  "));
    assert!(!matches_search(&all[1], "upcoming"));
}

#[test]
fn sector_and_search_filters_commute() {
    init_logging();
    let all = regions();
    let state = view("region", SectorFilter::Agriculture, SortKey::RegionAsc, ViewMode::Grid);

    let search_first: Vec<&Region> = all
        .iter()
        .filter(|region| matches_search(region, &state.search_term))
        .filter(|region| matches_sector(region, state.sector_filter))
        .collect();
    assert_eq!(ids(&filter_regions(&all, &state)), ids(&search_first));
    assert_eq!(ids(&search_first), vec!["ncr", "car"]);
}

#[test]
fn sorts_by_name_and_wage() {
    init_logging();
    let mut all = regions();
    all.push(Region {
        id: "barmm".to_string(),
        name: "Bangsamoro".to_string(),
        wage_order: "BARMM-01".to_string(),
        date_effective: "2024-01-01".to_string(),
        rates: Vec::new(),
        notes: String::new(),
    });

    let by = |sort| card_ids(&project(&all, &view("", SectorFilter::All, sort, ViewMode::Grid)));

    assert_eq!(by(SortKey::RegionAsc), vec!["barmm", "car", "region1", "ncr"]);
    assert_eq!(by(SortKey::RegionDesc), vec!["ncr", "region1", "car", "barmm"]);
    assert_eq!(by(SortKey::WageHigh), vec!["ncr", "car", "region1", "barmm"]);
    assert_eq!(by(SortKey::WageLow), vec!["car", "region1", "ncr", "barmm"]);
}

#[test]
fn empty_result_projects_no_regions_view() {
    init_logging();
    let state = view("zzz", SectorFilter::All, SortKey::RegionAsc, ViewMode::List);

    assert_eq!(
        project(&regions(), &state),
        RegionsView::Empty {
            message: NO_MATCH_MESSAGE.to_string()
        }
    );
}

#[test]
fn grid_card_shows_upcoming_tranche() {
    init_logging();
    let state = view("ncr", SectorFilter::All, SortKey::RegionAsc, ViewMode::Grid);
    let RegionsView::Grid(cards) = project(&regions(), &state) else {
        panic!("expected grid view");
    };
    let card = &cards[0];

    assert_eq!(card.status_label, "Multi-tranche");
    assert_eq!(card.effective, "Jul 17, 2024");
    assert_eq!(
        card.sections,
        vec![
            RateSection {
                sector: Sector::NonAgriculture,
                slot: TrancheSlot::Current,
                title: "Non-Agriculture".to_string(),
                amount: "₱610".to_string(),
                details: Some("Non-agriculture workers (Next: 2025-07-18)".to_string()),
                effective: None,
            },
            RateSection {
                sector: Sector::NonAgriculture,
                slot: TrancheSlot::Upcoming,
                title: "Non-Agriculture (2nd Tranche)".to_string(),
                amount: "₱645".to_string(),
                details: Some("Upcoming Rate".to_string()),
                effective: Some("Date Effective: Jul 18, 2025".to_string()),
            },
            RateSection {
                sector: Sector::Agriculture,
                slot: TrancheSlot::Current,
                title: "Agriculture".to_string(),
                amount: "₱573".to_string(),
                details: Some("Agriculture workers".to_string()),
                effective: None,
            },
        ]
    );
}

#[test]
fn grid_card_hides_zero_agriculture_rate() {
    init_logging();
    let state = view("car", SectorFilter::All, SortKey::RegionAsc, ViewMode::Grid);
    let RegionsView::Grid(cards) = project(&regions(), &state) else {
        panic!("expected grid view");
    };

    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].status_label, "Single rate");
    assert_eq!(cards[0].sections.len(), 1);
    assert_eq!(cards[0].sections[0].sector, Sector::NonAgriculture);
}

#[test]
fn list_view_keeps_columns_aligned() {
    init_logging();
    let state = view("", SectorFilter::All, SortKey::RegionAsc, ViewMode::List);
    let RegionsView::List(table) = project(&regions(), &state) else {
        panic!("expected list view");
    };

    let headers: Vec<&str> = table.columns.iter().map(|c| c.header.as_str()).collect();
    assert_eq!(
        headers,
        vec![
            "Current (Tranche 1)",
            "Effective",
            "Upcoming (Tranche 2)",
            "Effective",
            "Current (Tranche 1)",
            "Effective",
            "Upcoming (Tranche 2)",
            "Effective",
        ]
    );
    assert_eq!(table.groups.iter().map(|g| g.span).sum::<usize>(), 8);
    assert_eq!(table.columns[1].kind, ColumnKind::Effective);
    for row in &table.rows {
        assert_eq!(row.cells.len(), table.columns.len(), "row {}", row.region_id);
    }

    let rows: Vec<&str> = table.rows.iter().map(|r| r.region_id.as_str()).collect();
    assert_eq!(rows, vec!["CAR", "REGION1", "NCR"]);

    let ilocos = &table.rows[1];
    assert_eq!(
        ilocos.cells[0],
        TableCell::Amount {
            display: "₱468/day".to_string(),
            coverage: Some("Non-agriculture establishments".to_string()),
        }
    );
    assert_eq!(ilocos.cells[1], TableCell::Date("Jan 1, 2024".to_string()));
    assert!(ilocos.cells[2..]
        .iter()
        .all(|cell| *cell == TableCell::Placeholder));

    let car = &table.rows[0];
    assert_eq!(car.cells[4], TableCell::Placeholder);

    let ncr = &table.rows[2];
    assert_eq!(ncr.cells[3], TableCell::Date("Jul 18, 2025".to_string()));
    assert_eq!(ncr.cells[5], TableCell::Date("Jul 17, 2024".to_string()));
}

#[test]
fn list_view_limits_columns_to_filtered_sector() {
    init_logging();
    let state = view("", SectorFilter::Agriculture, SortKey::RegionAsc, ViewMode::List);
    let RegionsView::List(table) = project(&regions(), &state) else {
        panic!("expected list view");
    };

    assert_eq!(table.groups.len(), 1);
    assert_eq!(table.groups[0].sector, Sector::Agriculture);
    assert_eq!(table.columns.len(), 2);
    assert_eq!(table.rows.len(), 2);
}

#[test]
fn projection_is_deterministic() {
    init_logging();
    let state = view("", SectorFilter::All, SortKey::WageHigh, ViewMode::List);
    assert_eq!(project(&regions(), &state), project(&regions(), &state));
}

#[test]
fn statistics_average_current_non_agriculture() {
    init_logging();
    let stats = statistics(&regions());
    assert_eq!(stats.total_regions, 3);
    assert_eq!(stats.average_wage, 516);
    assert_eq!(statistics(&[]).average_wage, 0);
}
