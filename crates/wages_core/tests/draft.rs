use pretty_assertions::assert_eq;
use wages_core::{
    FormField, FormSchema, RateDraft, RateMode, RateSchedule, RegionDraft, Sector, Tranche,
    TrancheDraft, TrancheStatus,
};

fn init_logging() {
    wages_logging::initialize_for_tests();
}

fn base_draft() -> RegionDraft {
    RegionDraft {
        id: " ncr ".to_string(),
        name: "National Capital Region".to_string(),
        wage_order: "NCR-25".to_string(),
        date_effective: "2024-07-17".to_string(),
        notes: String::new(),
        non_agriculture: RateDraft::single("610", "All"),
        agriculture: None,
    }
}

fn tranche(amount: &str, date: &str) -> TrancheDraft {
    TrancheDraft {
        amount: amount.to_string(),
        effective_date: date.to_string(),
        coverage: String::new(),
    }
}

#[test]
fn schema_follows_mode_switches() {
    init_logging();
    let mut draft = base_draft();
    let schema = FormSchema::for_draft(&draft);
    assert!(schema.is_required(FormField::Amount(Sector::NonAgriculture)));
    assert!(!schema.is_required(FormField::Amount(Sector::Agriculture)));
    assert_eq!(schema.required().len(), 5);

    draft.agriculture = Some(RateDraft::tranches(
        tranche("", ""),
        TrancheDraft::default(),
    ));
    let schema = FormSchema::for_draft(&draft);
    assert!(schema.is_required(FormField::Tranche1Amount(Sector::Agriculture)));
    assert!(schema.is_required(FormField::Tranche1Date(Sector::Agriculture)));
    assert_eq!(
        schema.missing(&draft),
        vec![
            FormField::Tranche1Amount(Sector::Agriculture),
            FormField::Tranche1Date(Sector::Agriculture),
        ]
    );
}

#[test]
fn missing_fields_are_reported_by_label() {
    init_logging();
    let mut draft = base_draft();
    draft.name = "  ".to_string();
    draft.non_agriculture.amount.clear();

    let err = draft.into_region().expect_err("missing fields");
    assert_eq!(
        err.to_string(),
        "validation error: missing required fields: Region Name, Non-Agriculture Rate"
    );
}

#[test]
fn tranche_mode_keeps_positive_amounts_only() {
    init_logging();
    let mut draft = base_draft();
    draft.non_agriculture =
        RateDraft::tranches(tranche("610", "2024-07-17"), tranche("0", "2025-07-18"));
    draft.agriculture = Some(RateDraft::tranches(
        tranche("573", "2024-07-17"),
        tranche("600.5", "2025-07-18"),
    ));

    let region = draft.into_region().expect("valid draft");
    assert_eq!(region.id, "ncr");
    assert_eq!(
        region.rates[0].tranches().map(|t| t.len()),
        Some(1)
    );
    assert_eq!(
        region.rates[1].tranches().expect("tranches")[1],
        Tranche::new(600.5, "2025-07-18", "", TrancheStatus::Upcoming)
    );
}

#[test]
fn non_numeric_amount_is_rejected() {
    init_logging();
    let mut draft = base_draft();
    draft.non_agriculture.amount = "six hundred".to_string();
    assert!(draft.into_region().is_err());
}

#[test]
fn draft_prefills_from_region() {
    init_logging();
    let mut source = base_draft();
    source.agriculture = Some(RateDraft::single("573", "Farms"));
    let region = source.into_region().expect("valid draft");

    let draft = RegionDraft::from_region(&region);
    assert_eq!(draft.id, "ncr");
    assert_eq!(draft.non_agriculture.mode, RateMode::Single);
    assert_eq!(draft.non_agriculture.amount, "610");
    assert_eq!(
        draft.agriculture.as_ref().map(|rate| rate.coverage.as_str()),
        Some("Farms")
    );

    let rebuilt = draft.into_region().expect("round trip");
    assert_eq!(rebuilt, region);
    assert!(matches!(
        rebuilt.rates[1].schedule,
        RateSchedule::Single { amount, .. } if amount == 573.0
    ));
}
