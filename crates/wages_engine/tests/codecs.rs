use std::sync::Once;

use pretty_assertions::assert_eq;
use wages_core::{Document, Rate, RateSchedule, Region, Sector, Tranche, TrancheStatus, WageError};
use wages_engine::codec::{
    decode, decode_csv, decode_document, decode_sheet, encode, encode_csv, encode_sheet,
    serial_to_date, sheet_template, template, CSV_HEADER,
};
use wages_engine::FileFormat;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(wages_logging::initialize_for_tests);
}

fn document() -> Document {
    let mut document = Document::new(vec![
        Region {
            id: "ncr".to_string(),
            name: "National Capital Region".to_string(),
            wage_order: "NCR-25".to_string(),
            date_effective: "2024-07-17".to_string(),
            rates: vec![
                Rate::with_tranches(
                    Sector::NonAgriculture,
                    vec![
                        Tranche::new(610.0, "2024-07-17", "All workers", TrancheStatus::Current),
                        Tranche::new(645.0, "2025-07-18", "All workers", TrancheStatus::Upcoming),
                    ],
                ),
                Rate::single(Sector::Agriculture, 573.0, "Agriculture workers"),
            ],
            notes: "Metro Manila".to_string(),
        },
        Region {
            id: "region1".to_string(),
            name: "Ilocos Region".to_string(),
            wage_order: "RB1-22".to_string(),
            date_effective: "2024-01-01".to_string(),
            rates: vec![Rate::single(Sector::NonAgriculture, 468.5, "All workers")],
            notes: String::new(),
        },
    ]);
    document.last_updated = "2024-06-05".to_string();
    document
}

#[test]
fn csv_row_becomes_two_single_rates() {
    init_logging();
    let raw = format!(
        "{}\n\"region1\",\"Sample\",\"RB-02\",\"2024-02-01\",\"450\",\"All workers\",\"400\",\"Agri workers\",\"note\"\n",
        CSV_HEADER.join(",")
    );

    let document = decode_csv(raw.as_bytes()).unwrap();

    assert_eq!(document.regions.len(), 1);
    let region = &document.regions[0];
    assert_eq!(region.id, "region1");
    assert_eq!(region.name, "Sample");
    assert_eq!(region.wage_order, "RB-02");
    assert_eq!(region.date_effective, "2024-02-01");
    assert_eq!(region.notes, "note");
    assert_eq!(
        region.rates,
        vec![
            Rate::single(Sector::NonAgriculture, 450.0, "All workers"),
            Rate::single(Sector::Agriculture, 400.0, "Agri workers"),
        ]
    );
}

#[test]
fn csv_skips_short_rows_and_zero_agriculture() {
    init_logging();
    let raw = format!(
        "{}\nshort,row\nr2,Two,WO,2024-01-01,abc,Everyone,0,,\n",
        CSV_HEADER.join(",")
    );

    let document = decode_csv(raw.as_bytes()).unwrap();

    assert_eq!(document.regions.len(), 1);
    assert_eq!(
        document.regions[0].rates,
        vec![Rate::single(Sector::NonAgriculture, 0.0, "Everyone")]
    );
}

#[test]
fn csv_export_quotes_fields_and_uses_current_tranche() {
    init_logging();
    let bytes = encode_csv(&document()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(
        lines[1],
        "\"ncr\",\"National Capital Region\",\"NCR-25\",\"2024-07-17\",\"610\",\"All workers\",\"573\",\"Agriculture workers\",\"Metro Manila\""
    );
    assert_eq!(
        lines[2],
        "\"region1\",\"Ilocos Region\",\"RB1-22\",\"2024-01-01\",\"468.5\",\"All workers\",\"0\",\"\",\"\""
    );
}

#[test]
fn csv_template_is_the_header_line() {
    let bytes = template(FileFormat::Csv).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), format!("{}\n", CSV_HEADER.join(",")));
}

#[test]
fn json_template_is_not_offered() {
    assert!(matches!(template(FileFormat::Json), Err(WageError::Format(_))));
}

#[test]
fn json_requires_regions_array() {
    let err = decode_document(r#"{"regions": {"id": "ncr"}}"#).unwrap_err();
    assert_eq!(err, WageError::format("`regions` must be an array"));

    let err = decode_document("not json").unwrap_err();
    assert!(matches!(err, WageError::Format(_)));
}

#[test]
fn json_rejects_unknown_rate_type() {
    let raw = r#"{"regions":[{"id":"ncr","name":"NCR","rates":[{"type":"Fishery","amount":1}]}]}"#;
    assert!(matches!(decode_document(raw), Err(WageError::Validation(_))));
}

#[test]
fn json_round_trip_is_lossless() {
    let original = document();
    let bytes = encode(FileFormat::Json, &original, "ignored").unwrap();
    assert_eq!(decode(FileFormat::Json, &bytes).unwrap(), original);
}

#[test]
fn serial_dates_are_read_in_utc() {
    assert_eq!(serial_to_date(45292.0).as_deref(), Some("2024-01-01"));
    assert_eq!(serial_to_date(25569.0).as_deref(), Some("1970-01-01"));
    assert_eq!(serial_to_date(f64::NAN), None);
}

#[test]
fn spreadsheet_keeps_two_tranches_and_single_rates() {
    init_logging();
    let original = document();
    let bytes = encode_sheet(&original, "2024-06-05T10:00:00Z").unwrap();

    let decoded = decode_sheet(&bytes).unwrap();

    assert_eq!(decoded.regions.len(), 2);
    let ncr = &decoded.regions[0];
    assert_eq!(ncr.id, "ncr");
    assert_eq!(ncr.notes, "Metro Manila");
    assert_eq!(ncr.rates, original.regions[0].rates);
    let region1 = &decoded.regions[1];
    assert_eq!(region1.rates, original.regions[1].rates);
    assert_eq!(region1.notes, "");
}

#[test]
fn spreadsheet_template_decodes_to_sample_regions() {
    init_logging();
    let bytes = sheet_template().unwrap();
    let decoded = decode_sheet(&bytes).unwrap();

    let ids: Vec<&str> = decoded.regions.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["ncr", "region1"]);

    let ncr = &decoded.regions[0];
    match &ncr.rate(Sector::NonAgriculture).unwrap().schedule {
        RateSchedule::Tranches(tranches) => {
            let amounts: Vec<f64> = tranches.iter().map(|t| t.amount).collect();
            assert_eq!(amounts, vec![570.0, 600.0]);
            assert_eq!(tranches[1].status, TrancheStatus::Upcoming);
        }
        other => panic!("expected tranches, got {other:?}"),
    }
    assert_eq!(
        decoded.regions[1].rates,
        vec![
            Rate::single(Sector::NonAgriculture, 450.0, "All workers"),
            Rate::single(Sector::Agriculture, 400.0, "Agricultural workers"),
        ]
    );
    decoded.validate().unwrap();
}

#[test]
fn spreadsheet_without_rows_is_rejected() {
    let empty = Document::default();
    let bytes = encode_sheet(&empty, "now").unwrap();
    let err = decode_sheet(&bytes).unwrap_err();
    assert_eq!(
        err,
        WageError::format("spreadsheet must have at least a header row and one data row")
    );
}

#[test]
fn formats_follow_file_extensions() {
    assert_eq!(FileFormat::from_path("rates.XLS".as_ref()), Some(FileFormat::Xlsx));
    assert_eq!(FileFormat::from_path("rates.csv".as_ref()), Some(FileFormat::Csv));
    assert_eq!(FileFormat::from_path("rates.txt".as_ref()), None);
}
