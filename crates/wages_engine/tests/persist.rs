use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wages_core::{Document, Rate, Region, Sector};
use wages_engine::codec::decode;
use wages_engine::{
    ensure_output_dir, export_filename, template_filename, write_atomic, write_export,
    write_template, AtomicFileWriter, FileFormat,
};

fn document() -> Document {
    Document::new(vec![Region {
        id: "region7".to_string(),
        name: "Central Visayas".to_string(),
        wage_order: "ROVII-24".to_string(),
        date_effective: "2024-10-09".to_string(),
        rates: vec![Rate::single(Sector::NonAgriculture, 501.0, "All workers")],
        notes: String::new(),
    }])
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("wages.json", b"hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "wages.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = write_atomic(&first, b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("wages.json", b"data").is_err());
    assert!(!file_path.with_file_name("wages.json").exists());
}

#[test]
fn export_names_carry_date_and_extension() {
    assert_eq!(
        export_filename(FileFormat::Json, "2024-06-05"),
        "wage-rates-2024-06-05.json"
    );
    assert_eq!(
        export_filename(FileFormat::Xlsx, "2024-06-05"),
        "wage-rates-2024-06-05.xlsx"
    );
    assert_eq!(template_filename(FileFormat::Csv), "wage-rates-template.csv");
}

#[test]
fn exports_decode_back_to_the_same_regions() {
    let temp = TempDir::new().unwrap();
    for format in FileFormat::ALL {
        let path = write_export(
            temp.path(),
            &document(),
            format,
            "2024-06-05",
            "2024-06-05T10:00:00Z",
        )
        .unwrap();
        assert_eq!(path, temp.path().join(export_filename(format, "2024-06-05")));

        let decoded = decode(format, &fs::read(&path).unwrap()).unwrap();
        assert_eq!(decoded.regions, document().regions, "{format:?}");
    }
}

#[test]
fn templates_are_written_for_tabular_formats() {
    let temp = TempDir::new().unwrap();
    let csv = write_template(temp.path(), FileFormat::Csv).unwrap();
    assert!(fs::read_to_string(csv).unwrap().starts_with("Region ID,Region Name"));

    let xlsx = write_template(temp.path(), FileFormat::Xlsx).unwrap();
    assert_eq!(xlsx.file_name().unwrap(), "wage-rates-template.xlsx");
    assert!(write_template(temp.path(), FileFormat::Json).is_err());
}
