//! Import/export codecs for the wage document.
//!
//! JSON is lossless. CSV keeps only the current amount and coverage per
//! sector. The spreadsheet layout keeps at most two tranches per sector.
mod delimited;
mod json;
mod sheet;

use std::path::Path;

use wages_core::{Document, WageError};

pub use self::delimited::{decode_csv, encode_csv, CSV_HEADER};
pub use self::json::{decode_document, decode_value, encode_document};
pub use self::sheet::{decode_sheet, encode_sheet, serial_to_date, sheet_template, SHEET_HEADER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
    Xlsx,
}

impl FileFormat {
    pub const ALL: [FileFormat; 3] = [FileFormat::Json, FileFormat::Csv, FileFormat::Xlsx];

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "csv" => Some(FileFormat::Csv),
            "xlsx" | "xls" => Some(FileFormat::Xlsx),
            _ => None,
        }
    }

    /// Format implied by a file's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }
}

pub fn decode(format: FileFormat, bytes: &[u8]) -> Result<Document, WageError> {
    match format {
        FileFormat::Json => {
            let raw = std::str::from_utf8(bytes)
                .map_err(|err| WageError::format(format!("file is not UTF-8: {err}")))?;
            decode_document(raw)
        }
        FileFormat::Csv => decode_csv(bytes),
        FileFormat::Xlsx => decode_sheet(bytes),
    }
}

/// Encodes `document`; `exported_at` is shown on the spreadsheet's
/// instruction sheet.
pub fn encode(
    format: FileFormat,
    document: &Document,
    exported_at: &str,
) -> Result<Vec<u8>, WageError> {
    match format {
        FileFormat::Json => encode_document(document).map(String::into_bytes),
        FileFormat::Csv => encode_csv(document),
        FileFormat::Xlsx => encode_sheet(document, exported_at),
    }
}

/// Blank import template. JSON has none.
pub fn template(format: FileFormat) -> Result<Vec<u8>, WageError> {
    match format {
        FileFormat::Json => Err(WageError::format("templates exist for csv and xlsx only")),
        FileFormat::Csv => Ok(delimited::csv_template()),
        FileFormat::Xlsx => sheet_template(),
    }
}
