use csv::{QuoteStyle, ReaderBuilder, Terminator, Trim, WriterBuilder};
use wages_core::format::plain_amount;
use wages_core::{current_amount_and_coverage, Document, Rate, Region, Sector, WageError};

pub const CSV_HEADER: [&str; 9] = [
    "Region ID",
    "Region Name",
    "Wage Order",
    "Date Effective",
    "Non-Agriculture Rate",
    "Non-Agriculture Coverage",
    "Agriculture Rate",
    "Agriculture Coverage",
    "Notes",
];

fn header_line() -> String {
    let mut line = CSV_HEADER.join(",");
    line.push('\n');
    line
}

fn csv_error(err: impl std::fmt::Display) -> WageError {
    WageError::format(format!("csv: {err}"))
}

/// Header row only.
pub(crate) fn csv_template() -> Vec<u8> {
    header_line().into_bytes()
}

/// One row per region with the current amount and coverage of each sector.
/// The header is written bare; every data field is quoted.
pub fn encode_csv(document: &Document) -> Result<Vec<u8>, WageError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(header_line().into_bytes());

    for region in &document.regions {
        let (non_agri_amount, non_agri_coverage) =
            current_amount_and_coverage(region, Sector::NonAgriculture);
        let (agri_amount, agri_coverage) = current_amount_and_coverage(region, Sector::Agriculture);
        let non_agri_amount = plain_amount(non_agri_amount);
        let agri_amount = plain_amount(agri_amount);

        writer
            .write_record([
                region.id.as_str(),
                region.name.as_str(),
                region.wage_order.as_str(),
                region.date_effective.as_str(),
                non_agri_amount.as_str(),
                non_agri_coverage.as_str(),
                agri_amount.as_str(),
                agri_coverage.as_str(),
                region.notes.as_str(),
            ])
            .map_err(csv_error)?;
    }

    writer.into_inner().map_err(csv_error)
}

/// Splits on every comma (quoted commas are not supported), strips quotes,
/// and skips rows with fewer than nine fields.
pub fn decode_csv(bytes: &[u8]) -> Result<Document, WageError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let mut regions = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.len() < CSV_HEADER.len() {
            continue;
        }
        let field = |index: usize| {
            record
                .get(index)
                .unwrap_or_default()
                .replace('"', "")
                .trim()
                .to_string()
        };

        let mut rates = vec![Rate::single(
            Sector::NonAgriculture,
            parse_amount(&field(4)),
            field(5),
        )];
        let agri_amount = parse_amount(&field(6));
        if agri_amount > 0.0 {
            rates.push(Rate::single(Sector::Agriculture, agri_amount, field(7)));
        }

        regions.push(Region {
            id: field(0),
            name: field(1),
            wage_order: field(2),
            date_effective: field(3),
            rates,
            notes: field(8),
        });
    }

    Ok(Document::new(regions))
}

fn parse_amount(raw: &str) -> f64 {
    raw.parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}
