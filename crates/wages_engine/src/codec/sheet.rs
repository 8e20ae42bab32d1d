//! Spreadsheet layout: 21 columns per region, written with `rust_xlsxwriter`
//! and read back with `calamine`.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use chrono::DateTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use wages_core::format::plain_amount;
use wages_core::{
    current_amount_and_coverage, tranche_with_status, Document, Rate, Region, Sector, Tranche,
    TrancheStatus, WageError,
};

pub const SHEET_HEADER: [&str; 21] = [
    "Region ID",
    "Region Name",
    "Wage Order",
    "Date Effective",
    "Non-Agriculture Rate",
    "Non-Agriculture Coverage",
    "Non-Agriculture Tranche 1 Amount",
    "Non-Agriculture Tranche 1 Date",
    "Non-Agriculture Tranche 1 Coverage",
    "Non-Agriculture Tranche 2 Amount",
    "Non-Agriculture Tranche 2 Date",
    "Non-Agriculture Tranche 2 Coverage",
    "Agriculture Rate",
    "Agriculture Coverage",
    "Agriculture Tranche 1 Amount",
    "Agriculture Tranche 1 Date",
    "Agriculture Tranche 1 Coverage",
    "Agriculture Tranche 2 Amount",
    "Agriculture Tranche 2 Date",
    "Agriculture Tranche 2 Coverage",
    "Notes",
];

const COLUMN_WIDTHS: [u16; 21] = [
    12, 25, 15, 15, 18, 30, 20, 15, 25, 20, 15, 25, 18, 30, 20, 15, 25, 20, 15, 25, 40,
];

const NON_AGRICULTURE_START: u16 = 4;
const AGRICULTURE_START: u16 = 12;
const NOTES_COLUMN: u16 = 20;

/// Days between the spreadsheet epoch and the Unix epoch.
const UNIX_EPOCH_SERIAL: f64 = 25569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Converts a spreadsheet serial date to `YYYY-MM-DD`, evaluated in UTC.
pub fn serial_to_date(serial: f64) -> Option<String> {
    let millis = ((serial - UNIX_EPOCH_SERIAL) * MILLIS_PER_DAY).round();
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|date| date.format("%Y-%m-%d").to_string())
}

fn xlsx_error(err: XlsxError) -> WageError {
    WageError::format(format!("spreadsheet: {err}"))
}

/// Value written to one cell; `Blank` leaves the cell empty.
enum Out {
    Text(String),
    Number(f64),
    Blank,
}

fn text(value: &str) -> Out {
    if value.is_empty() {
        Out::Blank
    } else {
        Out::Text(value.to_string())
    }
}

fn positive(amount: f64) -> Out {
    if amount == 0.0 {
        Out::Blank
    } else {
        Out::Number(amount)
    }
}

fn write_row(sheet: &mut Worksheet, row: u32, cells: Vec<Out>) -> Result<(), XlsxError> {
    for (col, cell) in (0u16..).zip(cells) {
        match cell {
            Out::Text(value) => {
                sheet.write_string(row, col, value)?;
            }
            Out::Number(value) => {
                sheet.write_number(row, col, value)?;
            }
            Out::Blank => {}
        }
    }
    Ok(())
}

fn write_header(sheet: &mut Worksheet) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    for (col, title) in (0u16..).zip(SHEET_HEADER) {
        sheet.write_string_with_format(0, col, title, &bold)?;
        sheet.set_column_width(col, COLUMN_WIDTHS[usize::from(col)])?;
    }
    Ok(())
}

fn write_lines(
    sheet: &mut Worksheet,
    lines: Vec<Vec<Out>>,
    widths: [u16; 2],
) -> Result<(), XlsxError> {
    for (col, width) in (0u16..).zip(widths) {
        sheet.set_column_width(col, width)?;
    }
    for (row, cells) in (0u32..).zip(lines) {
        write_row(sheet, row, cells)?;
    }
    Ok(())
}

fn sector_cells(region: &Region, sector: Sector) -> Vec<Out> {
    let (amount, coverage) = current_amount_and_coverage(region, sector);
    let tranches = region.rate(sector).and_then(Rate::tranches).unwrap_or_default();

    let mut cells = vec![Out::Number(amount), text(&coverage)];
    for status in [TrancheStatus::Current, TrancheStatus::Upcoming] {
        match tranche_with_status(tranches, &status) {
            Some(tranche) => {
                cells.push(positive(tranche.amount));
                cells.push(text(&tranche.effective_date));
                cells.push(text(&tranche.coverage));
            }
            None => cells.extend([Out::Blank, Out::Blank, Out::Blank]),
        }
    }
    cells
}

fn region_cells(region: &Region) -> Vec<Out> {
    let mut cells = vec![
        text(&region.id),
        text(&region.name),
        text(&region.wage_order),
        text(&region.date_effective),
    ];
    cells.extend(sector_cells(region, Sector::NonAgriculture));
    cells.extend(sector_cells(region, Sector::Agriculture));
    cells.push(text(&region.notes));
    cells
}

fn line(values: &[&str]) -> Vec<Out> {
    values.iter().map(|value| text(value)).collect()
}

fn export_instructions(document: &Document, exported_at: &str) -> Vec<Vec<Out>> {
    let last_updated = if document.last_updated.is_empty() {
        "N/A"
    } else {
        document.last_updated.as_str()
    };
    vec![
        line(&["Wage Rates Data Export"]),
        Vec::new(),
        line(&["Export Information"]),
        line(&["Export Date:", exported_at]),
        vec![
            text("Total Regions:"),
            Out::Number(document.regions.len() as f64),
        ],
        line(&["Last Updated:", last_updated]),
        Vec::new(),
        line(&["Data Structure"]),
        line(&["Region ID: Unique identifier for the region"]),
        line(&["Region Name: Full name of the region"]),
        line(&["Wage Order: Official wage order number"]),
        line(&["Date Effective: Date when rates take effect"]),
        line(&["Non-Agriculture Rate: Daily wage for non-agricultural workers"]),
        line(&["Agriculture Rate: Daily wage for agricultural workers"]),
        line(&["Tranche 1: Current or first tranche"]),
        line(&["Tranche 2: Upcoming or second tranche (if applicable)"]),
        Vec::new(),
        line(&["Notes: Additional information about the region"]),
    ]
}

fn template_instructions() -> Vec<Vec<Out>> {
    [
        "Wage Rates Template Instructions",
        "",
        "How to Use This Template",
        "1. Fill in the \"Template\" sheet with your wage rate data",
        "2. Required fields: Region ID, Region Name, Wage Order, Date Effective",
        "3. At least Non-Agriculture Rate or Agriculture Rate is required",
        "4. Save the file and upload it using the Import function",
        "",
        "Field Descriptions",
        "Region ID: Unique identifier (e.g., ncr, region1, car)",
        "Region Name: Full name of the region",
        "Wage Order: Official wage order number (e.g., RB-01)",
        "Date Effective: Date when rates take effect (YYYY-MM-DD)",
        "",
        "Rate Information",
        "Non-Agriculture Rate: Daily wage for non-agricultural workers",
        "Agriculture Rate: Daily wage for agricultural workers",
        "",
        "Tranche Information (Optional)",
        "Tranche 1: Current or first tranche",
        "Tranche 2: Upcoming or second tranche",
        "Leave tranche fields empty if not using tranches",
        "",
        "Sample Data",
        "See the Template sheet for example entries",
        "Delete sample rows before adding your data",
        "",
        "Important Notes",
        "- Do not modify the header row",
        "- Use numeric values for rates (no currency symbols)",
        "- Date format should be YYYY-MM-DD",
        "- Region ID must be unique",
        "- Empty cells will be ignored during import",
    ]
    .into_iter()
    .map(|entry| line(&[entry]))
    .collect()
}

/// Sample rows shipped with the template: one tranche-form region, one
/// single-rate region.
fn template_rows() -> Vec<Vec<Out>> {
    use Out::{Blank, Number};
    let all = || text("All workers");
    let agri = || text("Agricultural workers");
    vec![
        vec![
            text("ncr"),
            text("National Capital Region"),
            text("RB-01"),
            text("2024-01-01"),
            Number(570.0),
            all(),
            Number(570.0),
            text("2024-01-01"),
            all(),
            Number(600.0),
            text("2024-06-01"),
            all(),
            Number(525.0),
            agri(),
            Number(550.0),
            text("2024-06-01"),
            agri(),
            Blank,
            Blank,
            Blank,
            text("Sample region with multi-tranche rates"),
        ],
        vec![
            text("region1"),
            text("Sample Region"),
            text("RB-02"),
            text("2024-02-01"),
            Number(450.0),
            all(),
            Blank,
            Blank,
            Blank,
            Blank,
            Blank,
            Blank,
            Number(400.0),
            agri(),
            Blank,
            Blank,
            Blank,
            Blank,
            Blank,
            Blank,
            text("Sample region with single rates"),
        ],
    ]
}

/// Data sheet plus an instruction sheet that import ignores.
pub fn encode_sheet(document: &Document, exported_at: &str) -> Result<Vec<u8>, WageError> {
    let rows = document.regions.iter().map(region_cells).collect();
    build_workbook(
        "Wage Rates",
        rows,
        export_instructions(document, exported_at),
        [25, 50],
    )
}

/// Header, two sample rows and an instruction sheet.
pub fn sheet_template() -> Result<Vec<u8>, WageError> {
    build_workbook("Template", template_rows(), template_instructions(), [30, 60])
}

fn build_workbook(
    data_sheet: &str,
    rows: Vec<Vec<Out>>,
    instructions: Vec<Vec<Out>>,
    instruction_widths: [u16; 2],
) -> Result<Vec<u8>, WageError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(data_sheet).map_err(xlsx_error)?;
    write_header(sheet).map_err(xlsx_error)?;
    for (row, cells) in (1u32..).zip(rows) {
        write_row(sheet, row, cells).map_err(xlsx_error)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Instructions").map_err(xlsx_error)?;
    write_lines(sheet, instructions, instruction_widths).map_err(xlsx_error)?;

    workbook.save_to_buffer().map_err(xlsx_error)
}

/// Cell value as read back from a workbook.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// Date-typed cell, kept as its serial number.
    Date(f64),
    Bool(bool),
}

impl Cell {
    fn from_data(data: &Data) -> Self {
        match data {
            Data::Int(value) => Cell::Number(*value as f64),
            Data::Float(value) => Cell::Number(*value),
            Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
                Cell::Text(value.trim().to_string())
            }
            Data::Bool(value) => Cell::Bool(*value),
            Data::DateTime(value) => Cell::Date(value.as_f64()),
            Data::Error(_) | Data::Empty => Cell::Empty,
        }
    }

    /// Blank, zero, `false` and empty text count as absent.
    fn is_set(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Text(value) => !value.is_empty(),
            Cell::Number(value) | Cell::Date(value) => *value != 0.0 && !value.is_nan(),
            Cell::Bool(value) => *value,
        }
    }

    fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(value) => value.clone(),
            Cell::Number(value) => plain_amount(*value),
            Cell::Date(serial) => serial_to_date(*serial).unwrap_or_default(),
            Cell::Bool(value) => value.to_string(),
        }
    }

    fn date(&self) -> String {
        match self {
            Cell::Number(serial) | Cell::Date(serial) => {
                serial_to_date(*serial).unwrap_or_default()
            }
            Cell::Text(value) => value.clone(),
            Cell::Empty | Cell::Bool(_) => String::new(),
        }
    }

    fn amount(&self) -> f64 {
        match self {
            Cell::Number(value) | Cell::Date(value) if value.is_finite() => *value,
            Cell::Text(value) => value.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

static EMPTY: Cell = Cell::Empty;

fn cell(row: &[Cell], col: u16) -> &Cell {
    row.get(usize::from(col)).unwrap_or(&EMPTY)
}

fn rate_from_row(row: &[Cell], start: u16, sector: Sector) -> Option<Rate> {
    let current = cell(row, start);
    let first_amount = cell(row, start + 2);
    let second_amount = cell(row, start + 5);
    if !(current.is_set() || first_amount.is_set() || second_amount.is_set()) {
        return None;
    }
    if !(first_amount.is_set() || second_amount.is_set()) {
        return Some(Rate::single(
            sector,
            current.amount(),
            cell(row, start + 1).text(),
        ));
    }

    let mut tranches = Vec::with_capacity(2);
    let slots = [(2, TrancheStatus::Current), (5, TrancheStatus::Upcoming)];
    for (offset, status) in slots {
        let amount = cell(row, start + offset);
        if amount.is_set() {
            tranches.push(Tranche::new(
                amount.amount(),
                cell(row, start + offset + 1).date(),
                cell(row, start + offset + 2).text(),
                status,
            ));
        }
    }
    Some(Rate::with_tranches(sector, tranches))
}

fn region_from_row(row: &[Cell]) -> Option<Region> {
    let region = Region {
        id: cell(row, 0).text(),
        name: cell(row, 1).text(),
        wage_order: cell(row, 2).text(),
        date_effective: cell(row, 3).date(),
        rates: [
            rate_from_row(row, NON_AGRICULTURE_START, Sector::NonAgriculture),
            rate_from_row(row, AGRICULTURE_START, Sector::Agriculture),
        ]
        .into_iter()
        .flatten()
        .collect(),
        notes: cell(row, NOTES_COLUMN).text(),
    };
    let complete = [
        &region.id,
        &region.name,
        &region.wage_order,
        &region.date_effective,
    ]
    .iter()
    .all(|value| !value.is_empty());
    complete.then_some(region)
}

/// Reads the first worksheet. Row 0 is the header; blank rows and rows
/// missing id, name, wage order or effective date are skipped.
pub fn decode_sheet(bytes: &[u8]) -> Result<Document, WageError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|err| WageError::format(format!("spreadsheet: {err}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| WageError::format("spreadsheet has no worksheets"))?
        .map_err(|err| WageError::format(format!("spreadsheet: {err}")))?;

    let col_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let rows: Vec<Vec<Cell>> = range
        .rows()
        .map(|row| {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(Cell::from_data));
            cells
        })
        .collect();

    if rows.len() < 2 {
        return Err(WageError::format(
            "spreadsheet must have at least a header row and one data row",
        ));
    }

    let regions: Vec<Region> = rows[1..]
        .iter()
        .filter(|row| row.iter().any(Cell::is_set))
        .filter_map(|row| region_from_row(row))
        .collect();

    if regions.is_empty() {
        return Err(WageError::format("no valid data found in spreadsheet"));
    }
    Ok(Document::new(regions))
}
