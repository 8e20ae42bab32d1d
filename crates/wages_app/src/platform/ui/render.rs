//! Plain-text rendering of the view model for terminal output.

use std::fmt::Write as _;

use wages_core::format::{format_currency, format_date_long};
use wages_core::{
    AdminRow, AppViewModel, Banner, BannerLevel, RateTable, RegionCard, RegionsView, TableCell,
    WAGE_UPDATE_MESSAGE,
};

const TITLE: &str = "Regional Minimum Wage Rates";
const PLACEHOLDER: &str = "-";

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    if let Some(last_updated) = &view.last_updated {
        let _ = writeln!(out, "Last updated: {last_updated}");
    }
    let _ = writeln!(
        out,
        "Regions: {} | Average wage: {}",
        view.statistics.total_regions,
        format_currency(view.statistics.average_wage as f64)
    );
    if view.loading.is_some() {
        let _ = writeln!(out, "Loading...");
    }
    if let Some(banner) = &view.banner {
        let _ = writeln!(out, "{}", banner_line(banner));
    }
    out.push('\n');

    match &view.regions {
        RegionsView::Empty { message } => {
            let _ = writeln!(out, "{message}");
        }
        RegionsView::Grid(cards) => {
            for card in cards {
                render_card(&mut out, card);
                out.push('\n');
            }
        }
        RegionsView::List(table) => render_table(&mut out, table),
    }
    out
}

pub fn banner_line(banner: &Banner) -> String {
    let label = match banner.level {
        BannerLevel::Info => "info",
        BannerLevel::Success => "ok",
        BannerLevel::Error => "error",
    };
    if banner.retry {
        format!("[{label}] {} (retry with `view`)", banner.message)
    } else {
        format!("[{label}] {}", banner.message)
    }
}

/// Line shown when another editor saved new rates.
pub fn notification_line(last_updated: &str) -> String {
    format!(
        "** {WAGE_UPDATE_MESSAGE} (last updated {}) **",
        format_date_long(last_updated)
    )
}

fn render_card(out: &mut String, card: &RegionCard) {
    let _ = writeln!(
        out,
        "{}  {}  [{}]",
        card.region_id.to_uppercase(),
        card.name,
        card.status_label
    );
    for section in &card.sections {
        let _ = write!(out, "  {}: {}", section.title, section.amount);
        if let Some(details) = &section.details {
            let _ = write!(out, " ({details})");
        }
        if let Some(effective) = &section.effective {
            let _ = write!(out, " {effective}");
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "  Wage Order: {} | Effective: {}",
        card.wage_order, card.effective
    );
    if let Some(notes) = &card.notes {
        let _ = writeln!(out, "  Notes: {notes}");
    }
}

fn cell_text(cell: &TableCell) -> String {
    match cell {
        TableCell::Amount { display, coverage } => match coverage {
            Some(coverage) => format!("{display} ({coverage})"),
            None => display.clone(),
        },
        TableCell::Date(date) => date.clone(),
        TableCell::Placeholder => PLACEHOLDER.to_string(),
    }
}

fn render_table(out: &mut String, table: &RateTable) {
    let mut header = vec!["Region".to_string(), "Wage Order".to_string()];
    header.extend(
        table
            .columns
            .iter()
            .map(|column| format!("{} {}", column.sector.label(), column.header)),
    );
    header.push("Notes".to_string());

    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                format!("{} {}", row.region_id, row.name),
                row.wage_order.clone(),
            ];
            cells.extend(row.cells.iter().map(cell_text));
            cells.push(row.notes.clone().unwrap_or_default());
            cells
        })
        .collect();

    write_grid(out, &header, &rows);
}

/// Admin list of the editor, in document order.
pub fn render_admin(rows: &[AdminRow]) -> String {
    let header: Vec<String> = [
        "#",
        "ID",
        "Name",
        "Wage Order",
        "Effective",
        "Non-Agriculture",
        "Agriculture",
    ]
    .iter()
    .map(|title| title.to_string())
    .collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                (row.index + 1).to_string(),
                row.region_id.clone(),
                row.name.clone(),
                row.wage_order.clone(),
                row.effective.clone(),
                row.non_agriculture.clone(),
                row.agriculture.clone(),
            ]
        })
        .collect();
    let mut out = String::new();
    write_grid(&mut out, &header, &body);
    out
}

fn write_grid(out: &mut String, header: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = header.iter().map(|title| title.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_line(out, header, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    write_line(out, &rule, &widths);
    for row in rows {
        write_line(out, row, &widths);
    }
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}
