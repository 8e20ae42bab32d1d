use chrono::NaiveDate;

const CURRENCY_SYMBOL: &str = "₱";

/// Formats a peso amount with digit grouping and at most two decimals,
/// dropping trailing zero decimals (`₱12,345`, `₱610.5`, `₱99.25`).
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let mut out = String::new();
    if amount < 0.0 && cents > 0 {
        out.push('-');
    }
    out.push_str(CURRENCY_SYMBOL);
    out.push_str(&group_thousands(whole));
    if fraction != 0 {
        if fraction % 10 == 0 {
            out.push_str(&format!(".{}", fraction / 10));
        } else {
            out.push_str(&format!(".{fraction:02}"));
        }
    }
    out
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats an amount the way it appears in searchable text and CSV cells:
/// integral values carry no decimal point.
pub fn plain_amount(amount: f64) -> String {
    format!("{amount}")
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            trimmed
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

/// `Jan 1, 2024`; `N/A` for empty input, the raw text when unparsable.
pub fn format_date_short(raw: &str) -> String {
    format_date_with(raw, "%b %-d, %Y")
}

/// `January 1, 2024`; same fallbacks as [`format_date_short`].
pub fn format_date_long(raw: &str) -> String {
    format_date_with(raw, "%B %-d, %Y")
}

fn format_date_with(raw: &str, pattern: &str) -> String {
    if raw.trim().is_empty() {
        return "N/A".to_string();
    }
    match parse_date(raw) {
        Some(date) => date.format(pattern).to_string(),
        None => raw.to_string(),
    }
}
