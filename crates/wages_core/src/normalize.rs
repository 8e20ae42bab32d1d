//! Rate normalizer: resolves either rate shape into a current/upcoming view.

use crate::format::format_currency;
use crate::{Rate, RateSchedule, Sector, Tranche, TrancheStatus};

/// Canonical, display-ready view of one rate.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRate {
    pub sector: Sector,
    pub current_amount: f64,
    pub current_coverage: String,
    pub current_effective_date: String,
    pub upcoming_amount: Option<f64>,
    pub upcoming_coverage: Option<String>,
    pub upcoming_effective_date: Option<String>,
}

impl NormalizedRate {
    pub fn has_upcoming(&self) -> bool {
        self.upcoming_amount.is_some()
    }
}

/// First tranche carrying `status`.
pub fn tranche_with_status<'a>(tranches: &'a [Tranche], status: &TrancheStatus) -> Option<&'a Tranche> {
    tranches.iter().find(|tranche| &tranche.status == status)
}

/// The tranche marked current, or the first tranche when none is.
pub fn current_tranche(tranches: &[Tranche]) -> Option<&Tranche> {
    tranche_with_status(tranches, &TrancheStatus::Current).or_else(|| tranches.first())
}

/// Normalizes a rate. Single-form rates take `fallback_effective_date`
/// (the region's effective date) as their current effective date.
pub fn normalize(rate: &Rate, fallback_effective_date: &str) -> NormalizedRate {
    match &rate.schedule {
        RateSchedule::Single { amount, coverage } => NormalizedRate {
            sector: rate.sector,
            current_amount: *amount,
            current_coverage: coverage.clone(),
            current_effective_date: fallback_effective_date.to_string(),
            upcoming_amount: None,
            upcoming_coverage: None,
            upcoming_effective_date: None,
        },
        RateSchedule::Tranches(tranches) => {
            let current = current_tranche(tranches);
            let upcoming = tranche_with_status(tranches, &TrancheStatus::Upcoming);
            NormalizedRate {
                sector: rate.sector,
                current_amount: current.map(|t| t.amount).unwrap_or(0.0),
                current_coverage: current.map(|t| t.coverage.clone()).unwrap_or_default(),
                current_effective_date: current
                    .map(|t| t.effective_date.clone())
                    .unwrap_or_else(|| fallback_effective_date.to_string()),
                upcoming_amount: upcoming.map(|t| t.amount),
                upcoming_coverage: upcoming.map(|t| t.coverage.clone()),
                upcoming_effective_date: upcoming.map(|t| t.effective_date.clone()),
            }
        }
    }
}

/// Compact amount label: `₱570`, or `₱570 → ₱600` when an increase is scheduled.
pub fn display_amount(rate: &Rate) -> String {
    let normalized = normalize(rate, "");
    let mut display = format_currency(normalized.current_amount);
    if let Some(upcoming) = normalized.upcoming_amount {
        display.push_str(" → ");
        display.push_str(&format_currency(upcoming));
    }
    display
}
