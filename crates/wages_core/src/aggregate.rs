//! Region aggregator: wage extremes, tranche status union, summary figures.

use crate::normalize::normalize;
use crate::{Rate, RateSchedule, Region, Sector, SectorFilter, TrancheStatus};

/// Every amount a rate carries: the single amount or each tranche amount.
pub fn rate_amounts(rate: &Rate) -> Vec<f64> {
    match &rate.schedule {
        RateSchedule::Single { amount, .. } => vec![*amount],
        RateSchedule::Tranches(tranches) => tranches.iter().map(|t| t.amount).collect(),
    }
}

/// Lowest amount across all rates; `None` when the region has no rates.
pub fn min_wage(region: &Region) -> Option<f64> {
    region
        .rates
        .iter()
        .flat_map(rate_amounts)
        .reduce(f64::min)
}

/// Highest amount across all rates; `None` when the region has no rates.
pub fn max_wage(region: &Region) -> Option<f64> {
    region
        .rates
        .iter()
        .flat_map(rate_amounts)
        .reduce(f64::max)
}

/// Statuses present across the applicable rates of `regions`, deduplicated
/// and ordered current, upcoming, then unknown statuses in first-seen order.
pub fn union_tranche_statuses<'a, I>(regions: I, filter: SectorFilter) -> Vec<TrancheStatus>
where
    I: IntoIterator<Item = &'a Region>,
{
    let mut statuses: Vec<TrancheStatus> = Vec::new();
    for region in regions {
        for rate in region.rates.iter().filter(|rate| filter.includes(rate.sector)) {
            match &rate.schedule {
                RateSchedule::Single { .. } => push_unique(&mut statuses, TrancheStatus::Current),
                RateSchedule::Tranches(tranches) => {
                    for tranche in tranches {
                        push_unique(&mut statuses, tranche.status.clone());
                    }
                }
            }
        }
    }
    // Stable sort keeps first-seen order among equal ordinals.
    statuses.sort_by_key(TrancheStatus::ordinal);
    statuses
}

fn push_unique(statuses: &mut Vec<TrancheStatus>, status: TrancheStatus) {
    if !statuses.contains(&status) {
        statuses.push(status);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionStatistics {
    pub total_regions: usize,
    /// Rounded mean of current Non-Agriculture amounts over all regions.
    pub average_wage: i64,
}

pub fn statistics(regions: &[Region]) -> RegionStatistics {
    if regions.is_empty() {
        return RegionStatistics::default();
    }
    let total: f64 = regions
        .iter()
        .filter_map(|region| region.rate(Sector::NonAgriculture))
        .map(|rate| normalize(rate, "").current_amount)
        .sum();
    RegionStatistics {
        total_regions: regions.len(),
        average_wage: (total / regions.len() as f64).round() as i64,
    }
}
