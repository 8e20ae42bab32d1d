//! Canonical wage document: regions, rates and tranches.
//!
//! Rates come in two JSON shapes that coexist in stored data: the legacy
//! single-amount form `{type, amount, coverage}` and the tranche form
//! `{type, tranches: [...]}`. Both decode into [`Rate`] with a
//! [`RateSchedule`] variant, so consumers never inspect the raw shape.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::WageError;

/// Sector a rate applies to. Serialized with the labels used in stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "Non-Agriculture")]
    NonAgriculture,
    #[serde(rename = "Agriculture")]
    Agriculture,
}

impl Sector {
    /// Display order used by every view and export.
    pub const ALL: [Sector; 2] = [Sector::NonAgriculture, Sector::Agriculture];

    pub fn label(self) -> &'static str {
        match self {
            Sector::NonAgriculture => "Non-Agriculture",
            Sector::Agriculture => "Agriculture",
        }
    }

    /// Parses the stored label, ignoring ASCII case.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|sector| sector.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position of a tranche in a rate schedule.
///
/// Unknown status strings are kept verbatim so that a round trip never drops
/// data; they sort after the two known statuses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrancheStatus {
    #[default]
    Current,
    Upcoming,
    Other(String),
}

impl TrancheStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TrancheStatus::Current => "current",
            TrancheStatus::Upcoming => "upcoming",
            TrancheStatus::Other(value) => value,
        }
    }

    /// Fixed column ordinal: current before upcoming before anything else.
    pub fn ordinal(&self) -> u8 {
        match self {
            TrancheStatus::Current => 0,
            TrancheStatus::Upcoming => 1,
            TrancheStatus::Other(_) => 2,
        }
    }
}

impl From<String> for TrancheStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "current" => TrancheStatus::Current,
            "upcoming" => TrancheStatus::Upcoming,
            _ => TrancheStatus::Other(value),
        }
    }
}

impl From<TrancheStatus> for String {
    fn from(status: TrancheStatus) -> Self {
        match status {
            TrancheStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TrancheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dated amount within a rate schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tranche {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub effective_date: String,
    #[serde(default)]
    pub coverage: String,
    #[serde(default)]
    pub status: TrancheStatus,
}

impl Tranche {
    pub fn new(
        amount: f64,
        effective_date: impl Into<String>,
        coverage: impl Into<String>,
        status: TrancheStatus,
    ) -> Self {
        Self {
            amount,
            effective_date: effective_date.into(),
            coverage: coverage.into(),
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RateSchedule {
    Single { amount: f64, coverage: String },
    /// Never empty; an empty list decodes as `Single`.
    Tranches(Vec<Tranche>),
}

/// Wage figure for one sector of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRate", into = "RawRate")]
pub struct Rate {
    pub sector: Sector,
    pub schedule: RateSchedule,
}

impl Rate {
    pub fn single(sector: Sector, amount: f64, coverage: impl Into<String>) -> Self {
        Self {
            sector,
            schedule: RateSchedule::Single {
                amount,
                coverage: coverage.into(),
            },
        }
    }

    /// Builds a tranche-form rate; an empty list degrades to a zero single rate.
    pub fn with_tranches(sector: Sector, tranches: Vec<Tranche>) -> Self {
        let schedule = if tranches.is_empty() {
            RateSchedule::Single {
                amount: 0.0,
                coverage: String::new(),
            }
        } else {
            RateSchedule::Tranches(tranches)
        };
        Self { sector, schedule }
    }

    pub fn tranches(&self) -> Option<&[Tranche]> {
        match &self.schedule {
            RateSchedule::Tranches(tranches) => Some(tranches),
            RateSchedule::Single { .. } => None,
        }
    }

    pub fn is_tranched(&self) -> bool {
        matches!(self.schedule, RateSchedule::Tranches(_))
    }
}

/// Wire shape of a rate, tolerant of both the legacy and the tranche form.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRate {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coverage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tranches: Option<Vec<Tranche>>,
}

impl TryFrom<RawRate> for Rate {
    type Error = WageError;

    fn try_from(raw: RawRate) -> Result<Self, Self::Error> {
        let kind = raw
            .kind
            .ok_or_else(|| WageError::validation("rate is missing its `type`"))?;
        let sector = Sector::from_label(&kind)
            .ok_or_else(|| WageError::validation(format!("unknown rate type `{kind}`")))?;

        match raw.tranches {
            Some(tranches) if !tranches.is_empty() => Ok(Rate {
                sector,
                schedule: RateSchedule::Tranches(tranches),
            }),
            _ => Ok(Rate::single(
                sector,
                raw.amount.unwrap_or(0.0),
                raw.coverage.unwrap_or_default(),
            )),
        }
    }
}

impl From<Rate> for RawRate {
    fn from(rate: Rate) -> Self {
        let kind = Some(rate.sector.label().to_string());
        match rate.schedule {
            RateSchedule::Single { amount, coverage } => RawRate {
                kind,
                amount: Some(amount),
                coverage: Some(coverage),
                tranches: None,
            },
            RateSchedule::Tranches(tranches) => RawRate {
                kind,
                amount: None,
                coverage: None,
                tranches: Some(tranches),
            },
        }
    }
}

/// One geographic wage-rate record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub wage_order: String,
    #[serde(default)]
    pub date_effective: String,
    #[serde(default)]
    pub rates: Vec<Rate>,
    #[serde(default)]
    pub notes: String,
}

impl Region {
    pub fn rate(&self, sector: Sector) -> Option<&Rate> {
        self.rates.iter().find(|rate| rate.sector == sector)
    }

    /// Checks the attributes every persisted region must carry.
    pub fn validate(&self) -> Result<(), WageError> {
        let required = [
            ("id", &self.id),
            ("name", &self.name),
            ("wageOrder", &self.wage_order),
            ("dateEffective", &self.date_effective),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(WageError::validation(format!(
                "region `{}` is missing `{field}`",
                self.id
            )));
        }
        if self.rates.is_empty() {
            return Err(WageError::validation(format!(
                "region `{}` has no rates",
                self.id
            )));
        }

        let mut seen = HashSet::new();
        for rate in &self.rates {
            if !seen.insert(rate.sector) {
                return Err(WageError::validation(format!(
                    "region `{}` has more than one {} rate",
                    self.id, rate.sector
                )));
            }
            let negative = match &rate.schedule {
                RateSchedule::Single { amount, .. } => *amount < 0.0,
                RateSchedule::Tranches(tranches) => tranches.iter().any(|t| t.amount < 0.0),
            };
            if negative {
                return Err(WageError::validation(format!(
                    "region `{}` has a negative {} amount",
                    self.id, rate.sector
                )));
            }
        }
        Ok(())
    }
}

/// The whole persisted collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub regions: Vec<Region>,
    #[serde(default)]
    pub last_updated: String,
}

impl Document {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions,
            last_updated: String::new(),
        }
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.regions.iter().position(|region| region.id == id)
    }

    /// Validates every region and the uniqueness of region ids.
    pub fn validate(&self) -> Result<(), WageError> {
        let mut ids = HashSet::new();
        for region in &self.regions {
            region.validate()?;
            if !ids.insert(region.id.as_str()) {
                return Err(WageError::validation(format!(
                    "duplicate region id `{}`",
                    region.id
                )));
            }
        }
        Ok(())
    }
}
