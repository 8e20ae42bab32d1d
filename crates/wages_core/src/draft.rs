//! Editor drafts: the raw form contents for one region and the schema that
//! decides which of its fields are required.

use crate::{Rate, RateSchedule, Region, Sector, Tranche, TrancheStatus, WageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateMode {
    #[default]
    Single,
    Tranches,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrancheDraft {
    pub amount: String,
    pub effective_date: String,
    pub coverage: String,
}

impl TrancheDraft {
    fn from_tranche(tranche: &Tranche) -> Self {
        Self {
            amount: format!("{}", tranche.amount),
            effective_date: tranche.effective_date.clone(),
            coverage: tranche.coverage.clone(),
        }
    }
}

/// Form contents for one sector's rate. Amounts stay as typed text until
/// the draft is converted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RateDraft {
    pub mode: RateMode,
    pub amount: String,
    pub coverage: String,
    pub tranche1: TrancheDraft,
    pub tranche2: TrancheDraft,
}

impl RateDraft {
    pub fn single(amount: impl Into<String>, coverage: impl Into<String>) -> Self {
        Self {
            mode: RateMode::Single,
            amount: amount.into(),
            coverage: coverage.into(),
            ..Self::default()
        }
    }

    pub fn tranches(tranche1: TrancheDraft, tranche2: TrancheDraft) -> Self {
        Self {
            mode: RateMode::Tranches,
            tranche1,
            tranche2,
            ..Self::default()
        }
    }

    fn from_rate(rate: &Rate) -> Self {
        match &rate.schedule {
            RateSchedule::Single { amount, coverage } => {
                Self::single(format!("{amount}"), coverage.clone())
            }
            RateSchedule::Tranches(tranches) => {
                let pick = |status: TrancheStatus, fallback: usize| {
                    tranches
                        .iter()
                        .find(|t| t.status == status)
                        .or_else(|| tranches.get(fallback))
                        .map(TrancheDraft::from_tranche)
                        .unwrap_or_default()
                };
                Self::tranches(
                    pick(TrancheStatus::Current, 0),
                    pick(TrancheStatus::Upcoming, 1),
                )
            }
        }
    }

    fn into_rate(self, sector: Sector) -> Result<Rate, WageError> {
        match self.mode {
            RateMode::Single => {
                let amount = parse_amount(sector, &self.amount)?.unwrap_or(0.0);
                Ok(Rate::single(sector, amount, self.coverage.trim()))
            }
            RateMode::Tranches => {
                let mut tranches = Vec::with_capacity(2);
                let slots = [
                    (self.tranche1, TrancheStatus::Current),
                    (self.tranche2, TrancheStatus::Upcoming),
                ];
                for (draft, status) in slots {
                    let Some(amount) = parse_amount(sector, &draft.amount)? else {
                        continue;
                    };
                    if amount > 0.0 {
                        tranches.push(Tranche::new(
                            amount,
                            draft.effective_date.trim(),
                            draft.coverage.trim(),
                            status,
                        ));
                    }
                }
                if tranches.is_empty() {
                    return Err(WageError::validation(format!(
                        "{sector} rate needs at least one tranche with an amount above zero"
                    )));
                }
                Ok(Rate::with_tranches(sector, tranches))
            }
        }
    }
}

fn parse_amount(sector: Sector, raw: &str) -> Result<Option<f64>, WageError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .map(Some)
        .ok_or_else(|| WageError::validation(format!("{sector} amount `{trimmed}` is not a number")))
}

/// Everything the region editor form holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionDraft {
    pub id: String,
    pub name: String,
    pub wage_order: String,
    pub date_effective: String,
    pub notes: String,
    pub non_agriculture: RateDraft,
    /// `None` when the agriculture rate is switched off.
    pub agriculture: Option<RateDraft>,
}

impl RegionDraft {
    /// Prefills the form from an existing region.
    pub fn from_region(region: &Region) -> Self {
        Self {
            id: region.id.clone(),
            name: region.name.clone(),
            wage_order: region.wage_order.clone(),
            date_effective: region.date_effective.clone(),
            notes: region.notes.clone(),
            non_agriculture: region
                .rate(Sector::NonAgriculture)
                .map(RateDraft::from_rate)
                .unwrap_or_default(),
            agriculture: region.rate(Sector::Agriculture).map(RateDraft::from_rate),
        }
    }

    /// Checks the form against its schema and builds the region.
    pub fn into_region(self) -> Result<Region, WageError> {
        let missing = FormSchema::for_draft(&self).missing(&self);
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|field| field.label()).collect();
            return Err(WageError::validation(format!(
                "missing required fields: {}",
                names.join(", ")
            )));
        }

        let mut rates = vec![self.non_agriculture.into_rate(Sector::NonAgriculture)?];
        if let Some(agriculture) = self.agriculture {
            rates.push(agriculture.into_rate(Sector::Agriculture)?);
        }

        let region = Region {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            wage_order: self.wage_order.trim().to_string(),
            date_effective: self.date_effective.trim().to_string(),
            rates,
            notes: self.notes.trim().to_string(),
        };
        region.validate()?;
        Ok(region)
    }
}

/// Named input of the region editor form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    RegionId,
    RegionName,
    WageOrder,
    DateEffective,
    Amount(Sector),
    Tranche1Amount(Sector),
    Tranche1Date(Sector),
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::RegionId => "Region ID",
            FormField::RegionName => "Region Name",
            FormField::WageOrder => "Wage Order",
            FormField::DateEffective => "Date Effective",
            FormField::Amount(Sector::NonAgriculture) => "Non-Agriculture Rate",
            FormField::Amount(Sector::Agriculture) => "Agriculture Rate",
            FormField::Tranche1Amount(Sector::NonAgriculture) => {
                "Non-Agriculture Tranche 1 Amount"
            }
            FormField::Tranche1Amount(Sector::Agriculture) => "Agriculture Tranche 1 Amount",
            FormField::Tranche1Date(Sector::NonAgriculture) => "Non-Agriculture Tranche 1 Date",
            FormField::Tranche1Date(Sector::Agriculture) => "Agriculture Tranche 1 Date",
        }
    }
}

/// Required fields for the current mode switches of a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    required: Vec<FormField>,
}

impl FormSchema {
    pub fn for_draft(draft: &RegionDraft) -> Self {
        let mut required = vec![
            FormField::RegionId,
            FormField::RegionName,
            FormField::WageOrder,
            FormField::DateEffective,
        ];
        let mut push_rate = |sector: Sector, rate: &RateDraft| match rate.mode {
            RateMode::Single => required.push(FormField::Amount(sector)),
            RateMode::Tranches => {
                required.push(FormField::Tranche1Amount(sector));
                required.push(FormField::Tranche1Date(sector));
            }
        };
        push_rate(Sector::NonAgriculture, &draft.non_agriculture);
        if let Some(agriculture) = &draft.agriculture {
            push_rate(Sector::Agriculture, agriculture);
        }
        Self { required }
    }

    pub fn required(&self) -> &[FormField] {
        &self.required
    }

    pub fn is_required(&self, field: FormField) -> bool {
        self.required.contains(&field)
    }

    /// Required fields left blank in `draft`, in form order.
    pub fn missing(&self, draft: &RegionDraft) -> Vec<FormField> {
        self.required
            .iter()
            .copied()
            .filter(|field| field_value(draft, *field).is_none_or(|v| v.trim().is_empty()))
            .collect()
    }
}

fn field_value(draft: &RegionDraft, field: FormField) -> Option<&str> {
    let rate = |sector: Sector| match sector {
        Sector::NonAgriculture => Some(&draft.non_agriculture),
        Sector::Agriculture => draft.agriculture.as_ref(),
    };
    match field {
        FormField::RegionId => Some(draft.id.as_str()),
        FormField::RegionName => Some(draft.name.as_str()),
        FormField::WageOrder => Some(draft.wage_order.as_str()),
        FormField::DateEffective => Some(draft.date_effective.as_str()),
        FormField::Amount(sector) => rate(sector).map(|r| r.amount.as_str()),
        FormField::Tranche1Amount(sector) => rate(sector).map(|r| r.tranche1.amount.as_str()),
        FormField::Tranche1Date(sector) => {
            rate(sector).map(|r| r.tranche1.effective_date.as_str())
        }
    }
}
