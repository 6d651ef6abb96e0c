//! Asset and liability records consumed by the projection engine

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::month::Month;

/// Longest accepted loan tenure (100 years)
pub const MAX_TENURE_MONTHS: u32 = 1200;

/// How an asset accumulates value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Single amount invested once and left to appreciate
    LumpSum,
    /// Fixed monthly contribution (SIP)
    Recurring,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::LumpSum => "lump_sum",
            AssetKind::Recurring => "recurring",
        }
    }
}

/// A holding that adds to net worth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,

    pub name: String,

    pub kind: AssetKind,

    /// Principal for lump sums, monthly contribution for recurring assets
    pub amount: f64,

    /// Annual growth rate in percent (6.0 = 6%)
    pub annual_growth_rate: f64,

    /// Month the asset was bought or the first contribution was made
    pub start_month: Month,

    /// Counts towards liquid assets
    pub liquid: bool,
}

impl Asset {
    pub fn lump_sum(id: &str, amount: f64, annual_growth_rate: f64, start_month: Month) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            kind: AssetKind::LumpSum,
            amount,
            annual_growth_rate,
            start_month,
            liquid: false,
        }
    }

    pub fn recurring(id: &str, monthly_amount: f64, annual_growth_rate: f64, start_month: Month) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            kind: AssetKind::Recurring,
            amount: monthly_amount,
            annual_growth_rate,
            start_month,
            liquid: false,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_liquid(mut self, liquid: bool) -> Self {
        self.liquid = liquid;
        self
    }

    /// Reject negative amounts and rates. Depreciation is not modelled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_negative("asset", &self.id, "amount", self.amount)?;
        non_negative("asset", &self.id, "annual_growth_rate", self.annual_growth_rate)
    }
}

/// An amortizing loan that subtracts from net worth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liability {
    pub id: String,

    pub name: String,

    /// Amount borrowed at `start_month`
    pub principal: f64,

    /// Annual interest rate in percent (8.5 = 8.5%)
    pub annual_interest_rate: f64,

    /// Equated monthly installment
    pub emi_amount: f64,

    /// Month the loan was disbursed; the first EMI falls one month later
    pub start_month: Month,

    pub original_tenure_months: u32,

    /// Outstanding balance as reported by the lender, if known
    #[serde(default)]
    pub current_balance_hint: Option<f64>,
}

impl Liability {
    pub fn new(
        id: &str,
        principal: f64,
        annual_interest_rate: f64,
        emi_amount: f64,
        start_month: Month,
        original_tenure_months: u32,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            principal,
            annual_interest_rate,
            emi_amount,
            start_month,
            original_tenure_months,
            current_balance_hint: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_balance_hint(mut self, balance: f64) -> Self {
        self.current_balance_hint = Some(balance);
        self
    }

    /// Monthly interest rate as a fraction
    pub fn monthly_rate(&self) -> f64 {
        self.annual_interest_rate / 12.0 / 100.0
    }

    /// Month in which the final scheduled EMI falls
    pub fn scheduled_end_month(&self) -> Month {
        self.start_month.add_months(self.original_tenure_months as i32)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        non_negative("liability", &self.id, "principal", self.principal)?;
        non_negative("liability", &self.id, "annual_interest_rate", self.annual_interest_rate)?;
        non_negative("liability", &self.id, "emi_amount", self.emi_amount)?;
        if self.original_tenure_months == 0 {
            return Err(ValidationError::ZeroTenure(self.id.clone()));
        }
        if self.original_tenure_months > MAX_TENURE_MONTHS {
            return Err(ValidationError::TenureTooLong {
                id: self.id.clone(),
                value: self.original_tenure_months,
                max: MAX_TENURE_MONTHS,
            });
        }
        Ok(())
    }
}

fn non_negative(entity: &'static str, id: &str, field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value < 0.0 || value.is_nan() {
        return Err(ValidationError::NegativeValue {
            entity,
            id: id.to_string(),
            field,
            value,
        });
    }
    Ok(())
}
