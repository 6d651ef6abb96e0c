//! Timeline output structures

use serde::{Deserialize, Serialize};

use crate::month::Month;
use crate::repository::Snapshot;

/// Where a timeline point's figures came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSource {
    /// Copied from a stored snapshot
    Snapshot,
    /// Past month with no snapshot, recomputed from holdings
    Reconstructed,
    /// The current month, computed from holdings
    Live,
    /// Future month, computed from holdings
    Projected,
}

/// A loan retired within the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffEvent {
    pub liability_id: String,
    pub name: String,
    /// First month with a zero balance
    pub month: Month,
    /// Balance outstanding in the month before payoff
    pub balance_cleared: f64,
    /// EMI no longer owed from this month on
    pub monthly_savings: f64,
}

/// Net worth position for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub month: Month,

    pub assets: f64,
    pub liabilities: f64,
    pub net_worth: f64,
    pub liquid_assets: f64,

    /// Past month (snapshot or reconstruction)
    pub is_historical: bool,
    /// Future month
    pub is_projected: bool,
    pub source: PointSource,

    /// Payoff falling in this month; the largest one when several coincide
    pub payoff_event: Option<PayoffEvent>,

    /// EMIs freed up by payoffs in this month
    pub cash_flow_improvement: f64,
    /// EMIs freed up by payoffs up to and including this month
    pub cumulative_cash_flow_improvement: f64,
}

impl TimelinePoint {
    /// Point with the given totals; flags are set by the composer
    pub fn new(month: Month, assets: f64, liabilities: f64, liquid_assets: f64) -> Self {
        Self {
            month,
            assets,
            liabilities,
            net_worth: assets - liabilities,
            liquid_assets,
            is_historical: false,
            is_projected: false,
            source: PointSource::Live,
            payoff_event: None,
            cash_flow_improvement: 0.0,
            cumulative_cash_flow_improvement: 0.0,
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            net_worth: snapshot.net_worth,
            ..Self::new(
                snapshot.month,
                snapshot.total_assets,
                snapshot.total_liabilities,
                snapshot.liquid_assets,
            )
        }
        .with_source(PointSource::Snapshot)
    }

    /// Set the source and the matching historical/projected flags
    pub fn with_source(mut self, source: PointSource) -> Self {
        self.source = source;
        self.is_historical = matches!(source, PointSource::Snapshot | PointSource::Reconstructed);
        self.is_projected = matches!(source, PointSource::Projected);
        self
    }
}
