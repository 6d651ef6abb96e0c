//! Projection output returned to callers

use serde::{Deserialize, Serialize};

use crate::month::{months_between, Month};

use super::engine::ProjectionMode;
use super::heuristic::EstimatedPayoff;
use super::milestones::LiabilityOutlook;
use super::point::{PayoffEvent, TimelinePoint};
use super::timeline::Granularity;

/// Non-fatal problem found in a liability's terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// EMI does not cover the first month's interest
    NegativeAmortization { monthly_interest: f64, emi_amount: f64 },
    /// EMI covers interest but leaves debt after the original tenure
    ExceedsTenure { balance_at_tenure: f64 },
    /// Amortized balance disagrees with the lender-reported balance
    BalanceHintMismatch { hint: f64, computed: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionWarning {
    pub liability_id: String,
    #[serde(flatten)]
    pub issue: IntegrityIssue,
}

/// Headline figures derived from the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInsights {
    pub initial_net_worth: f64,
    pub final_net_worth: f64,
    /// Final minus initial net worth
    pub total_growth: f64,
    pub asset_count: usize,
    pub liability_count: usize,
    /// Liabilities with an outstanding balance in the `as_of` month
    pub active_loan_count: usize,
    /// Payoff closest to `as_of`, looking forward
    pub quickest_payoff: Option<PayoffEvent>,
    pub months_to_quickest_payoff: Option<i32>,
    pub months_to_crossover: Option<i32>,
}

impl ProjectionInsights {
    pub fn new(
        timeline: &[TimelinePoint],
        payoff_events: &[PayoffEvent],
        crossover_month: Option<Month>,
        asset_count: usize,
        liability_count: usize,
        active_loan_count: usize,
        as_of: Month,
    ) -> Self {
        let initial_net_worth = timeline.first().map(|p| p.net_worth).unwrap_or(0.0);
        let final_net_worth = timeline.last().map(|p| p.net_worth).unwrap_or(0.0);

        let quickest_payoff = payoff_events
            .iter()
            .filter(|e| e.month >= as_of)
            .min_by_key(|e| months_between(as_of, e.month))
            .cloned();

        Self {
            initial_net_worth,
            final_net_worth,
            total_growth: final_net_worth - initial_net_worth,
            asset_count,
            liability_count,
            active_loan_count,
            months_to_quickest_payoff: quickest_payoff.as_ref().map(|e| months_between(as_of, e.month)),
            quickest_payoff,
            months_to_crossover: crossover_month.map(|m| months_between(as_of, m)),
        }
    }
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// The month treated as "now"
    pub as_of: Month,
    pub mode: ProjectionMode,
    pub granularity: Granularity,
    pub start_month: Month,
    pub end_month: Month,

    /// Ascending by month
    pub timeline: Vec<TimelinePoint>,

    /// Exact payoffs, chronological
    pub payoff_events: Vec<PayoffEvent>,

    pub crossover_month: Option<Month>,

    /// EMIs freed up by every payoff in the window
    pub total_cash_flow_improvement: f64,

    pub insights: ProjectionInsights,

    pub liability_outlooks: Vec<LiabilityOutlook>,

    /// Approximate payoffs inferred from aggregate snapshot totals
    pub estimated_payoffs: Vec<EstimatedPayoff>,

    pub warnings: Vec<ProjectionWarning>,
}

impl ProjectionResult {
    pub fn point(&self, month: Month) -> Option<&TimelinePoint> {
        self.timeline
            .binary_search_by_key(&month, |p| p.month)
            .ok()
            .map(|idx| &self.timeline[idx])
    }

    pub fn final_point(&self) -> Option<&TimelinePoint> {
        self.timeline.last()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
