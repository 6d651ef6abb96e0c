//! Projection orchestrator: window selection, composition, milestones and insights

use std::str::FromStr;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::calculators::{AmortizationCalculator, UnpaidInterest};
use crate::error::ValidationError;
use crate::holdings::{Asset, Liability};
use crate::month::Month;
use crate::repository::Snapshot;

use super::cash_flow;
use super::evaluator::NetWorthEvaluator;
use super::heuristic::AggregateDropHeuristic;
use super::milestones::MilestoneDetector;
use super::result::{IntegrityIssue, ProjectionInsights, ProjectionResult, ProjectionWarning};
use super::timeline::{resample, Granularity, TimelineComposer};

/// Which part of the timeline to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Up to now, using stored snapshots where available
    Historical,
    /// Up to now, recomputed from holdings, ignoring snapshots
    Dynamic,
    /// From the earliest data through `now + horizon`
    Future,
}

impl ProjectionMode {
    pub fn uses_snapshots(&self) -> bool {
        !matches!(self, ProjectionMode::Dynamic)
    }
}

impl FromStr for ProjectionMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "historical" => Ok(ProjectionMode::Historical),
            "dynamic" => Ok(ProjectionMode::Dynamic),
            "future" => Ok(ProjectionMode::Future),
            other => Err(ValidationError::UnknownVariant {
                field: "mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Requested span of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Months(u32),
    Years(u32),
}

impl Horizon {
    pub fn months(&self) -> u32 {
        match *self {
            Horizon::Months(m) => m,
            Horizon::Years(y) => y.saturating_mul(12),
        }
    }

    /// Reject horizons outside the configured limits rather than clamping
    pub fn validate(&self, config: &ProjectionConfig) -> Result<(), ValidationError> {
        let (value, unit, max) = match *self {
            Horizon::Months(m) => (m, "months", config.max_horizon_months),
            Horizon::Years(y) => (y, "years", config.max_horizon_years),
        };
        if value == 0 || value > max {
            return Err(ValidationError::HorizonOutOfRange { value, unit, max });
        }
        Ok(())
    }
}

/// One projection call's parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub horizon: Horizon,
    pub mode: ProjectionMode,
    #[serde(default)]
    pub granularity: Granularity,
}

impl ProjectionRequest {
    pub fn new(horizon: Horizon, mode: ProjectionMode, granularity: Granularity) -> Self {
        Self { horizon, mode, granularity }
    }
}

/// Configuration for the projection engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Upper bound for `Horizon::Months`
    pub max_horizon_months: u32,

    /// Upper bound for `Horizon::Years`
    pub max_horizon_years: u32,

    /// How far before now a future projection may start
    pub max_lookback_months: u32,

    /// Treatment of interest an EMI does not cover
    pub unpaid_interest: UnpaidInterest,

    /// Thresholds for the snapshot-only payoff estimate
    pub heuristic: AggregateDropHeuristic,

    /// Relative gap between hint and computed balance that triggers a warning
    pub balance_hint_tolerance: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            max_horizon_months: 999,
            max_horizon_years: 30,
            max_lookback_months: 120, // 10 years
            unpaid_interest: UnpaidInterest::Plateau,
            heuristic: AggregateDropHeuristic::default(),
            balance_hint_tolerance: 0.05,
        }
    }
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
    composer: TimelineComposer,
    detector: MilestoneDetector,
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(ProjectionConfig::default())
    }
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        let amortization = AmortizationCalculator::new(config.unpaid_interest);
        Self {
            config,
            composer: TimelineComposer::new(NetWorthEvaluator::new(amortization)),
            detector: MilestoneDetector::new(amortization),
        }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &NetWorthEvaluator {
        self.composer.evaluator()
    }

    /// Run a projection for one set of holdings
    ///
    /// `now` decides which months are historical, current or projected; the
    /// engine never reads the clock.
    pub fn project(
        &self,
        assets: &[Asset],
        liabilities: &[Liability],
        snapshots: &[Snapshot],
        request: &ProjectionRequest,
        now: Month,
    ) -> Result<ProjectionResult, ValidationError> {
        request.horizon.validate(&self.config)?;
        for asset in assets {
            asset.validate()?;
        }
        for liability in liabilities {
            liability.validate()?;
        }

        let (start, end) = self.window(request, assets, liabilities, snapshots, now)?;
        let snapshots: &[Snapshot] = if request.mode.uses_snapshots() { snapshots } else { &[] };
        info!(
            "projecting {:?} {}..={} as of {} ({} assets, {} liabilities, {} snapshots)",
            request.mode,
            start,
            end,
            now,
            assets.len(),
            liabilities.len(),
            snapshots.len()
        );

        let warnings = self.integrity_warnings(liabilities, now);

        // Milestones and cash flow run at month resolution; resampling comes last
        let monthly = self.composer.compose_monthly(assets, liabilities, snapshots, start, end, now);
        let milestones = self.detector.detect(&monthly, liabilities);
        let estimated_payoffs = self.config.heuristic.detect(&monthly);
        let monthly = cash_flow::annotate(monthly, &milestones.payoff_events);

        let evaluator = self.evaluator();
        let active_loan_count = liabilities
            .iter()
            .filter(|l| evaluator.liability_balance(l, now) > 0.0)
            .count();

        let insights = ProjectionInsights::new(
            &monthly,
            &milestones.payoff_events,
            milestones.crossover_month,
            assets.len(),
            liabilities.len(),
            active_loan_count,
            now,
        );
        let total_cash_flow_improvement = cash_flow::total_improvement(&milestones.payoff_events);

        debug!(
            "{} payoff events, {} estimated from snapshots, crossover {:?}",
            milestones.payoff_events.len(),
            estimated_payoffs.len(),
            milestones.crossover_month
        );

        Ok(ProjectionResult {
            as_of: now,
            mode: request.mode,
            granularity: request.granularity,
            start_month: start,
            end_month: end,
            timeline: resample(monthly, request.granularity),
            payoff_events: milestones.payoff_events,
            crossover_month: milestones.crossover_month,
            total_cash_flow_improvement,
            insights,
            liability_outlooks: milestones.outlooks,
            estimated_payoffs,
            warnings,
        })
    }

    /// Inclusive month window for a request
    ///
    /// Rejects windows reaching outside years 0000-9999, which could not be
    /// written back as `YYYY-MM`.
    pub fn window(
        &self,
        request: &ProjectionRequest,
        assets: &[Asset],
        liabilities: &[Liability],
        snapshots: &[Snapshot],
        now: Month,
    ) -> Result<(Month, Month), ValidationError> {
        let horizon = request.horizon.months() as i32;
        let shift = |months: i32| {
            now.checked_add_months(months)
                .ok_or_else(|| ValidationError::WindowOutOfRange {
                    now: now.to_string(),
                    months,
                })
        };

        match request.mode {
            ProjectionMode::Historical | ProjectionMode::Dynamic => Ok((shift(1 - horizon)?, now)),
            ProjectionMode::Future => {
                let earliest = assets
                    .iter()
                    .map(|a| a.start_month)
                    .chain(liabilities.iter().map(|l| l.start_month))
                    .chain(snapshots.iter().map(|s| s.month))
                    .min()
                    .unwrap_or(now);
                let floor = now
                    .checked_add_months(-(self.config.max_lookback_months as i32))
                    .unwrap_or(Month::MIN);
                Ok((earliest.max(floor).min(now), shift(horizon)?))
            }
        }
    }

    /// Flag liabilities whose terms cannot retire them as scheduled
    pub fn integrity_warnings(&self, liabilities: &[Liability], now: Month) -> Vec<ProjectionWarning> {
        let evaluator = self.evaluator();
        let amortization = evaluator.amortization();
        let mut warnings = Vec::new();

        for liability in liabilities {
            let issue = if amortization.is_negatively_amortizing(liability) {
                Some(IntegrityIssue::NegativeAmortization {
                    monthly_interest: liability.principal * liability.monthly_rate(),
                    emi_amount: liability.emi_amount,
                })
            } else {
                amortization
                    .shortfall_at_tenure(liability)
                    .map(|balance_at_tenure| IntegrityIssue::ExceedsTenure { balance_at_tenure })
            };
            if let Some(issue) = issue {
                warn!("liability '{}': {:?}", liability.id, issue);
                warnings.push(ProjectionWarning {
                    liability_id: liability.id.clone(),
                    issue,
                });
            }

            if let Some(hint) = liability.current_balance_hint {
                let computed = evaluator.liability_balance(liability, now);
                let gap = (computed - hint).abs();
                if gap > self.config.balance_hint_tolerance * hint.abs().max(1.0) {
                    warn!(
                        "liability '{}': computed balance {:.2} differs from reported {:.2}",
                        liability.id, computed, hint
                    );
                    warnings.push(ProjectionWarning {
                        liability_id: liability.id.clone(),
                        issue: IntegrityIssue::BalanceHintMismatch { hint, computed },
                    });
                }
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::point::PointSource;
    use crate::projection::milestones::PayoffStatus;
    use approx::assert_abs_diff_eq;

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    const NOW: &str = "2026-10";

    fn now() -> Month {
        month(NOW)
    }

    fn scenario() -> (Vec<Asset>, Vec<Liability>) {
        let start = now().add_months(-24);
        (
            vec![Asset::lump_sum("house", 5_000_000.0, 6.0, start)],
            vec![Liability::new("home", 2_500_000.0, 8.5, 21_714.0, start, 180).with_name("Home loan")],
        )
    }

    fn future(months: u32) -> ProjectionRequest {
        ProjectionRequest::new(Horizon::Months(months), ProjectionMode::Future, Granularity::Month)
    }

    #[test]
    fn test_end_to_end_future_scenario() {
        let (assets, liabilities) = scenario();
        let result = ProjectionEngine::default()
            .project(&assets, &liabilities, &[], &future(60), now())
            .unwrap();

        assert_eq!(result.start_month, now().add_months(-24));
        assert_eq!(result.end_month, now().add_months(60));
        assert_eq!(result.timeline.len(), 85);

        for pair in result.timeline.windows(2) {
            assert!(pair[1].liabilities < pair[0].liabilities);
            assert!(pair[1].net_worth > pair[0].net_worth);
        }
        assert!(result
            .payoff_events
            .iter()
            .all(|e| e.month >= now().add_months(156)));
        assert!(result.payoff_events.is_empty());
        assert!(matches!(
            result.liability_outlooks[0].payoff,
            PayoffStatus::NotFoundWithinHorizon { .. }
        ));

        let last = result.final_point().unwrap();
        assert_eq!(result.insights.final_net_worth, last.net_worth);
        assert_abs_diff_eq!(
            result.insights.total_growth,
            last.net_worth - result.timeline[0].net_worth,
            epsilon = 1e-6
        );
        assert_eq!(result.insights.liability_count, 1);
        assert_eq!(result.insights.active_loan_count, 1);
        assert_eq!(result.crossover_month, None);
    }

    #[test]
    fn test_under_amortizing_emi_is_flagged_not_fatal() {
        // 21,714 covers interest on 2.5M at 8.5% but not the 180-month schedule
        let (assets, liabilities) = scenario();
        let result = ProjectionEngine::default()
            .project(&assets, &liabilities, &[], &future(12), now())
            .unwrap();
        assert!(result.has_warnings());
        assert!(matches!(
            result.warnings[0].issue,
            IntegrityIssue::ExceedsTenure { balance_at_tenure } if balance_at_tenure > 21_714.0
        ));
    }

    #[test]
    fn test_home_loan_retires_at_original_tenure() {
        // Started 24 months ago on a 180-month tenure: cleared 156 months from now
        let (assets, liabilities) = scenario();
        let result = ProjectionEngine::default()
            .project(&assets, &liabilities, &[], &future(160), now())
            .unwrap();

        assert_eq!(result.payoff_events.len(), 1);
        let event = &result.payoff_events[0];
        assert_eq!(event.month, now().add_months(156));
        assert_eq!(event.monthly_savings, 21_714.0);
        assert!(event.balance_cleared > 21_714.0);
        assert_eq!(result.point(now().add_months(156)).unwrap().liabilities, 0.0);
        assert_eq!(result.point(now().add_months(155)).unwrap().cumulative_cash_flow_improvement, 0.0);
        assert_eq!(result.final_point().unwrap().cumulative_cash_flow_improvement, 21_714.0);
        assert_eq!(
            result.liability_outlooks[0].payoff,
            PayoffStatus::PaidOff { month: now().add_months(156) }
        );
        // The written-off residual is still reported
        assert!(matches!(result.warnings[0].issue, IntegrityIssue::ExceedsTenure { .. }));
    }

    #[test]
    fn test_negative_amortization_is_reported() {
        let start = now().add_months(-12);
        let liabilities = vec![Liability::new("bridge", 1_000_000.0, 12.0, 5_000.0, start, 24)];
        let result = ProjectionEngine::default()
            .project(&[], &liabilities, &[], &future(24), now())
            .unwrap();

        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].liability_id, "bridge");
        match result.warnings[0].issue {
            IntegrityIssue::NegativeAmortization {
                monthly_interest,
                emi_amount,
            } => {
                assert_abs_diff_eq!(monthly_interest, 10_000.0, epsilon = 1e-6);
                assert_eq!(emi_amount, 5_000.0);
            }
            ref other => panic!("unexpected issue {:?}", other),
        }
        // Plateau: balance neither falls nor grows, even past tenure
        assert!(result.timeline.iter().all(|p| p.liabilities == 1_000_000.0));
        assert!(result.payoff_events.is_empty());
    }

    #[test]
    fn test_capitalized_interest_grows_the_balance() {
        let start = now().add_months(-12);
        let liabilities = vec![Liability::new("bridge", 1_000_000.0, 12.0, 5_000.0, start, 24)];
        let engine = ProjectionEngine::new(ProjectionConfig {
            unpaid_interest: UnpaidInterest::Capitalize,
            ..Default::default()
        });
        let result = engine.project(&[], &liabilities, &[], &future(24), now()).unwrap();

        for pair in result.timeline.windows(2) {
            assert!(pair[1].liabilities > pair[0].liabilities);
        }
        assert!(matches!(
            result.warnings[0].issue,
            IntegrityIssue::NegativeAmortization { .. }
        ));
        assert!(matches!(
            result.liability_outlooks[0].payoff,
            PayoffStatus::NotFoundWithinHorizon { remaining_balance } if remaining_balance > 1_000_000.0
        ));
        assert!(result.insights.final_net_worth < -1_000_000.0);
    }

    #[test]
    fn test_window_past_year_9999_is_rejected() {
        let late = month("9990-01");
        let engine = ProjectionEngine::default();
        let err = engine.project(&[], &[], &[], &future(999), late).unwrap_err();
        assert!(matches!(err, ValidationError::WindowOutOfRange { .. }));

        let result = engine.project(&[], &[], &[], &future(119), late).unwrap();
        assert_eq!(result.end_month, month("9999-12"));

        let early = month("0001-06");
        let request = ProjectionRequest::new(Horizon::Years(30), ProjectionMode::Historical, Granularity::Year);
        assert!(engine.project(&[], &[], &[], &request, early).is_err());
    }

    #[test]
    fn test_flags_relative_to_now() {
        let (assets, liabilities) = scenario();
        let result = ProjectionEngine::default()
            .project(&assets, &liabilities, &[], &future(6), now())
            .unwrap();

        let current = result.point(now()).unwrap();
        assert_eq!(current.source, PointSource::Live);
        assert!(!current.is_historical && !current.is_projected);
        assert!(result.point(now().prev()).unwrap().is_historical);
        assert!(result.point(now().next()).unwrap().is_projected);
    }

    #[test]
    fn test_payoff_and_cash_flow_in_window() {
        let start = now().add_months(-6);
        let liabilities = vec![
            Liability::new("car", 120_000.0, 12.0, 11_098.0, start, 12),
            Liability::new("phone", 6_000.0, 0.0, 1_000.0, start, 6),
        ];
        let assets = vec![Asset::recurring("sip", 20_000.0, 12.0, start)];

        let result = ProjectionEngine::default()
            .project(&assets, &liabilities, &[], &future(24), now())
            .unwrap();

        let months: Vec<Month> = result.payoff_events.iter().map(|e| e.month).collect();
        assert_eq!(months, vec![now(), start.add_months(12)]);
        assert_eq!(result.total_cash_flow_improvement, 12_098.0);
        assert_eq!(result.final_point().unwrap().cumulative_cash_flow_improvement, 12_098.0);

        // phone clears this month, so it is the quickest and no longer active
        assert_eq!(result.insights.quickest_payoff.as_ref().unwrap().liability_id, "phone");
        assert_eq!(result.insights.months_to_quickest_payoff, Some(0));
        assert_eq!(result.insights.active_loan_count, 1);
        assert_eq!(result.point(now()).unwrap().payoff_event.as_ref().unwrap().liability_id, "phone");
    }

    #[test]
    fn test_crossover_found_when_debt_is_repaid() {
        let start = now().add_months(-1);
        let liabilities = vec![Liability::new("loan", 100_000.0, 0.0, 10_000.0, start, 10)];
        let assets = vec![Asset::recurring("savings", 5_000.0, 0.0, start)];

        let result = ProjectionEngine::default()
            .project(&assets, &liabilities, &[], &future(12), now())
            .unwrap();

        // net worth at elapsed n: 5000n - (100000 - 10000n) = 15000n - 100000
        assert_eq!(result.crossover_month, Some(start.add_months(7)));
        assert_eq!(result.insights.months_to_crossover, Some(6));
    }

    #[test]
    fn test_historical_uses_snapshots_dynamic_ignores_them() {
        let (assets, liabilities) = scenario();
        let recorded = now().add_months(-3);
        let snapshots = vec![Snapshot::new(recorded, 1.0, 0.0, 0.0)];
        let engine = ProjectionEngine::default();

        let request = ProjectionRequest::new(Horizon::Months(6), ProjectionMode::Historical, Granularity::Month);
        let historical = engine.project(&assets, &liabilities, &snapshots, &request, now()).unwrap();
        assert_eq!(historical.start_month, now().add_months(-5));
        assert_eq!(historical.end_month, now());
        assert_eq!(historical.point(recorded).unwrap().source, PointSource::Snapshot);
        assert_eq!(historical.point(recorded).unwrap().net_worth, 1.0);

        let request = ProjectionRequest { mode: ProjectionMode::Dynamic, ..request };
        let dynamic = engine.project(&assets, &liabilities, &snapshots, &request, now()).unwrap();
        assert_eq!(dynamic.point(recorded).unwrap().source, PointSource::Reconstructed);
        assert!(dynamic.timeline.iter().all(|p| !p.is_projected));
    }

    #[test]
    fn test_estimated_payoffs_from_snapshots() {
        let m = |offset| now().add_months(offset);
        let snapshots = vec![
            Snapshot::new(m(-4), 3_000_000.0, 1_500_000.0, 0.0),
            Snapshot::new(m(-3), 3_000_000.0, 1_480_000.0, 0.0),
            Snapshot::new(m(-2), 3_000_000.0, 700_000.0, 0.0),
        ];
        let request = ProjectionRequest::new(Horizon::Months(6), ProjectionMode::Historical, Granularity::Month);
        let result = ProjectionEngine::default()
            .project(&[], &[], &snapshots, &request, now())
            .unwrap();

        assert_eq!(result.estimated_payoffs.len(), 1);
        assert_eq!(result.estimated_payoffs[0].month, m(-2));
        assert!(result.payoff_events.is_empty());
    }

    #[test]
    fn test_horizon_validation() {
        let engine = ProjectionEngine::default();
        for horizon in [Horizon::Months(0), Horizon::Months(1000), Horizon::Years(0), Horizon::Years(31)] {
            let request = ProjectionRequest::new(horizon, ProjectionMode::Future, Granularity::Year);
            let err = engine.project(&[], &[], &[], &request, now()).unwrap_err();
            assert!(matches!(err, ValidationError::HorizonOutOfRange { .. }));
        }
        let request = ProjectionRequest::new(Horizon::Years(30), ProjectionMode::Future, Granularity::Year);
        assert!(engine.project(&[], &[], &[], &request, now()).is_ok());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let assets = vec![Asset::lump_sum("bad", 1_000.0, -2.0, now())];
        let err = ProjectionEngine::default()
            .project(&assets, &[], &[], &future(12), now())
            .unwrap_err();
        assert!(matches!(err, ValidationError::NegativeValue { .. }));
    }

    #[test]
    fn test_future_window_lookback_is_clamped() {
        let assets = vec![Asset::lump_sum("old", 1_000.0, 5.0, month("1990-01"))];
        let engine = ProjectionEngine::default();
        let (start, end) = engine.window(&future(12), &assets, &[], &[], now()).unwrap();
        assert_eq!(start, now().add_months(-120));
        assert_eq!(end, now().add_months(12));

        let later = vec![Asset::lump_sum("new", 1_000.0, 5.0, now().add_months(5))];
        let (start, _) = engine.window(&future(12), &later, &[], &[], now()).unwrap();
        assert_eq!(start, now());
    }

    #[test]
    fn test_year_granularity_keeps_totals() {
        let (assets, liabilities) = scenario();
        let engine = ProjectionEngine::default();
        let monthly = engine.project(&assets, &liabilities, &[], &future(60), now()).unwrap();
        let request = ProjectionRequest::new(Horizon::Years(5), ProjectionMode::Future, Granularity::Year);
        let yearly = engine.project(&assets, &liabilities, &[], &request, now()).unwrap();

        assert_eq!(yearly.end_month, monthly.end_month);
        assert_eq!(yearly.insights, monthly.insights);
        for point in &yearly.timeline {
            assert!(point.month.is_december() || point.month == yearly.end_month);
            assert_eq!(monthly.point(point.month), Some(point));
        }
    }

    #[test]
    fn test_balance_hint_mismatch_warning() {
        let start = now().add_months(-12);
        let loan = Liability::new("car", 120_000.0, 0.0, 1_000.0, start, 120);
        let engine = ProjectionEngine::default();

        let close = loan.clone().with_balance_hint(108_500.0);
        assert!(engine.integrity_warnings(&[close], now()).is_empty());

        let far = loan.with_balance_hint(60_000.0);
        let warnings = engine.integrity_warnings(&[far], now());
        assert_eq!(
            warnings[0].issue,
            IntegrityIssue::BalanceHintMismatch {
                hint: 60_000.0,
                computed: 108_000.0
            }
        );
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Future".parse::<ProjectionMode>().unwrap(), ProjectionMode::Future);
        assert!("someday".parse::<ProjectionMode>().is_err());
    }
}
