//! Stitches snapshots, live reconstruction and projections into one series
//!
//! The month-level series is always computed first. A yearly view is a filter
//! over it, so both views agree wherever they share a month.

use std::collections::BTreeMap;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::holdings::{Asset, Liability};
use crate::month::Month;
use crate::repository::Snapshot;

use super::evaluator::NetWorthEvaluator;
use super::point::{PointSource, TimelinePoint};

/// Output resolution of a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Month,
    Year,
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "month" | "monthly" => Ok(Granularity::Month),
            "year" | "yearly" => Ok(Granularity::Year),
            other => Err(ValidationError::UnknownVariant {
                field: "granularity",
                value: other.to_string(),
            }),
        }
    }
}

/// Builds ordered net worth timelines
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineComposer {
    evaluator: NetWorthEvaluator,
}

impl TimelineComposer {
    pub fn new(evaluator: NetWorthEvaluator) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &NetWorthEvaluator {
        &self.evaluator
    }

    /// Timeline over `[start, end]` at the requested granularity
    pub fn compose(
        &self,
        assets: &[Asset],
        liabilities: &[Liability],
        snapshots: &[Snapshot],
        start: Month,
        end: Month,
        granularity: Granularity,
        now: Month,
    ) -> Vec<TimelinePoint> {
        let monthly = self.compose_monthly(assets, liabilities, snapshots, start, end, now);
        resample(monthly, granularity)
    }

    /// One point per month over `[start, end]`, empty when `end < start`
    ///
    /// Months before `now` come from a snapshot when one exists and are
    /// reconstructed otherwise. `now` itself and later months are always
    /// computed from holdings.
    pub fn compose_monthly(
        &self,
        assets: &[Asset],
        liabilities: &[Liability],
        snapshots: &[Snapshot],
        start: Month,
        end: Month,
        now: Month,
    ) -> Vec<TimelinePoint> {
        let by_month: BTreeMap<Month, &Snapshot> = snapshots.iter().map(|s| (s.month, s)).collect();

        let mut from_snapshots = 0usize;
        let timeline: Vec<TimelinePoint> = self
            .evaluator
            .evaluate_range(assets, liabilities, start, end)
            .into_iter()
            .map(|point| {
                if point.month < now {
                    if let Some(snapshot) = by_month.get(&point.month) {
                        from_snapshots += 1;
                        return TimelinePoint::from_snapshot(snapshot);
                    }
                    return point.with_source(PointSource::Reconstructed);
                }

                let source = if point.month == now {
                    PointSource::Live
                } else {
                    PointSource::Projected
                };
                point.with_source(source)
            })
            .collect();

        debug!(
            "composed {} months {}..={} ({} from snapshots)",
            timeline.len(),
            start,
            end,
            from_snapshots
        );
        timeline
    }
}

/// Reduce a month-level timeline to the requested granularity
///
/// Yearly output keeps each December plus the final month of the series.
pub fn resample(monthly: Vec<TimelinePoint>, granularity: Granularity) -> Vec<TimelinePoint> {
    match granularity {
        Granularity::Month => monthly,
        Granularity::Year => {
            let last = monthly.len().saturating_sub(1);
            monthly
                .into_iter()
                .enumerate()
                .filter(|(i, p)| p.month.is_december() || *i == last)
                .map(|(_, p)| p)
                .collect()
        }
    }
}
