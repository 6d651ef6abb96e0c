//! Approximate payoff detection from aggregate snapshot totals
//!
//! Snapshots only record total liabilities, so individual loans cannot be
//! identified in them. A large month-over-month drop in the total is taken as
//! a likely payoff. Results are estimates and are reported apart from the exact
//! payoff events.

use serde::{Deserialize, Serialize};

use crate::month::Month;

use super::point::{PointSource, TimelinePoint};

/// Absolute drop that always counts as significant unless 20% of the prior total is larger
pub const DEFAULT_ABSOLUTE_DROP: f64 = 100_000.0;
pub const DEFAULT_RELATIVE_DROP: f64 = 0.20;

/// A month whose aggregate liabilities fell sharply. Never exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedPayoff {
    pub month: Month,
    pub liabilities_before: f64,
    pub liabilities_after: f64,
    pub drop: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateDropHeuristic {
    pub absolute_threshold: f64,
    pub relative_threshold: f64,
}

impl Default for AggregateDropHeuristic {
    fn default() -> Self {
        Self {
            absolute_threshold: DEFAULT_ABSOLUTE_DROP,
            relative_threshold: DEFAULT_RELATIVE_DROP,
        }
    }
}

impl AggregateDropHeuristic {
    /// Drop a month must exceed to be flagged
    pub fn threshold(&self, prior_liabilities: f64) -> f64 {
        self.absolute_threshold.max(self.relative_threshold * prior_liabilities)
    }

    /// Flag sharp drops between consecutive snapshot-sourced months
    ///
    /// Points computed from holdings are skipped: their payoffs are known exactly.
    pub fn detect(&self, timeline: &[TimelinePoint]) -> Vec<EstimatedPayoff> {
        timeline
            .windows(2)
            .filter(|pair| {
                pair[0].source == PointSource::Snapshot
                    && pair[1].source == PointSource::Snapshot
                    && pair[0].month.next() == pair[1].month
            })
            .filter_map(|pair| {
                let (before, after) = (pair[0].liabilities, pair[1].liabilities);
                let drop = before - after;
                (drop > self.threshold(before)).then(|| EstimatedPayoff {
                    month: pair[1].month,
                    liabilities_before: before,
                    liabilities_after: after,
                    drop,
                })
            })
            .collect()
    }
}
