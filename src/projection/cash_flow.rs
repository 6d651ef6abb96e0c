//! Monthly cash flow freed up by loan payoffs

use std::collections::BTreeMap;

use crate::month::Month;

use super::point::{PayoffEvent, TimelinePoint};

/// Attach payoff events and freed-up EMIs to each point
///
/// Net worth figures are left untouched. The cumulative total is a running sum
/// and never decreases.
pub fn annotate(mut timeline: Vec<TimelinePoint>, payoff_events: &[PayoffEvent]) -> Vec<TimelinePoint> {
    let mut by_month: BTreeMap<Month, Vec<&PayoffEvent>> = BTreeMap::new();
    for event in payoff_events {
        by_month.entry(event.month).or_default().push(event);
    }

    let mut cumulative = 0.0;
    for point in &mut timeline {
        let events = by_month.get(&point.month).map(Vec::as_slice).unwrap_or(&[]);

        point.cash_flow_improvement = events.iter().map(|e| e.monthly_savings).sum();
        cumulative += point.cash_flow_improvement;
        point.cumulative_cash_flow_improvement = cumulative;

        point.payoff_event = events
            .iter()
            .max_by(|a, b| a.monthly_savings.total_cmp(&b.monthly_savings))
            .map(|e| (*e).clone());
    }

    timeline
}

/// Sum of EMIs freed up by all events
pub fn total_improvement(payoff_events: &[PayoffEvent]) -> f64 {
    payoff_events.iter().map(|e| e.monthly_savings).sum()
}
