//! Loan payoff and net worth crossover detection
//!
//! Payoffs are found by re-deriving each liability's own balance, never by
//! reading drops in the aggregate liability total. See `heuristic` for the
//! aggregate-only fallback.

use serde::{Deserialize, Serialize};

use crate::calculators::AmortizationCalculator;
use crate::holdings::Liability;
use crate::month::{months_between, Month};

use super::point::{PayoffEvent, TimelinePoint};

/// Payoff search outcome for one liability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayoffStatus {
    /// Balance reaches zero inside the timeline
    PaidOff { month: Month },
    /// Balance was already zero when the timeline starts
    ClearedBeforeWindow,
    /// Still outstanding at the last month of the timeline
    NotFoundWithinHorizon { remaining_balance: f64 },
    /// Loan starts after the timeline ends
    NotStarted,
}

/// Payoff status per liability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityOutlook {
    pub liability_id: String,
    pub name: String,
    #[serde(flatten)]
    pub payoff: PayoffStatus,
}

/// Everything the detector found in one timeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Milestones {
    /// Chronological
    pub payoff_events: Vec<PayoffEvent>,
    pub crossover_month: Option<Month>,
    pub outlooks: Vec<LiabilityOutlook>,
}

/// Scans a composed timeline for milestones
#[derive(Debug, Clone, Copy, Default)]
pub struct MilestoneDetector {
    amortization: AmortizationCalculator,
}

impl MilestoneDetector {
    pub fn new(amortization: AmortizationCalculator) -> Self {
        Self { amortization }
    }

    pub fn detect(&self, timeline: &[TimelinePoint], liabilities: &[Liability]) -> Milestones {
        let mut payoff_events = Vec::new();
        let mut outlooks = Vec::with_capacity(liabilities.len());

        for liability in liabilities {
            let (event, status) = self.search_payoff(liability, timeline);
            if let Some(event) = event {
                payoff_events.push(event);
            }
            outlooks.push(LiabilityOutlook {
                liability_id: liability.id.clone(),
                name: liability.name.clone(),
                payoff: status,
            });
        }

        payoff_events.sort_by(|a, b| a.month.cmp(&b.month).then_with(|| a.liability_id.cmp(&b.liability_id)));

        Milestones {
            payoff_events,
            crossover_month: crossover_month(timeline),
            outlooks,
        }
    }

    /// First timeline month where this liability's balance turns zero after
    /// being positive
    ///
    /// Expects an ascending timeline. Other orders give meaningless results
    /// but never index past the computed schedule.
    fn search_payoff(&self, liability: &Liability, timeline: &[TimelinePoint]) -> (Option<PayoffEvent>, PayoffStatus) {
        let last_elapsed = match timeline
            .iter()
            .map(|p| months_between(liability.start_month, p.month))
            .max()
        {
            Some(elapsed) if elapsed >= 0 => elapsed,
            _ => return (None, PayoffStatus::NotStarted),
        };

        let schedule = self.amortization.schedule(liability, last_elapsed as u32);
        let balance_at = |elapsed: i32| schedule[elapsed as usize].balance;

        let mut previous: Option<f64> = None;
        for point in timeline {
            let elapsed = months_between(liability.start_month, point.month);
            if elapsed < 0 {
                continue;
            }
            let balance = balance_at(elapsed);
            let before = previous.unwrap_or_else(|| if elapsed > 0 { balance_at(elapsed - 1) } else { 0.0 });

            if balance <= 0.0 && before > 0.0 {
                let event = PayoffEvent {
                    liability_id: liability.id.clone(),
                    name: liability.name.clone(),
                    month: point.month,
                    balance_cleared: before,
                    monthly_savings: liability.emi_amount,
                };
                return (Some(event), PayoffStatus::PaidOff { month: point.month });
            }
            if previous.is_none() && balance <= 0.0 {
                return (None, PayoffStatus::ClearedBeforeWindow);
            }
            previous = Some(balance);
        }

        (
            None,
            PayoffStatus::NotFoundWithinHorizon {
                remaining_balance: balance_at(last_elapsed),
            },
        )
    }
}

/// First month with non-negative net worth whose predecessor was negative
///
/// `None` both when net worth never goes negative in the timeline and when it
/// never recovers within it.
pub fn crossover_month(timeline: &[TimelinePoint]) -> Option<Month> {
    timeline
        .windows(2)
        .find(|pair| pair[0].net_worth < 0.0 && pair[1].net_worth >= 0.0)
        .map(|pair| pair[1].month)
}
