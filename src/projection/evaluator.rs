//! Point-in-time net worth from holdings

use crate::calculators::{appreciated_value, future_value, AmortizationCalculator};
use crate::holdings::{Asset, AssetKind, Liability};
use crate::month::{months_between, Month};

use super::point::TimelinePoint;

/// Aggregates every holding into one month's net worth
#[derive(Debug, Clone, Copy, Default)]
pub struct NetWorthEvaluator {
    amortization: AmortizationCalculator,
}

impl NetWorthEvaluator {
    pub fn new(amortization: AmortizationCalculator) -> Self {
        Self { amortization }
    }

    pub fn amortization(&self) -> &AmortizationCalculator {
        &self.amortization
    }

    /// Value of one asset in `target`; 0 before it starts
    pub fn asset_value(&self, asset: &Asset, target: Month) -> f64 {
        let elapsed = months_between(asset.start_month, target);
        match asset.kind {
            AssetKind::LumpSum => appreciated_value(asset.amount, asset.annual_growth_rate, elapsed),
            AssetKind::Recurring => future_value(asset.amount, asset.annual_growth_rate, elapsed),
        }
    }

    /// Outstanding balance of one liability in `target`; 0 before it is taken
    pub fn liability_balance(&self, liability: &Liability, target: Month) -> f64 {
        let elapsed = months_between(liability.start_month, target);
        if elapsed < 0 {
            return 0.0;
        }
        self.amortization.balance_at(liability, elapsed as u32).balance
    }

    /// Balance of one liability for each month of `[start, end]`
    ///
    /// Steps a single schedule across the window, so the cost follows the
    /// window rather than re-amortizing from the loan start every month.
    pub fn liability_balances(&self, liability: &Liability, start: Month, end: Month) -> Vec<f64> {
        let mut amortizer = self.amortization.amortizer(liability);
        start
            .range_inclusive(end)
            .map(|month| {
                let elapsed = months_between(liability.start_month, month);
                if elapsed < 0 {
                    0.0
                } else {
                    amortizer.advance_to(elapsed as u32).balance
                }
            })
            .collect()
    }

    /// Totals for `target`. The returned point carries no historical/projected flags.
    pub fn evaluate(&self, assets: &[Asset], liabilities: &[Liability], target: Month) -> TimelinePoint {
        let (total_assets, liquid_assets) = self.asset_totals(assets, target);

        let total_liabilities: f64 = liabilities
            .iter()
            .filter(|l| months_between(l.start_month, target) >= 0)
            .map(|l| self.liability_balance(l, target))
            .sum();

        TimelinePoint::new(target, total_assets, total_liabilities, liquid_assets)
    }

    /// `evaluate` for every month of `[start, end]`, empty when `end < start`
    pub fn evaluate_range(
        &self,
        assets: &[Asset],
        liabilities: &[Liability],
        start: Month,
        end: Month,
    ) -> Vec<TimelinePoint> {
        let balances: Vec<Vec<f64>> = liabilities
            .iter()
            .map(|l| self.liability_balances(l, start, end))
            .collect();

        start
            .range_inclusive(end)
            .enumerate()
            .map(|(i, month)| {
                let (total_assets, liquid_assets) = self.asset_totals(assets, month);
                let total_liabilities: f64 = balances.iter().map(|b| b[i]).sum();
                TimelinePoint::new(month, total_assets, total_liabilities, liquid_assets)
            })
            .collect()
    }

    /// Total and liquid asset value in `target`
    fn asset_totals(&self, assets: &[Asset], target: Month) -> (f64, f64) {
        let mut total = 0.0;
        let mut liquid = 0.0;
        for asset in assets {
            if months_between(asset.start_month, target) < 0 {
                continue;
            }
            let value = self.asset_value(asset, target);
            total += value;
            if asset.liquid {
                liquid += value;
            }
        }
        (total, liquid)
    }
}
