//! Fixed-payment loan amortization
//!
//! Balances are rolled forward one month at a time rather than through the
//! closed-form annuity formula, so the final partial EMI clamps the balance at
//! exactly zero instead of overshooting below it.

use serde::{Deserialize, Serialize};

use crate::holdings::Liability;

/// What happens to interest the EMI does not cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnpaidInterest {
    /// Shortfall is not added to the balance; the balance stays flat
    #[default]
    Plateau,
    /// Shortfall is capitalized and the balance grows
    Capitalize,
}

/// Loan position after a number of elapsed months
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationPosition {
    pub elapsed_months: u32,
    pub balance: f64,
    pub cumulative_principal_paid: f64,
    pub cumulative_interest_paid: f64,
}

/// Month-by-month amortization state for a single liability
#[derive(Debug, Clone)]
pub struct Amortizer<'a> {
    liability: &'a Liability,
    unpaid_interest: UnpaidInterest,
    monthly_rate: f64,
    /// EMI covers interest, so the balance is written off at tenure end
    clamp_at_tenure: bool,
    position: AmortizationPosition,
}

impl<'a> Amortizer<'a> {
    pub fn new(liability: &'a Liability, unpaid_interest: UnpaidInterest) -> Self {
        Self {
            clamp_at_tenure: !negatively_amortizing(liability),
            ..Self::unclamped(liability, unpaid_interest)
        }
    }

    fn unclamped(liability: &'a Liability, unpaid_interest: UnpaidInterest) -> Self {
        Self {
            liability,
            unpaid_interest,
            monthly_rate: liability.monthly_rate(),
            clamp_at_tenure: false,
            position: AmortizationPosition {
                elapsed_months: 0,
                balance: liability.principal,
                cumulative_principal_paid: 0.0,
                cumulative_interest_paid: 0.0,
            },
        }
    }

    pub fn position(&self) -> AmortizationPosition {
        self.position
    }

    /// Apply one EMI and return the new position
    pub fn advance_month(&mut self) -> AmortizationPosition {
        let pos = &mut self.position;
        pos.elapsed_months += 1;

        if pos.balance > 0.0 {
            let interest = pos.balance * self.monthly_rate;
            let emi = self.liability.emi_amount;
            let principal_component = emi - interest;

            if principal_component >= 0.0 {
                // Final EMI may be partial: only the outstanding balance is retired
                let retired = principal_component.min(pos.balance);
                pos.balance = (pos.balance - principal_component).max(0.0);
                pos.cumulative_principal_paid += retired;
                pos.cumulative_interest_paid += interest;
            } else {
                pos.cumulative_interest_paid += emi;
                if self.unpaid_interest == UnpaidInterest::Capitalize {
                    pos.balance += -principal_component;
                }
            }
        }

        if self.clamp_at_tenure
            && pos.elapsed_months >= self.liability.original_tenure_months
            && pos.balance > 0.0
        {
            pos.cumulative_principal_paid += pos.balance;
            pos.balance = 0.0;
        }

        *pos
    }

    /// Step forward until `elapsed_months` is reached
    ///
    /// Settled states are skipped in O(1): a cleared balance stays cleared,
    /// and a plateaued balance only accrues the EMI as interest.
    pub fn advance_to(&mut self, elapsed_months: u32) -> AmortizationPosition {
        while self.position.elapsed_months < elapsed_months {
            let remaining = elapsed_months - self.position.elapsed_months;
            if self.position.balance <= 0.0 {
                self.position.elapsed_months = elapsed_months;
                break;
            }
            if self.is_plateaued() {
                self.position.cumulative_interest_paid += self.liability.emi_amount * remaining as f64;
                self.position.elapsed_months = elapsed_months;
                break;
            }
            self.advance_month();
        }
        self.position
    }

    fn is_plateaued(&self) -> bool {
        self.unpaid_interest == UnpaidInterest::Plateau
            && self.liability.emi_amount <= self.position.balance * self.monthly_rate
    }
}

/// EMI does not cover the first month's interest
fn negatively_amortizing(liability: &Liability) -> bool {
    liability.principal > 0.0 && liability.emi_amount <= liability.principal * liability.monthly_rate()
}

/// Amortization calculator with a configured unpaid-interest policy
#[derive(Debug, Clone, Copy, Default)]
pub struct AmortizationCalculator {
    pub unpaid_interest: UnpaidInterest,
}

impl AmortizationCalculator {
    pub fn new(unpaid_interest: UnpaidInterest) -> Self {
        Self { unpaid_interest }
    }

    /// Stepping state positioned at elapsed month 0
    pub fn amortizer<'a>(&self, liability: &'a Liability) -> Amortizer<'a> {
        Amortizer::new(liability, self.unpaid_interest)
    }

    /// Position after `elapsed_months` EMIs
    ///
    /// Once `elapsed_months` reaches the original tenure the balance is zero
    /// for every loan whose EMI covers its interest, whatever residual the
    /// schedule leaves. Negatively amortizing loans follow `unpaid_interest`.
    pub fn balance_at(&self, liability: &Liability, elapsed_months: u32) -> AmortizationPosition {
        self.amortizer(liability).advance_to(elapsed_months)
    }

    /// Positions for elapsed months `0..=months`
    pub fn schedule(&self, liability: &Liability, months: u32) -> Vec<AmortizationPosition> {
        let mut amortizer = self.amortizer(liability);
        let mut schedule = Vec::with_capacity(months as usize + 1);
        schedule.push(amortizer.position());
        for _ in 0..months {
            schedule.push(amortizer.advance_month());
        }
        schedule
    }

    /// EMI does not even cover the first month's interest
    pub fn is_negatively_amortizing(&self, liability: &Liability) -> bool {
        negatively_amortizing(liability)
    }

    /// Balance written off at tenure end when the schedule leaves more than
    /// one EMI outstanding; `None` for loans that retire on schedule and for
    /// negatively amortizing loans, which are never written off
    pub fn shortfall_at_tenure(&self, liability: &Liability) -> Option<f64> {
        if negatively_amortizing(liability) {
            return None;
        }
        let mut unclamped = Amortizer::unclamped(liability, self.unpaid_interest);
        let residual = unclamped.advance_to(liability.original_tenure_months).balance;
        (residual > liability.emi_amount).then_some(residual)
    }
}

/// `balance_at` with the default plateau policy
pub fn balance_at(liability: &Liability, elapsed_months: u32) -> AmortizationPosition {
    AmortizationCalculator::default().balance_at(liability, elapsed_months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn loan(principal: f64, rate: f64, emi: f64, tenure: u32) -> Liability {
        Liability::new("loan", principal, rate, emi, "2024-01".parse().unwrap(), tenure)
    }

    #[test]
    fn test_payoff_exactness() {
        let l = loan(120_000.0, 12.0, 11_098.0, 12);
        assert_abs_diff_eq!(balance_at(&l, 12).balance, 0.0, epsilon = 1.0);
        assert!(balance_at(&l, 11).balance > 1.0);
    }

    #[test]
    fn test_first_month_split() {
        let l = loan(120_000.0, 12.0, 11_098.0, 12);
        let pos = balance_at(&l, 1);
        assert_abs_diff_eq!(pos.cumulative_interest_paid, 1200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.cumulative_principal_paid, 9898.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.balance, 110_102.0, epsilon = 1e-9);
    }

    #[test]
    fn test_monotone_and_zero_at_tenure() {
        let l = loan(2_500_000.0, 8.5, 24_618.0, 180);
        let schedule = AmortizationCalculator::default().schedule(&l, 200);
        for pair in schedule.windows(2) {
            assert!(pair[1].balance <= pair[0].balance);
        }
        assert_eq!(schedule[180].balance, 0.0);
        assert_eq!(schedule[200].balance, 0.0);
        assert_abs_diff_eq!(schedule[200].cumulative_principal_paid, 2_500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rounding_drift_clamped_at_tenure() {
        // Standard EMI is ~10661.85; rounding it down leaves a small residual
        let l = loan(120_000.0, 12.0, 10_661.0, 12);
        assert!(balance_at(&l, 11).balance > 10_000.0);
        assert_eq!(balance_at(&l, 12).balance, 0.0);
        assert_eq!(AmortizationCalculator::default().shortfall_at_tenure(&l), None);
    }

    #[test]
    fn test_zero_rate_loan() {
        let l = loan(12_000.0, 0.0, 1_000.0, 12);
        assert_abs_diff_eq!(balance_at(&l, 6).balance, 6_000.0, epsilon = 1e-9);
        assert_eq!(balance_at(&l, 12).balance, 0.0);
        assert_eq!(balance_at(&l, 12).cumulative_interest_paid, 0.0);
    }

    #[test]
    fn test_negative_amortization_plateaus() {
        // Interest on 1,000,000 at 12% is 10,000/month; EMI of 5,000 never dents it
        let l = loan(1_000_000.0, 12.0, 5_000.0, 24);
        let calc = AmortizationCalculator::default();
        assert!(calc.is_negatively_amortizing(&l));
        assert_eq!(calc.balance_at(&l, 24).balance, 1_000_000.0);
        assert_eq!(calc.balance_at(&l, 600).balance, 1_000_000.0);
        assert_abs_diff_eq!(calc.balance_at(&l, 600).cumulative_interest_paid, 3_000_000.0, epsilon = 1e-6);
        // Never written off, so there is no tenure shortfall either
        assert_eq!(calc.shortfall_at_tenure(&l), None);
    }

    #[test]
    fn test_negative_amortization_capitalizes() {
        let l = loan(1_000_000.0, 12.0, 5_000.0, 24);
        let calc = AmortizationCalculator::new(UnpaidInterest::Capitalize);
        let one = calc.balance_at(&l, 1).balance;
        assert_abs_diff_eq!(one, 1_005_000.0, epsilon = 1e-6);
        assert!(calc.balance_at(&l, 24).balance > one);
    }

    #[test]
    fn test_slow_amortization_is_written_off_at_tenure() {
        // Covers interest but leaves far more than one EMI outstanding at tenure
        let l = loan(1_000_000.0, 12.0, 12_000.0, 24);
        let calc = AmortizationCalculator::default();
        assert!(!calc.is_negatively_amortizing(&l));
        let shortfall = calc.shortfall_at_tenure(&l).unwrap();
        assert!(shortfall > 12_000.0);
        assert_abs_diff_eq!(calc.balance_at(&l, 23).balance, calc.schedule(&l, 23)[23].balance, epsilon = 1e-9);
        assert!(calc.balance_at(&l, 23).balance > shortfall - 12_000.0);
        assert_eq!(calc.balance_at(&l, 24).balance, 0.0);
        assert_eq!(calc.balance_at(&l, 36).balance, 0.0);
        assert_abs_diff_eq!(calc.balance_at(&l, 24).cumulative_principal_paid, 1_000_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_long_home_loan_retires_at_tenure() {
        // 21,714 covers the 17,708 first-month interest but not the full schedule
        let l = loan(2_500_000.0, 8.5, 21_714.0, 180);
        let calc = AmortizationCalculator::default();
        assert!(calc.balance_at(&l, 179).balance > 1_000_000.0);
        assert_eq!(calc.balance_at(&l, 180).balance, 0.0);
        assert_abs_diff_eq!(calc.shortfall_at_tenure(&l).unwrap(), 1_050_804.46, epsilon = 1.0);
    }

    #[test]
    fn test_fast_forward_matches_stepping() {
        let loans = [
            loan(120_000.0, 12.0, 11_098.0, 12),
            loan(1_000_000.0, 12.0, 12_000.0, 24),
            loan(1_000_000.0, 12.0, 5_000.0, 24),
            loan(1_000_000.0, 12.0, 10_000.0, 24),
        ];
        for policy in [UnpaidInterest::Plateau, UnpaidInterest::Capitalize] {
            let calc = AmortizationCalculator::new(policy);
            for l in &loans {
                let schedule = calc.schedule(l, 48);
                for (elapsed, stepped) in schedule.iter().enumerate() {
                    let jumped = calc.balance_at(l, elapsed as u32);
                    assert_abs_diff_eq!(jumped.balance, stepped.balance, epsilon = 1e-6);
                    assert_abs_diff_eq!(
                        jumped.cumulative_interest_paid,
                        stepped.cumulative_interest_paid,
                        epsilon = 1e-6
                    );
                }
            }
        }
    }

    #[test]
    fn test_cost_does_not_depend_on_tenure() {
        // Tenure far beyond any calendar; only the elapsed months are walked
        let plateau = loan(1_000_000.0, 12.0, 5_000.0, u32::MAX);
        assert_eq!(balance_at(&plateau, 12).balance, 1_000_000.0);

        let covering = loan(120_000.0, 12.0, 11_098.0, u32::MAX);
        assert_eq!(balance_at(&covering, 100_000).balance, 0.0);
        assert_eq!(balance_at(&covering, 100_000).elapsed_months, 100_000);
    }
}
