//! Per-holding calculators: loan amortization and asset growth

pub mod amortization;
pub mod growth;

pub use amortization::{balance_at, AmortizationCalculator, AmortizationPosition, Amortizer, UnpaidInterest};
pub use growth::{appreciated_value, future_value, total_contributed};
