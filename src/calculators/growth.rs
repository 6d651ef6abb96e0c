//! Compound growth of lump sums and recurring contributions

/// Monthly rate as a fraction from an annual percentage
fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 12.0 / 100.0
}

/// Value of a lump sum after `elapsed_months` of monthly compounding
///
/// Returns 0 for negative `elapsed_months`: the asset does not exist yet.
pub fn appreciated_value(principal: f64, annual_rate: f64, elapsed_months: i32) -> f64 {
    if elapsed_months < 0 {
        return 0.0;
    }
    principal * (1.0 + monthly_rate(annual_rate)).powi(elapsed_months)
}

/// Future value of a monthly contribution made at the start of each month
/// (annuity due) for `elapsed_months` months
///
/// FV = A * ((1+r)^n - 1) / r * (1+r), degrading to A * n when r = 0.
pub fn future_value(monthly_amount: f64, annual_rate: f64, elapsed_months: i32) -> f64 {
    if elapsed_months < 0 {
        return 0.0;
    }
    let r = monthly_rate(annual_rate);
    if r == 0.0 {
        return monthly_amount * elapsed_months as f64;
    }
    let growth = (1.0 + r).powi(elapsed_months);
    monthly_amount * ((growth - 1.0) / r) * (1.0 + r)
}

/// Total contributed into a recurring asset after `elapsed_months`
pub fn total_contributed(monthly_amount: f64, elapsed_months: i32) -> f64 {
    monthly_amount * elapsed_months.max(0) as f64
}
