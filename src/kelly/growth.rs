use super::{
    round_to, DegeneratePolicy, KellyResult, ANNUAL_RATE_DECIMALS, FRACTION_DECIMALS,
    LOG_GROWTH_DECIMALS,
};
use crate::errors::CalculationError;

/// Kelly fraction and compounded annual growth from a payoff ratio.
///
/// f* = (b*p - q) / b
/// g  = p * ln(1 + f*b) + q * ln(1 - f*)
/// annual = exp(g * trades_per_year) - 1
///
/// where:
///   b = payoff ratio (amount won per unit risked)
///   p = win probability, q = 1 - p
///
/// Fractions the `policy` marks as degenerate are returned unrounded with both
/// growth figures at 0.0. A zero payoff ratio is rejected before dividing.
///
/// Pure function: deterministic from inputs.
pub fn kelly_annual_return(
    trades_per_year: f64,
    b: f64,
    p: f64,
    policy: DegeneratePolicy,
) -> Result<KellyResult, CalculationError> {
    if b == 0.0 {
        return Err(CalculationError::DivisionByZero(
            "payoff ratio b must not be zero",
        ));
    }

    let q = 1.0 - p;
    let f_star = (b * p - q) / b;
    if !f_star.is_finite() {
        return Err(CalculationError::NonFinite(
            "kelly fraction is not representable as a finite number",
        ));
    }

    // No bet (f* <= 0) or full/over-leveraged bet: growth is not evaluated
    if policy.is_degenerate(f_star) {
        return Ok(KellyResult {
            kelly_fraction: f_star,
            growth_per_trade_log: 0.0,
            annual_growth_rate: 0.0,
        });
    }

    let g = log_growth(f_star, b, p);
    let annual_return = (g * trades_per_year).exp() - 1.0;

    // Checked after scaling: a finite annual return can still overflow
    // once converted to percent and rounded.
    let result = KellyResult {
        kelly_fraction: round_to(f_star, FRACTION_DECIMALS),
        growth_per_trade_log: round_to(g, LOG_GROWTH_DECIMALS),
        annual_growth_rate: round_to(annual_return * 100.0, ANNUAL_RATE_DECIMALS),
    };
    if !result.growth_per_trade_log.is_finite() || !result.annual_growth_rate.is_finite() {
        return Err(CalculationError::NonFinite(
            "growth rate is not representable as a finite number",
        ));
    }

    Ok(result)
}

/// Expected log-growth per trade when risking `fraction` of capital.
/// An outcome with zero probability contributes nothing, even if its
/// logarithm is undefined.
#[inline]
pub fn log_growth(fraction: f64, b: f64, p: f64) -> f64 {
    let q = 1.0 - p;
    weighted_ln(p, 1.0 + fraction * b) + weighted_ln(q, 1.0 - fraction)
}

#[inline]
fn weighted_ln(weight: f64, x: f64) -> f64 {
    if weight == 0.0 {
        0.0
    } else {
        weight * x.ln()
    }
}
