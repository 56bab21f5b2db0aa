use super::{round_to, FractionResult, FRACTION_DECIMALS};
use crate::errors::CalculationError;

/// Standard Kelly fraction from win/loss percentages.
///
/// f* = (p*b - q*a) / b
///
/// where b = win_return_pct / 100, a = loss_return_pct / 100, q = 1 - p.
pub fn kelly_fraction_from_returns(
    p: f64,
    win_return_pct: f64,
    loss_return_pct: f64,
) -> Result<FractionResult, CalculationError> {
    let (b, a) = percent_to_fractions(win_return_pct, loss_return_pct)?;
    let q = 1.0 - p;
    finish((p * b - q * a) / b)
}

/// Alternate Kelly fraction from the same inputs.
///
/// f* = p/a - q/b
pub fn kelly_fraction_from_image(
    p: f64,
    win_return_pct: f64,
    loss_return_pct: f64,
) -> Result<FractionResult, CalculationError> {
    let (b, a) = percent_to_fractions(win_return_pct, loss_return_pct)?;
    let q = 1.0 - p;
    finish(p / a - q / b)
}

/// Converts percentages to fractions and rejects zeros after the conversion,
/// so a percentage that underflows to zero is caught too.
fn percent_to_fractions(
    win_return_pct: f64,
    loss_return_pct: f64,
) -> Result<(f64, f64), CalculationError> {
    let b = win_return_pct / 100.0;
    let a = loss_return_pct / 100.0;
    if a == 0.0 || b == 0.0 {
        return Err(CalculationError::InvalidInput(
            "return and loss percentages must not be zero",
        ));
    }
    Ok((b, a))
}

/// Rounds, then rejects anything that is not finite. Scaling for the
/// rounding can overflow even when `f_star` itself is finite.
fn finish(f_star: f64) -> Result<FractionResult, CalculationError> {
    let kelly_fraction = round_to(f_star, FRACTION_DECIMALS);
    if !kelly_fraction.is_finite() {
        return Err(CalculationError::NonFinite(
            "kelly fraction is not representable as a finite number",
        ));
    }
    Ok(FractionResult { kelly_fraction })
}
