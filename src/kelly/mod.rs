//! Kelly criterion calculators.
//!
//! Three independent pure functions:
//! - [`kelly_annual_return`]: `f* = (b*p - q) / b` from a payoff ratio, plus
//!   the expected log-growth per trade and the compounded annual return.
//! - [`kelly_fraction_from_returns`]: `f* = (p*b - q*a) / b` from win/loss
//!   percentages.
//! - [`kelly_fraction_from_image`]: `f* = p/a - q/b` from the same inputs.
//!
//! The two percentage formulas are different derivations and do not agree in
//! general. Callers pick one through [`Formula`].

pub mod growth;
pub mod returns;
pub mod summary;

use crate::errors::CalculationError;
use serde::Serialize;
use std::str::FromStr;

pub use growth::kelly_annual_return;
pub use returns::{kelly_fraction_from_image, kelly_fraction_from_returns};

pub const FRACTION_DECIMALS: i32 = 6;
pub const LOG_GROWTH_DECIMALS: i32 = 8;
pub const ANNUAL_RATE_DECIMALS: i32 = 3;

/// Round to a fixed number of decimal places, halves toward +infinity.
/// Only applied to outputs; all intermediate math keeps full precision.
/// Overflow while scaling yields an infinite value, so callers check the
/// rounded output for finiteness.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

/// Which Kelly fractions are treated as degenerate (no growth computed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// `f* <= 0 || f* >= 1`. A full-capital bet is degenerate.
    #[default]
    Exclusive,
    /// `f* <= 0 || f* > 1`. Exactly 100% is still evaluated.
    Inclusive,
}

impl DegeneratePolicy {
    #[inline]
    pub fn is_degenerate(self, fraction: f64) -> bool {
        match self {
            Self::Exclusive => fraction <= 0.0 || fraction >= 1.0,
            Self::Inclusive => fraction <= 0.0 || fraction > 1.0,
        }
    }
}

impl FromStr for DegeneratePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclusive" => Ok(Self::Exclusive),
            "inclusive" => Ok(Self::Inclusive),
            other => Err(format!("unknown degenerate policy: {other}")),
        }
    }
}

/// Result of the payoff-ratio calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KellyResult {
    /// Optimal fraction of capital per trade. Rounded to 6 dp, except for
    /// degenerate fractions which are passed through unrounded.
    pub kelly_fraction: f64,
    /// Expected log-growth per trade, 8 dp. 0.0 when degenerate.
    pub growth_per_trade_log: f64,
    /// Expected compounded annual return in percent, 3 dp. 0.0 when degenerate.
    pub annual_growth_rate: f64,
}

/// Result of the percentage-based calculations. No compounding is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FractionResult {
    pub kelly_fraction: f64,
}

/// Percentage-based formula selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Formula {
    /// `f* = (p*b - q*a) / b`
    #[default]
    Standard,
    /// `f* = p/a - q/b`
    Alternate,
}

impl Formula {
    pub fn compute(
        self,
        win_probability: f64,
        win_return_pct: f64,
        loss_return_pct: f64,
    ) -> Result<FractionResult, CalculationError> {
        match self {
            Self::Standard => {
                kelly_fraction_from_returns(win_probability, win_return_pct, loss_return_pct)
            }
            Self::Alternate => {
                kelly_fraction_from_image(win_probability, win_return_pct, loss_return_pct)
            }
        }
    }
}

impl FromStr for Formula {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "alternate" => Ok(Self::Alternate),
            other => Err(format!("unknown formula: {other}")),
        }
    }
}
