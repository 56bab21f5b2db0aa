/// Display figures for a calculation: the strings a form shows next to the
/// raw result. Pure functions; the numbers themselves are never re-rounded.
use super::{FractionResult, KellyResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    /// f* <= 0: not trading is optimal.
    NoBet,
    /// 0 < f* < 1: a normal partial allocation.
    Partial,
    /// f* >= 1: optimal sizing needs leverage.
    Leveraged,
}

impl Assessment {
    pub fn of(kelly_fraction: f64) -> Self {
        if kelly_fraction <= 0.0 {
            Self::NoBet
        } else if kelly_fraction >= 1.0 {
            Self::Leveraged
        } else {
            Self::Partial
        }
    }

    pub fn advice(self) -> Option<&'static str> {
        match self {
            Self::NoBet => Some(
                "Kelly fraction is at or below 0: not trading is optimal under these conditions",
            ),
            Self::Leveraged => Some(
                "Kelly fraction is 100% or more: using leverage is optimal under these conditions",
            ),
            Self::Partial => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Kelly fraction as a percentage, 2 dp (e.g. "47.50%").
    pub kelly_percent: String,
    /// Per-trade log-growth, 6 dp. Absent for percentage-based results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_per_trade_log: Option<String>,
    /// Signed annual rate, 3 dp (e.g. "+1121.628%").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_growth_rate: Option<String>,
    /// True when the annual rate is strictly positive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_positive: Option<bool>,
    pub assessment: Assessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<&'static str>,
}

pub fn summarize(result: &KellyResult) -> Summary {
    let assessment = Assessment::of(result.kelly_fraction);
    let rate = result.annual_growth_rate;
    let sign = if rate > 0.0 { "+" } else { "" };
    Summary {
        kelly_percent: format_percent(result.kelly_fraction),
        growth_per_trade_log: Some(format!("{:.6}", result.growth_per_trade_log)),
        annual_growth_rate: Some(format!("{sign}{rate:.3}%")),
        annual_positive: Some(rate > 0.0),
        assessment,
        advice: assessment.advice(),
    }
}

pub fn summarize_fraction(result: &FractionResult) -> Summary {
    let assessment = Assessment::of(result.kelly_fraction);
    Summary {
        kelly_percent: format_percent(result.kelly_fraction),
        growth_per_trade_log: None,
        annual_growth_rate: None,
        annual_positive: None,
        assessment,
        advice: assessment.advice(),
    }
}

fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}
