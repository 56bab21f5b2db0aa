/// Boundary validation for calculation requests.
///
/// Form fields arrive as JSON numbers or as numeric strings. Checks run in a
/// fixed order and the first failure is reported. The formulas themselves
/// only guard against division by zero; everything else is rejected here.
use crate::errors::ValidationError;
use crate::kelly::Formula;
use serde_json::Value;

/// Validated inputs for the payoff-ratio calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualInput {
    pub trades_per_year: f64,
    pub payoff_ratio: f64,
    pub win_probability: f64,
}

/// Validated inputs for the percentage-based calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnsInput {
    pub win_probability: f64,
    pub win_return_pct: f64,
    pub loss_return_pct: f64,
    pub formula: Formula,
}

/// Parse one required numeric field.
pub fn parse_number(field: &'static str, raw: Option<&Value>) -> Result<f64, ValidationError> {
    let value = match raw {
        None | Some(Value::Null) => return Err(ValidationError::new(field, "is required")),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(ValidationError::new(field, "is required"))
        }
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ValidationError::new(field, "must be a number")),
    }
}

pub fn validate_annual(
    trades_per_year: Option<&Value>,
    payoff_ratio: Option<&Value>,
    win_probability: Option<&Value>,
) -> Result<AnnualInput, ValidationError> {
    let trades_per_year = parse_number("trades_per_year", trades_per_year)?;
    let payoff_ratio = parse_number("payoff_ratio", payoff_ratio)?;
    let win_probability = parse_number("win_probability", win_probability)?;

    if trades_per_year <= 0.0 {
        return Err(ValidationError::new("trades_per_year", "must be greater than 0"));
    }
    if payoff_ratio <= 0.0 {
        return Err(ValidationError::new("payoff_ratio", "must be greater than 0"));
    }
    check_probability(win_probability)?;

    Ok(AnnualInput {
        trades_per_year,
        payoff_ratio,
        win_probability,
    })
}

/// Same checks as [`validate_annual`] for values that are already numbers,
/// such as configured defaults.
pub fn validate_annual_values(
    trades_per_year: f64,
    payoff_ratio: f64,
    win_probability: f64,
) -> Result<AnnualInput, ValidationError> {
    validate_annual(
        Some(&Value::from(trades_per_year)),
        Some(&Value::from(payoff_ratio)),
        Some(&Value::from(win_probability)),
    )
}

pub fn validate_returns(
    win_probability: Option<&Value>,
    win_return_pct: Option<&Value>,
    loss_return_pct: Option<&Value>,
    formula: Option<&str>,
) -> Result<ReturnsInput, ValidationError> {
    let win_probability = parse_number("win_probability", win_probability)?;
    let win_return_pct = parse_number("win_return_pct", win_return_pct)?;
    let loss_return_pct = parse_number("loss_return_pct", loss_return_pct)?;

    check_probability(win_probability)?;
    if win_return_pct <= 0.0 {
        return Err(ValidationError::new("win_return_pct", "must be greater than 0"));
    }
    if loss_return_pct <= 0.0 {
        return Err(ValidationError::new("loss_return_pct", "must be greater than 0"));
    }

    let formula = match formula {
        None => Formula::default(),
        Some(tag) => tag
            .parse::<Formula>()
            .map_err(|_| {
                ValidationError::new("formula", "must be \"standard\" or \"alternate\"")
            })?,
    };

    Ok(ReturnsInput {
        win_probability,
        win_return_pct,
        loss_return_pct,
        formula,
    })
}

fn check_probability(p: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ValidationError::new("win_probability", "must be between 0 and 1"));
    }
    Ok(())
}
