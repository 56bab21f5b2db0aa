/// Request handling shared by the REST routes and the live socket:
/// validate at the boundary, dispatch to one formula, attach display figures.
use crate::config::AppConfig;
use crate::errors::RequestError;
use crate::kelly::summary::{self, Summary};
use crate::kelly::{self, DegeneratePolicy, Formula, FractionResult, KellyResult};
use crate::validation::{self, AnnualInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/kelly/annual`. Fields stay raw JSON until validated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnualRequest {
    #[serde(default)]
    pub trades_per_year: Option<Value>,
    #[serde(default)]
    pub payoff_ratio: Option<Value>,
    #[serde(default)]
    pub win_probability: Option<Value>,
}

/// Body of `POST /api/kelly/fraction`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnsRequest {
    #[serde(default)]
    pub win_probability: Option<Value>,
    #[serde(default)]
    pub win_return_pct: Option<Value>,
    #[serde(default)]
    pub loss_return_pct: Option<Value>,
    #[serde(default)]
    pub formula: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculationRequest {
    Annual(AnnualRequest),
    Fraction(ReturnsRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualResponse {
    pub result: KellyResult,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FractionResponse {
    pub formula: Formula,
    pub result: FractionResult,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CalculationResponse {
    Annual(AnnualResponse),
    Fraction(FractionResponse),
}

pub fn evaluate_annual(
    req: &AnnualRequest,
    policy: DegeneratePolicy,
) -> Result<AnnualResponse, RequestError> {
    let input = validation::validate_annual(
        req.trades_per_year.as_ref(),
        req.payoff_ratio.as_ref(),
        req.win_probability.as_ref(),
    )?;
    run_annual(input, policy)
}

pub fn evaluate_returns(req: &ReturnsRequest) -> Result<FractionResponse, RequestError> {
    let input = validation::validate_returns(
        req.win_probability.as_ref(),
        req.win_return_pct.as_ref(),
        req.loss_return_pct.as_ref(),
        req.formula.as_deref(),
    )?;
    let result = input
        .formula
        .compute(input.win_probability, input.win_return_pct, input.loss_return_pct)?;
    Ok(FractionResponse {
        formula: input.formula,
        result,
        summary: summary::summarize_fraction(&result),
    })
}

pub fn evaluate(
    req: &CalculationRequest,
    policy: DegeneratePolicy,
) -> Result<CalculationResponse, RequestError> {
    match req {
        CalculationRequest::Annual(r) => {
            evaluate_annual(r, policy).map(CalculationResponse::Annual)
        }
        CalculationRequest::Fraction(r) => {
            evaluate_returns(r).map(CalculationResponse::Fraction)
        }
    }
}

/// The calculation shown before any input is submitted. The defaults pass
/// through the same boundary checks as submitted input.
pub fn default_calculation(config: &AppConfig) -> Result<AnnualResponse, RequestError> {
    let input = validation::validate_annual_values(
        config.default_trades_per_year,
        config.default_payoff_ratio,
        config.default_win_probability,
    )?;
    run_annual(input, config.degenerate_policy)
}

fn run_annual(
    input: AnnualInput,
    policy: DegeneratePolicy,
) -> Result<AnnualResponse, RequestError> {
    let result = kelly::kelly_annual_return(
        input.trades_per_year,
        input.payoff_ratio,
        input.win_probability,
        policy,
    )?;
    Ok(AnnualResponse {
        result,
        summary: summary::summarize(&result),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalculationError;
    use serde_json::json;

    #[test]
    fn test_default_calculation_matches_reference() {
        let resp = default_calculation(&AppConfig::default()).unwrap();
        assert_eq!(resp.result.kelly_fraction, 0.475);
        assert_eq!(resp.summary.kelly_percent, "47.50%");
    }

    #[test]
    fn test_out_of_range_defaults_rejected() {
        let config = AppConfig {
            default_trades_per_year: -12.0,
            default_win_probability: 1.5,
            ..AppConfig::default()
        };
        let err = default_calculation(&config).unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        let config = AppConfig {
            default_win_probability: 1.5,
            ..AppConfig::default()
        };
        match default_calculation(&config).unwrap_err() {
            RequestError::Validation(e) => assert_eq!(e.field, "win_probability"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_runs_before_formula() {
        // b = 0 would be a DivisionByZero in the core, but the boundary rejects it first
        let req = AnnualRequest {
            trades_per_year: Some(json!(12)),
            payoff_ratio: Some(json!(0)),
            win_probability: Some(json!(0.5)),
        };
        let err = evaluate_annual(&req, DegeneratePolicy::Exclusive).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn test_returns_request_dispatches_formula() {
        let req = ReturnsRequest {
            win_probability: Some(json!(0.6)),
            win_return_pct: Some(json!(20)),
            loss_return_pct: Some(json!(10)),
            formula: Some("alternate".into()),
        };
        let resp = evaluate_returns(&req).unwrap();
        assert_eq!(resp.formula, Formula::Alternate);
        assert_eq!(resp.result.kelly_fraction, 4.0);
    }

    #[test]
    fn test_tagged_request_parsing() {
        let req: CalculationRequest = serde_json::from_value(json!({
            "type": "annual",
            "trades_per_year": "12",
            "payoff_ratio": 2.0,
            "win_probability": 0.65
        }))
        .unwrap();
        let resp = evaluate(&req, DegeneratePolicy::Exclusive).unwrap();
        match resp {
            CalculationResponse::Annual(a) => assert_eq!(a.result.kelly_fraction, 0.475),
            other => panic!("expected annual response, got {other:?}"),
        }

        let req: CalculationRequest = serde_json::from_value(json!({
            "type": "fraction",
            "win_probability": 0.6,
            "win_return_pct": 20,
            "loss_return_pct": 10
        }))
        .unwrap();
        assert!(matches!(
            evaluate(&req, DegeneratePolicy::Exclusive),
            Ok(CalculationResponse::Fraction(_))
        ));
    }

    #[test]
    fn test_core_error_surfaces_as_calculation_error() {
        let req = AnnualRequest {
            trades_per_year: Some(json!(1e9)),
            payoff_ratio: Some(json!(2.0)),
            win_probability: Some(json!(0.65)),
        };
        let err = evaluate_annual(&req, DegeneratePolicy::Exclusive).unwrap_err();
        assert!(matches!(err, RequestError::Calculation(CalculationError::NonFinite(_))));
    }
}
