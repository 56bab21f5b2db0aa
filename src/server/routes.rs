use crate::calculator::{self, AnnualRequest, AnnualResponse, FractionResponse, ReturnsRequest};
use crate::errors::RequestError;
use crate::state::{AppState, CounterSnapshot};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = match self {
            RequestError::Calculation(_) => StatusCode::BAD_REQUEST,
            RequestError::Validation(_) | RequestError::Malformed(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };
        let body = serde_json::json!({
            "error": { "kind": self.kind(), "message": self.to_string() }
        });
        (status, Json(body)).into_response()
    }
}

/// POST /api/kelly/annual -- payoff-ratio Kelly fraction + annual growth
pub async fn post_annual(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnnualRequest>, JsonRejection>,
) -> Result<Json<AnnualResponse>, RequestError> {
    let outcome = payload
        .map_err(|e| RequestError::Malformed(e.body_text()))
        .and_then(|Json(req)| calculator::evaluate_annual(&req, state.config.degenerate_policy));
    finish(&state, "annual", outcome)
}

/// POST /api/kelly/fraction -- percentage-based Kelly fraction
pub async fn post_fraction(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReturnsRequest>, JsonRejection>,
) -> Result<Json<FractionResponse>, RequestError> {
    let outcome = payload
        .map_err(|e| RequestError::Malformed(e.body_text()))
        .and_then(|Json(req)| calculator::evaluate_returns(&req));
    finish(&state, "fraction", outcome)
}

/// GET /api/kelly/default -- calculation with the configured default inputs
pub async fn get_default(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnnualResponse>, RequestError> {
    let outcome = calculator::default_calculation(&state.config);
    finish(&state, "default", outcome)
}

/// GET /api/counters -- request counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<CounterSnapshot> {
    Json(state.counters.snapshot())
}

fn finish<T>(
    state: &AppState,
    endpoint: &'static str,
    outcome: Result<T, RequestError>,
) -> Result<Json<T>, RequestError> {
    state.record(&outcome);
    if let Err(e) = &outcome {
        tracing::debug!(endpoint, kind = e.kind(), error = %e, "calculation rejected");
    }
    outcome.map(Json)
}
