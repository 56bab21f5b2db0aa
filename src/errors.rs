/// Error types for the calculator.
/// Formula failures and input rejections are plain values so callers can
/// branch on them. Nothing here is retried; each failure is terminal for the
/// single calculation that produced it.

/// Failure inside one of the Kelly formulas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    /// The payoff ratio is zero, so f* is undefined.
    #[error("{0}")]
    DivisionByZero(&'static str),

    /// A return or loss percentage is zero.
    #[error("{0}")]
    InvalidInput(&'static str),

    /// The formula produced NaN or an infinite value.
    #[error("{0}")]
    NonFinite(&'static str),
}

impl CalculationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DivisionByZero(_) => "division_by_zero",
            Self::InvalidInput(_) => "invalid_input",
            Self::NonFinite(_) => "non_finite",
        }
    }
}

/// Caller-supplied input outside its domain, rejected before any formula runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Everything that can go wrong while serving one calculation request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error("malformed request: {0}")]
    Malformed(String),
}

impl RequestError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Calculation(e) => e.kind(),
            Self::Malformed(_) => "malformed_request",
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(e: serde_json::Error) -> Self {
        RequestError::Malformed(e.to_string())
    }
}

/// Startup failures. The process logs these and exits.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculation_error_message_is_verbatim() {
        let e = CalculationError::DivisionByZero("payoff ratio b must not be zero");
        assert_eq!(e.to_string(), "payoff ratio b must not be zero");
        assert_eq!(e.kind(), "division_by_zero");
    }

    #[test]
    fn test_request_error_kinds() {
        let v: RequestError =
            ValidationError::new("win_probability", "must be between 0 and 1").into();
        assert_eq!(v.kind(), "validation_error");
        assert_eq!(v.to_string(), "win_probability must be between 0 and 1");

        let c: RequestError = CalculationError::InvalidInput("x").into();
        assert_eq!(c.kind(), "invalid_input");
    }
}
