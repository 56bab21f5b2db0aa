use crate::errors::{EngineError, EngineResult};
use crate::kelly::DegeneratePolicy;
use crate::validation;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub dashboard_dir: PathBuf,
    pub degenerate_policy: DegeneratePolicy,
    /// Inputs for the calculation shown before the user submits anything.
    pub default_trades_per_year: f64,
    pub default_payoff_ratio: f64,
    pub default_win_probability: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 3001,
            dashboard_dir: PathBuf::from("dashboard"),
            degenerate_policy: DegeneratePolicy::Exclusive,
            default_trades_per_year: 12.0,
            default_payoff_ratio: 2.0,
            default_win_probability: 0.65,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EngineResult<Self> {
        let get =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let server_port = get("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| EngineError::Config(format!("SERVER_PORT: {e}")))?;

        let degenerate_policy = get("DEGENERATE_POLICY", "exclusive")
            .parse::<DegeneratePolicy>()
            .map_err(|e| EngineError::Config(format!("DEGENERATE_POLICY: {e}")))?;

        let default_trades_per_year = parse_f64(
            &get("DEFAULT_TRADES_PER_YEAR", "12"),
            "DEFAULT_TRADES_PER_YEAR",
        )?;
        let default_payoff_ratio =
            parse_f64(&get("DEFAULT_PAYOFF_RATIO", "2.0"), "DEFAULT_PAYOFF_RATIO")?;
        let default_win_probability = parse_f64(
            &get("DEFAULT_WIN_PROBABILITY", "0.65"),
            "DEFAULT_WIN_PROBABILITY",
        )?;

        // Defaults are served as a calculation, so they must be valid input
        validation::validate_annual_values(
            default_trades_per_year,
            default_payoff_ratio,
            default_win_probability,
        )
        .map_err(|e| {
            let key = format!("DEFAULT_{}", e.field.to_ascii_uppercase());
            EngineError::Config(format!("{key}: {}", e.message))
        })?;

        Ok(Self {
            server_port,
            dashboard_dir: PathBuf::from(get("DASHBOARD_DIR", "dashboard")),
            degenerate_policy,
            default_trades_per_year,
            default_payoff_ratio,
            default_win_probability,
        })
    }
}

fn parse_f64(raw: &str, key: &str) -> EngineResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| EngineError::Config(format!("{key}: {e}")))
}
