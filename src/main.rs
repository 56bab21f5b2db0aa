mod calculator;
mod config;
mod errors;
mod kelly;
mod server;
mod state;
mod validation;

use crate::errors::EngineResult;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("kelly_calc starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        policy = ?cfg.degenerate_policy,
        dashboard = %cfg.dashboard_dir.display(),
        "config loaded"
    );

    // Evaluate the defaults once so a bad default shows up at startup
    match calculator::default_calculation(&cfg) {
        Ok(resp) => tracing::info!(
            trades_per_year = cfg.default_trades_per_year,
            payoff_ratio = cfg.default_payoff_ratio,
            win_probability = cfg.default_win_probability,
            kelly_fraction = resp.result.kelly_fraction,
            growth_per_trade_log = resp.result.growth_per_trade_log,
            annual_growth_rate = resp.result.annual_growth_rate,
            "default calculation"
        ),
        Err(e) => tracing::warn!(error = %e, "default calculation failed"),
    }

    if let Err(e) = serve(AppState::new(cfg)).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}

async fn serve(state: std::sync::Arc<AppState>) -> EngineResult<()> {
    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
