use crate::calculator::CalculationResponse;
use crate::config::AppConfig;
use crate::errors::RequestError;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ── Shared Server State ──

/// Immutable config plus lock-free counters. Shared across all handlers.
pub struct AppState {
    pub config: AppConfig,
    pub counters: Counters,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            counters: Counters::default(),
        })
    }

    /// Count the outcome of one calculation request.
    pub fn record<T>(&self, outcome: &Result<T, RequestError>) {
        let counter = match outcome {
            Ok(_) => &self.counters.calculations_served,
            Err(RequestError::Calculation(_)) => &self.counters.calculation_errors,
            Err(_) => &self.counters.rejected_requests,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

// ── Performance Counters (lock-free) ──

#[derive(Default)]
pub struct Counters {
    pub calculations_served: AtomicU64,
    pub calculation_errors: AtomicU64,
    pub rejected_requests: AtomicU64,
    pub ws_sessions: AtomicU64,
    pub ws_messages_sent: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CounterSnapshot {
    pub calculations_served: u64,
    pub calculation_errors: u64,
    pub rejected_requests: u64,
    pub ws_sessions: u64,
    pub ws_messages_sent: u64,
}

impl Counters {
    pub fn snapshot(&self) -> CounterSnapshot {
        use Ordering::Relaxed;
        CounterSnapshot {
            calculations_served: self.calculations_served.load(Relaxed),
            calculation_errors: self.calculation_errors.load(Relaxed),
            rejected_requests: self.rejected_requests.load(Relaxed),
            ws_sessions: self.ws_sessions.load(Relaxed),
            ws_messages_sent: self.ws_messages_sent.load(Relaxed),
        }
    }
}

// ── Messages OUT over the live socket ──

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "calculation")]
    Calculation {
        id: Option<u64>,
        response: CalculationResponse,
        timestamp: String,
    },

    #[serde(rename = "rejected")]
    Rejected {
        id: Option<u64>,
        kind: &'static str,
        message: String,
        timestamp: String,
    },
}
