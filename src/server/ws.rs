use crate::calculator::{self, CalculationRequest, CalculationResponse};
use crate::errors::RequestError;
use crate::state::{AppState, WsMessage};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use portable_atomic::Ordering;
use serde_json::Value;
use std::sync::Arc;

/// WebSocket upgrade handler for live calculation.
/// Every text frame is one request; every request gets exactly one reply.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    state.counters.ws_sessions.fetch_add(1, Ordering::Relaxed);
    let (mut sender, mut receiver) = socket.split();

    // Send the default calculation first
    let initial =
        calculator::default_calculation(&state.config).map(CalculationResponse::Annual);
    if send_message(&mut sender, &state, &to_message(None, initial)).await.is_err() {
        return;
    }

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let reply = handle_text(&state, text.as_str());
                if send_message(&mut sender, &state, &reply).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {} // Ping/pong handled by axum; binary frames ignored
        }
    }

    tracing::debug!("live calculation socket closed");
}

/// Parse and evaluate one frame: `{"type": "annual"|"fraction", "id"?: n, ...}`.
pub fn handle_text(state: &AppState, text: &str) -> WsMessage {
    let (id, parsed) = parse_frame(text);
    let outcome =
        parsed.and_then(|request| calculator::evaluate(&request, state.config.degenerate_policy));
    state.record(&outcome);
    to_message(id, outcome)
}

/// The `id` is read before the request shape is checked, so a frame with an
/// unknown `type` is still rejected under its own id.
fn parse_frame(text: &str) -> (Option<u64>, Result<CalculationRequest, RequestError>) {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => return (None, Err(e.into())),
    };
    let id = value.get("id").and_then(Value::as_u64);
    (id, serde_json::from_value(value).map_err(RequestError::from))
}

fn to_message(id: Option<u64>, outcome: Result<CalculationResponse, RequestError>) -> WsMessage {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match outcome {
        Ok(response) => WsMessage::Calculation {
            id,
            response,
            timestamp,
        },
        Err(e) => WsMessage::Rejected {
            id,
            kind: e.kind(),
            message: e.to_string(),
            timestamp,
        },
    }
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    state: &AppState,
    msg: &WsMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize ws message");
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await?;
    state.counters.ws_messages_sent.fetch_add(1, Ordering::Relaxed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serde_json::json;
    use tokio_tungstenite::tungstenite;

    fn reply(state: &AppState, frame: Value) -> Value {
        serde_json::to_value(handle_text(state, &frame.to_string())).unwrap()
    }

    #[test]
    fn test_annual_frame() {
        let state = AppState::new(AppConfig::default());
        let v = reply(
            &state,
            json!({
                "type": "annual",
                "id": 7,
                "trades_per_year": 12,
                "payoff_ratio": 2.0,
                "win_probability": 0.65
            }),
        );
        assert_eq!(v["type"], "calculation");
        assert_eq!(v["id"], 7);
        assert_eq!(v["response"]["result"]["kelly_fraction"], 0.475);
        assert!(v["timestamp"].is_string());
    }

    #[test]
    fn test_fraction_frame() {
        let state = AppState::new(AppConfig::default());
        let v = reply(
            &state,
            json!({
                "type": "fraction",
                "win_probability": 0.6,
                "win_return_pct": 20,
                "loss_return_pct": 10,
                "formula": "alternate"
            }),
        );
        assert_eq!(v["type"], "calculation");
        assert_eq!(v["response"]["formula"], "alternate");
        assert_eq!(v["response"]["result"]["kelly_fraction"], 4.0);
        assert!(v["id"].is_null());
    }

    #[test]
    fn test_invalid_frames_rejected() {
        let state = AppState::new(AppConfig::default());

        let v = reply(
            &state,
            json!({
                "type": "annual",
                "id": 1,
                "trades_per_year": 12,
                "payoff_ratio": 2.0,
                "win_probability": 1.5
            }),
        );
        assert_eq!(v["type"], "rejected");
        assert_eq!(v["id"], 1);
        assert_eq!(v["kind"], "validation_error");

        let v = reply(&state, json!({"type": "montecarlo"}));
        assert_eq!(v["kind"], "malformed_request");

        let v = serde_json::to_value(handle_text(&state, "not json")).unwrap();
        assert_eq!(v["kind"], "malformed_request");
        assert!(v["id"].is_null());

        assert_eq!(state.counters.snapshot().rejected_requests, 3);
    }

    #[test]
    fn test_unknown_type_keeps_id() {
        let state = AppState::new(AppConfig::default());
        let v = reply(&state, json!({"type": "montecarlo", "id": 3}));
        assert_eq!(v["type"], "rejected");
        assert_eq!(v["kind"], "malformed_request");
        assert_eq!(v["id"], 3);

        let v = reply(&state, json!({"id": 4, "trades_per_year": 12}));
        assert_eq!(v["kind"], "malformed_request");
        assert_eq!(v["id"], 4);
    }

    async fn next_json<S>(stream: &mut S) -> Value
    where
        S: futures_util::Stream<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
    {
        loop {
            let msg = stream.next().await.expect("socket closed").unwrap();
            if msg.is_text() {
                return serde_json::from_str(msg.to_text().unwrap()).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_socket_sends_default_then_one_reply_per_frame() {
        let state = AppState::new(AppConfig::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = crate::server::router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
            .await
            .unwrap();

        let first = next_json(&mut socket).await;
        assert_eq!(first["type"], "calculation");
        assert!(first["id"].is_null());
        assert_eq!(first["response"]["result"]["kelly_fraction"], 0.475);
        assert_eq!(state.counters.snapshot().ws_sessions, 1);

        let frames = [
            json!({
                "type": "annual",
                "id": 1,
                "trades_per_year": 12,
                "payoff_ratio": 2.0,
                "win_probability": 0.65
            }),
            json!({"type": "montecarlo", "id": 2}),
            json!({
                "type": "fraction",
                "id": 3,
                "win_probability": 0.6,
                "win_return_pct": 20,
                "loss_return_pct": 10
            }),
        ];
        for frame in &frames {
            socket
                .send(tungstenite::Message::text(frame.to_string()))
                .await
                .unwrap();
        }

        let replies = [
            next_json(&mut socket).await,
            next_json(&mut socket).await,
            next_json(&mut socket).await,
        ];
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[0]["type"], "calculation");
        assert_eq!(replies[1]["id"], 2);
        assert_eq!(replies[1]["type"], "rejected");
        assert_eq!(replies[2]["id"], 3);
        assert_eq!(replies[2]["response"]["result"]["kelly_fraction"], 0.4);

        // Nothing beyond one reply per frame
        let extra =
            tokio::time::timeout(std::time::Duration::from_millis(100), socket.next()).await;
        assert!(extra.is_err(), "unexpected extra frame: {extra:?}");

        socket.close(None).await.unwrap();
    }
}
