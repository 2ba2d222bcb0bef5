//! Event delivery to individual WebSocket connections.

use std::sync::Arc;

use tracing::debug;

use samvad_core::protocol::{ProgressPayload, StreamFrame};
use samvad_pipeline::ProgressStage;

use crate::state::GatewayState;

/// Send an event frame to one connection's outbound channel. Delivery is
/// best-effort: a missing or closing connection drops the event.
pub async fn send_event(
    state: &Arc<GatewayState>,
    conn_id: &str,
    event: &str,
    payload: Option<serde_json::Value>,
    seq: Option<u64>,
) {
    let frame = StreamFrame::Event {
        event: event.to_string(),
        payload,
        seq,
    };

    let msg = match serde_json::to_string(&frame) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(%e, "Event payload did not serialize");
            return;
        }
    };

    let connections = state.connections.read().await;
    match connections.get(conn_id) {
        Some(conn) => {
            let _ = conn.event_tx.send(msg);
        }
        None => debug!(conn_id = %conn_id, event, "Event for unknown connection dropped"),
    }
}

/// Send a `progress` event to one connection.
pub async fn send_progress(
    state: &Arc<GatewayState>,
    conn_id: &str,
    stage: ProgressStage,
    message: impl Into<String>,
    percent: u8,
) {
    let payload = ProgressPayload {
        stage: stage.as_str().to_string(),
        message: message.into(),
        percent,
    };
    send_event(
        state,
        conn_id,
        "progress",
        serde_json::to_value(&payload).ok(),
        None,
    )
    .await;
}
