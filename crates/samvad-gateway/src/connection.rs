//! WebSocket connection lifecycle: handshake, read/write loops.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use samvad_core::protocol::{ErrorShape, PROTOCOL_VERSION, ServerHello, StreamFrame};
use samvad_pipeline::ProgressStage;

use crate::events::send_progress;
use crate::methods::dispatch_method;
use crate::state::{ConnectionState, GatewayState};

/// Drive one WebSocket connection from accept to teardown.
pub async fn handle_ws_connection(state: Arc<GatewayState>, ws: WebSocket) {
    let conn_id = Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, "WebSocket client connected");

    let (mut outbound, mut inbound) = ws.split();

    // Everything written to this connection goes through one channel, so
    // method responses and pipeline events cannot interleave mid-frame.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<String>();

    state.connections.write().await.insert(
        conn_id.clone(),
        ConnectionState {
            conn_id: conn_id.clone(),
            event_tx: event_tx.clone(),
            session: None,
        },
    );

    if send_hello(&mut outbound, &conn_id).await.is_err() {
        remove_connection(&state, &conn_id).await;
        return;
    }

    // Initial idle status; queued behind the hello and flushed by the writer
    // task below.
    send_progress(&state, &conn_id, ProgressStage::Idle, "Connected", 0).await;

    let writer = tokio::spawn(async move {
        while let Some(msg) = event_rx.recv().await {
            if outbound.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(incoming) = inbound.next().await {
        match incoming {
            Ok(Message::Text(text)) => {
                handle_text_frame(&state, &conn_id, &event_tx, text.to_string()).await;
            }
            Ok(Message::Close(_)) => {
                debug!(conn_id = %conn_id, "Close frame received");
                break;
            }
            Err(e) => {
                error!(conn_id = %conn_id, %e, "Socket read failed");
                break;
            }
            // Binary frames are not part of the protocol; pings are answered
            // by axum itself.
            Ok(_) => {}
        }
    }

    writer.abort();
    remove_connection(&state, &conn_id).await;
    info!(conn_id = %conn_id, "Connection closed");
}

/// Advertise the protocol surface as the first frame on the wire.
async fn send_hello(
    outbound: &mut futures::stream::SplitSink<WebSocket, Message>,
    conn_id: &str,
) -> Result<(), ()> {
    let hello = ServerHello {
        protocol: PROTOCOL_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        conn_id: conn_id.to_string(),
        methods: vec![
            "stream.start".into(),
            "stream.chunk".into(),
            "stream.stop".into(),
            "text.convert".into(),
            "signs.to_text".into(),
        ],
        events: vec!["progress".into(), "isl.result".into()],
    };

    let frame = StreamFrame::Event {
        event: "hello".into(),
        payload: serde_json::to_value(&hello).ok(),
        seq: Some(0),
    };

    match serde_json::to_string(&frame) {
        Ok(msg) => outbound
            .send(Message::Text(msg.into()))
            .await
            .map_err(|_| ()),
        Err(_) => Ok(()),
    }
}

/// Parse one text frame and act on it. A malformed frame gets an error
/// response instead of killing the connection.
async fn handle_text_frame(
    state: &Arc<GatewayState>,
    conn_id: &str,
    reply_tx: &mpsc::UnboundedSender<String>,
    text: String,
) {
    let reply = match serde_json::from_str::<StreamFrame>(&text) {
        Ok(StreamFrame::Request { id, method, params }) => {
            dispatch_method(state, conn_id, &id, &method, params).await
        }
        Ok(_) => {
            debug!(conn_id = %conn_id, "Ignoring non-request frame");
            return;
        }
        Err(e) => {
            warn!(conn_id = %conn_id, %e, "Unparseable frame");
            StreamFrame::Response {
                id: "unknown".into(),
                ok: false,
                payload: None,
                error: Some(ErrorShape {
                    code: "parse_error".into(),
                    message: format!("Invalid frame: {e}"),
                    details: None,
                }),
            }
        }
    };

    if let Ok(json) = serde_json::to_string(&reply) {
        let _ = reply_tx.send(json);
    }
}

/// Drop the connection entry and stop its stream session, if any.
async fn remove_connection(state: &Arc<GatewayState>, conn_id: &str) {
    let mut connections = state.connections.write().await;
    if let Some(conn) = connections.remove(conn_id) {
        if let Some(session) = conn.session {
            session.stop();
        }
    }
}
