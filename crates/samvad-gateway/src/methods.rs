//! Gateway method handlers.

use std::sync::Arc;

use base64::Engine;
use serde_json::json;
use tracing::{debug, info, warn};

use samvad_core::protocol::{
    ErrorShape, SignsToTextParams, StreamChunkParams, StreamFrame, StreamStartParams,
    TextConvertParams,
};
use samvad_core::types::Utterance;
use samvad_pipeline::ProgressStage;

use crate::events::send_progress;
use crate::session::StreamSession;
use crate::state::GatewayState;

/// Dispatch a method request and return the response frame.
pub async fn dispatch_method(
    state: &Arc<GatewayState>,
    conn_id: &str,
    request_id: &str,
    method: &str,
    params: Option<serde_json::Value>,
) -> StreamFrame {
    debug!(conn_id = %conn_id, method, "Dispatching method");

    match method {
        "stream.start" => handle_stream_start(state, conn_id, request_id, params).await,
        "stream.chunk" => handle_stream_chunk(state, conn_id, request_id, params).await,
        "stream.stop" => handle_stream_stop(state, conn_id, request_id).await,
        "text.convert" => handle_text_convert(state, request_id, params).await,
        "signs.to_text" => handle_signs_to_text(request_id, params),
        _ => error_response(
            request_id,
            "method_not_found",
            &format!("Unknown method: {method}"),
        ),
    }
}

// ============================================================
// Stream methods
// ============================================================

async fn handle_stream_start(
    state: &Arc<GatewayState>,
    conn_id: &str,
    request_id: &str,
    params: Option<serde_json::Value>,
) -> StreamFrame {
    let params: StreamStartParams =
        match serde_json::from_value(params.unwrap_or_else(|| json!({}))) {
            Ok(p) => p,
            Err(e) => return error_response(request_id, "invalid_params", &e.to_string()),
        };

    {
        let mut connections = state.connections.write().await;
        let Some(conn) = connections.get_mut(conn_id) else {
            return error_response(request_id, "not_found", "Connection not found");
        };

        // Starting over an existing session replaces it and resets the
        // sequence counter.
        if let Some(old) = conn.session.take() {
            old.stop();
        }
        conn.session = Some(StreamSession::start(
            state.clone(),
            conn_id.to_string(),
            params.language.clone(),
        ));
    }

    info!(conn_id = %conn_id, language = %params.language, "Stream started");
    send_progress(
        state,
        conn_id,
        ProgressStage::Idle,
        "Stream started, waiting for audio...",
        0,
    )
    .await;

    ok_response(
        request_id,
        json!({"started": true, "language": params.language}),
    )
}

async fn handle_stream_chunk(
    state: &Arc<GatewayState>,
    conn_id: &str,
    request_id: &str,
    params: Option<serde_json::Value>,
) -> StreamFrame {
    let params: StreamChunkParams =
        match serde_json::from_value(params.unwrap_or_else(|| json!({}))) {
            Ok(p) => p,
            Err(e) => return error_response(request_id, "invalid_params", &e.to_string()),
        };

    if params.audio.is_empty() {
        return ok_response(request_id, json!({"accepted": false}));
    }

    let audio = match base64::engine::general_purpose::STANDARD.decode(&params.audio) {
        Ok(bytes) => bytes,
        Err(_) => {
            return error_response(request_id, "invalid_params", "audio is not valid base64")
        }
    };

    let mut connections = state.connections.write().await;
    let Some(conn) = connections.get_mut(conn_id) else {
        return error_response(request_id, "not_found", "Connection not found");
    };

    // Chunks arriving outside a session are ignored, not errors: a capture
    // loop may still be flushing after stop.
    let Some(session) = conn.session.as_mut() else {
        return ok_response(request_id, json!({"accepted": false}));
    };

    match session.push_chunk(audio) {
        Some(seq) => ok_response(request_id, json!({"accepted": true, "seq": seq})),
        None => {
            warn!(conn_id = %conn_id, "Chunk queue full, dropping chunk");
            ok_response(request_id, json!({"accepted": false}))
        }
    }
}

async fn handle_stream_stop(
    state: &Arc<GatewayState>,
    conn_id: &str,
    request_id: &str,
) -> StreamFrame {
    {
        let mut connections = state.connections.write().await;
        if let Some(conn) = connections.get_mut(conn_id) {
            if let Some(session) = conn.session.take() {
                session.stop();
            }
        }
    }

    info!(conn_id = %conn_id, "Stream stopped");
    send_progress(state, conn_id, ProgressStage::Idle, "Stream stopped", 0).await;

    ok_response(request_id, json!({"stopped": true}))
}

// ============================================================
// Text methods
// ============================================================

async fn handle_text_convert(
    state: &Arc<GatewayState>,
    request_id: &str,
    params: Option<serde_json::Value>,
) -> StreamFrame {
    let params: TextConvertParams =
        match serde_json::from_value(params.unwrap_or_else(|| json!({}))) {
            Ok(p) => p,
            Err(e) => return error_response(request_id, "invalid_params", &e.to_string()),
        };

    if let Err(message) = validate_text(&params.text, state.config.max_text_chars()) {
        return error_response(request_id, "invalid_params", &message);
    }

    let utterance = Utterance::from_text(&params.text, &params.language);
    let result = state.pipeline.process_utterance(&utterance).await;

    match serde_json::to_value(&result) {
        Ok(payload) => ok_response(request_id, payload),
        Err(e) => error_response(request_id, "internal_error", &e.to_string()),
    }
}

fn handle_signs_to_text(request_id: &str, params: Option<serde_json::Value>) -> StreamFrame {
    let params: SignsToTextParams =
        match serde_json::from_value(params.unwrap_or_else(|| json!({}))) {
            Ok(p) => p,
            Err(e) => return error_response(request_id, "invalid_params", &e.to_string()),
        };

    let signs: Vec<&str> = params.signs.iter().map(String::as_str).collect();
    let text = samvad_gloss::signs_to_text(&signs);

    ok_response(request_id, json!({"text": text}))
}

// ============================================================
// Helpers
// ============================================================

/// Shared input validation for `text.convert` and the HTTP text endpoint.
pub(crate) fn validate_text(text: &str, max_chars: usize) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Text is required".to_string());
    }
    if text.chars().count() > max_chars {
        return Err(format!("Text too long (max {max_chars} characters)"));
    }
    Ok(())
}

fn ok_response(id: &str, payload: serde_json::Value) -> StreamFrame {
    StreamFrame::Response {
        id: id.to_string(),
        ok: true,
        payload: Some(payload),
        error: None,
    }
}

fn error_response(id: &str, code: &str, message: &str) -> StreamFrame {
    StreamFrame::Response {
        id: id.to_string(),
        ok: false,
        payload: None,
        error: Some(ErrorShape {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }),
    }
}
