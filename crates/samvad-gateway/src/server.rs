//! Axum HTTP and WebSocket server.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use samvad_core::language::SUPPORTED_LANGUAGES;
use samvad_core::protocol::TextConvertParams;
use samvad_core::types::Utterance;

use crate::connection::handle_ws_connection;
use crate::methods::validate_text;
use crate::state::GatewayState;

/// Start the gateway server on the configured bind address.
pub async fn start_gateway(state: Arc<GatewayState>) -> anyhow::Result<()> {
    let addr = state.config.bind_addr();

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .route("/api/languages", get(languages_handler))
        .route("/api/text-to-isl", post(text_to_isl_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Samvad gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(state, socket))
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    let connections = state.connection_count().await;

    let transcription = match state
        .config
        .transcription
        .as_ref()
        .and_then(|t| t.resolve_api_key())
    {
        Some(_) => "available",
        None => "unconfigured",
    };
    let transcreation = match state
        .config
        .transcreation
        .as_ref()
        .and_then(|t| t.resolve_api_key())
    {
        Some(_) => "available",
        None => "passthrough",
    };
    let synthesis = match state.config.synthesis.as_ref().and_then(|s| s.endpoint.as_deref()) {
        Some(_) => "available",
        None => "unconfigured",
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "connections": connections,
        "services": {
            "transcription": transcription,
            "transcreation": transcreation,
            "gloss": "available",
            "avatar": "available",
            "synthesis": synthesis,
        },
    }))
}

async fn languages_handler() -> impl IntoResponse {
    let languages: Vec<serde_json::Value> = SUPPORTED_LANGUAGES
        .iter()
        .map(|l| json!({"code": l.tag, "name": l.name}))
        .collect();
    Json(languages)
}

async fn text_to_isl_handler(
    State(state): State<Arc<GatewayState>>,
    Json(req): Json<TextConvertParams>,
) -> Response {
    if let Err(message) = validate_text(&req.text, state.config.max_text_chars()) {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response();
    }

    let utterance = Utterance::from_text(&req.text, &req.language);
    let result = state.pipeline.process_utterance(&utterance).await;
    Json(result).into_response()
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received, stopping gateway");
}
