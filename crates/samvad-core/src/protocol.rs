//! Samvad gateway wire protocol.
//!
//! All streaming communication uses JSON-over-WebSocket with three frame
//! types: Request, Response, and Event.

use serde::{Deserialize, Serialize};

/// Version of the wire protocol this gateway speaks.
pub const PROTOCOL_VERSION: u32 = 1;

/// A gateway wire frame, the top-level message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamFrame {
    /// Client-initiated method call.
    #[serde(rename = "req")]
    Request {
        id: String,
        method: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        params: Option<serde_json::Value>,
    },

    /// Reply to a request, matched by `id`.
    #[serde(rename = "res")]
    Response {
        id: String,
        ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<ErrorShape>,
    },

    /// Server -> Client event.
    #[serde(rename = "event")]
    Event {
        event: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        seq: Option<u64>,
    },
}

/// Failure detail carried by a response frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorShape {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Server greeting sent as the first event on every connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerHello {
    pub protocol: u32,
    pub version: String,
    pub conn_id: String,
    pub methods: Vec<String>,
    pub events: Vec<String>,
}

/// Parameters for `stream.start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamStartParams {
    /// Source language tag (e.g. "hi-IN").
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "hi-IN".into()
}

/// Parameters for `stream.chunk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunkParams {
    /// Base64-encoded audio bytes for one capture window.
    pub audio: String,
}

/// Parameters for `text.convert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConvertParams {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Parameters for `signs.to_text`: recognized sign names in signing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignsToTextParams {
    pub signs: Vec<String>,
}

/// Progress notification payload, shared by the WebSocket `progress` event
/// and the batch pipeline observer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressPayload {
    pub stage: String,
    pub message: String,
    pub percent: u8,
}
