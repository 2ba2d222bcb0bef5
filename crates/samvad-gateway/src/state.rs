//! Shared gateway state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use samvad_core::config::SamvadConfig;
use samvad_media::stt::Transcriber;
use samvad_pipeline::Pipeline;

use crate::session::StreamSession;

/// State shared across every connection and request handler.
pub struct GatewayState {
    pub config: Arc<SamvadConfig>,

    /// Per-utterance and batch processing, built once at startup.
    pub pipeline: Arc<Pipeline>,

    /// Chunk-level transcription for the streaming path. The batch path goes
    /// through the pipeline instead.
    pub transcriber: Arc<dyn Transcriber>,

    /// Active connections keyed by connection id.
    pub connections: RwLock<HashMap<String, ConnectionState>>,
}

/// Bookkeeping for one live WebSocket connection.
pub struct ConnectionState {
    pub conn_id: String,

    /// Outbound frames for this connection, drained by its writer task.
    pub event_tx: mpsc::UnboundedSender<String>,

    /// Live stream session, if one has been started.
    pub session: Option<StreamSession>,
}

impl GatewayState {
    pub fn new(
        config: Arc<SamvadConfig>,
        pipeline: Arc<Pipeline>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            config,
            pipeline,
            transcriber,
            connections: RwLock::new(HashMap::new()),
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
