//! Live stream sessions.
//!
//! Each session owns a worker task that serializes chunk processing in
//! submission order. The handle lives in the connection table; dropping it or
//! cancelling the token stops the worker between chunks, never mid-chunk.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use samvad_core::types::Utterance;
use samvad_pipeline::ProgressStage;

use crate::events::{send_event, send_progress};
use crate::state::GatewayState;

/// Chunks queued beyond this backlog are dropped.
const CHUNK_QUEUE_DEPTH: usize = 8;

struct QueuedChunk {
    seq: u64,
    audio: Vec<u8>,
}

/// Handle to one connection's live stream session.
pub struct StreamSession {
    pub language: String,
    next_seq: u64,
    chunk_tx: mpsc::Sender<QueuedChunk>,
    cancel: CancellationToken,
}

impl StreamSession {
    /// Create a session bound to a source language and spawn its worker.
    pub fn start(state: Arc<GatewayState>, conn_id: String, language: String) -> Self {
        let (chunk_tx, mut chunk_rx) = mpsc::channel::<QueuedChunk>(CHUNK_QUEUE_DEPTH);
        let cancel = CancellationToken::new();

        let worker_cancel = cancel.clone();
        let worker_language = language.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = worker_cancel.cancelled() => break,
                    chunk = chunk_rx.recv() => {
                        let Some(chunk) = chunk else { break };
                        process_chunk(&state, &conn_id, &worker_language, chunk).await;
                    }
                }
            }
            debug!(conn_id = %conn_id, "Stream worker stopped");
        });

        Self {
            language,
            next_seq: 0,
            chunk_tx,
            cancel,
        }
    }

    /// Queue one audio chunk. Returns the sequence number stamped on the
    /// eventual result event, or `None` when the queue is full and the chunk
    /// was dropped.
    pub fn push_chunk(&mut self, audio: Vec<u8>) -> Option<u64> {
        let seq = self.next_seq + 1;
        match self.chunk_tx.try_send(QueuedChunk { seq, audio }) {
            Ok(()) => {
                self.next_seq = seq;
                Some(seq)
            }
            Err(_) => None,
        }
    }

    /// Stop the worker. Takes effect between chunks; an in-flight chunk
    /// finishes and its events are delivered to whoever still listens.
    pub fn stop(self) {
        self.cancel.cancel();
    }
}

/// Run one chunk through transcription and the per-utterance pipeline,
/// reporting progress to the owning connection.
async fn process_chunk(
    state: &Arc<GatewayState>,
    conn_id: &str,
    language: &str,
    chunk: QueuedChunk,
) {
    send_progress(state, conn_id, ProgressStage::Transcribing, "Listening...", 20).await;

    let transcript = match state.transcriber.transcribe(&chunk.audio, Some(language)).await {
        Ok(t) => t,
        Err(e) => {
            warn!(conn_id = %conn_id, %e, "Chunk transcription failed");
            let message = format!("Error: {}", truncate_chars(&e.to_string(), 100));
            send_progress(state, conn_id, ProgressStage::Error, message, 0).await;
            return;
        }
    };

    let text = transcript.text.trim();
    if text.is_empty() {
        send_progress(state, conn_id, ProgressStage::Idle, "No speech detected", 0).await;
        return;
    }

    send_progress(state, conn_id, ProgressStage::Transcreating, "Adapting...", 50).await;

    let utterance = Utterance::from_text(text, language);
    let result = state.pipeline.process_utterance(&utterance).await;

    send_progress(state, conn_id, ProgressStage::GeneratingAvatar, "Generating ISL...", 75).await;

    send_event(
        state,
        conn_id,
        "isl.result",
        serde_json::to_value(&result).ok(),
        Some(chunk.seq),
    )
    .await;

    send_progress(
        state,
        conn_id,
        ProgressStage::Complete,
        format!("'{}...' processed", truncate_chars(text, 50)),
        100,
    )
    .await;
}

/// First `max` characters of `s`, respecting char boundaries.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
