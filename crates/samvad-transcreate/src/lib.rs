//! Cultural adaptation ("transcreation") of text for ISL delivery.
//!
//! Spoken-language text is rewritten for deaf Indian audiences before gloss
//! conversion: idioms become visual equivalents, named entities get ISL
//! name-signs, and the emotional tone is flagged for the avatar layer.
//!
//! The adapter is deliberately unable to fail. When the model is not
//! configured, unreachable, or returns garbage, the input text passes through
//! unchanged and the outcome says so. Callers that need to distinguish a real
//! adaptation from a passthrough match on [`TranscreationOutcome`]; callers
//! that do not call [`TranscreationOutcome::into_result`].

mod client;
mod prompt;

pub use client::{MessagesClient, ModelClient};
pub use prompt::build_prompt;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use samvad_core::config::TranscreationConfig;
use samvad_core::types::TranscreationResult;

const PASSTHROUGH_NOTE: &str = "No cultural adaptation (API key not configured or fallback mode)";

/// Why an utterance passed through unadapted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassthroughReason {
    NotConfigured,
    MalformedResponse,
    RequestFailed,
}

/// Tagged adaptation outcome. Both arms carry a fully-populated result.
#[derive(Debug, Clone)]
pub enum TranscreationOutcome {
    Adapted(TranscreationResult),
    Passthrough {
        result: TranscreationResult,
        reason: PassthroughReason,
    },
}

impl TranscreationOutcome {
    pub fn is_adapted(&self) -> bool {
        matches!(self, Self::Adapted(_))
    }

    pub fn result(&self) -> &TranscreationResult {
        match self {
            Self::Adapted(result) => result,
            Self::Passthrough { result, .. } => result,
        }
    }

    /// Erase the tag for callers that treat both arms alike.
    pub fn into_result(self) -> TranscreationResult {
        match self {
            Self::Adapted(result) => result,
            Self::Passthrough { result, .. } => result,
        }
    }
}

/// The cultural-adaptation stage.
pub struct Transcreator {
    client: Option<Arc<dyn ModelClient>>,
}

impl Transcreator {
    /// Build from config. Without a resolvable API key the adapter runs in
    /// passthrough mode for every call.
    pub fn from_config(config: &TranscreationConfig) -> Self {
        match config.resolve_api_key() {
            Some(key) => Self {
                client: Some(Arc::new(MessagesClient::new(config.clone(), key))),
            },
            None => {
                info!("no transcreation API key resolves, running in passthrough mode");
                Self { client: None }
            }
        }
    }

    /// Substitute an arbitrary model client.
    pub fn with_client(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// An adapter that always passes text through.
    pub fn passthrough() -> Self {
        Self { client: None }
    }

    /// Adapt one utterance. Never errors; degraded conditions come back as
    /// tagged passthroughs.
    pub async fn transcreate(&self, text: &str, source_language: &str) -> TranscreationOutcome {
        let Some(client) = &self.client else {
            return passthrough_outcome(text, PassthroughReason::NotConfigured);
        };

        let prompt = build_prompt(text, source_language);
        let raw = match client.complete(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, "transcreation call failed, passing text through");
                return passthrough_outcome(text, PassthroughReason::RequestFailed);
            }
        };

        match serde_json::from_str::<TranscreationResult>(strip_fences(&raw)) {
            Ok(result) => TranscreationOutcome::Adapted(result),
            Err(err) => {
                warn!(%err, "transcreation response was not valid JSON, passing text through");
                passthrough_outcome(text, PassthroughReason::MalformedResponse)
            }
        }
    }
}

fn passthrough_outcome(text: &str, reason: PassthroughReason) -> TranscreationOutcome {
    TranscreationOutcome::Passthrough {
        result: TranscreationResult {
            adapted_text: text.to_string(),
            cultural_notes: vec![PASSTHROUGH_NOTE.to_string()],
            ..Default::default()
        },
        reason,
    }
}

/// Strip a markdown code fence (with optional `json` tag) from a model
/// response. Bare JSON passes through untouched.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = match rest.split_once("```") {
        Some((inner, _)) => inner,
        None => rest,
    };
    inner.strip_prefix("json").unwrap_or(inner).trim()
}
