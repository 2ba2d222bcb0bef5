//! Dubbed speech synthesis.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use samvad_core::config::SynthesisConfig;
use samvad_core::error::{Result, SamvadError};
use samvad_core::language;

/// Produces spoken audio for a text in the given voice.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>>;
}

/// JSON-over-HTTP synthesis client.
pub struct HttpSynthesizer {
    config: SynthesisConfig,
    client: reqwest::Client,
}

impl HttpSynthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or_else(|| SamvadError::Synthesis("no synthesis endpoint configured".into()))?;

        let mut req = self.client.post(endpoint).json(&json!({
            "text": text,
            "voice": voice,
            "format": "mp3",
        }));
        if let Some(key) = self.config.resolve_api_key() {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| SamvadError::Synthesis(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SamvadError::Synthesis(format!(
                "synthesis API error {status}: {body}"
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SamvadError::Synthesis(format!("body read failed: {e}")))?;

        debug!(voice, audio_bytes = bytes.len(), "synthesized audio");
        Ok(bytes.to_vec())
    }
}

/// Dub `text` into each language independently. A failing language is logged
/// and skipped so the rest still land in the result map.
pub async fn synthesize_all(
    synth: &dyn Synthesizer,
    text: &str,
    languages: &[String],
) -> BTreeMap<String, Vec<u8>> {
    let mut out = BTreeMap::new();
    for lang in languages {
        let voice = language::synthesis_code(lang);
        match synth.synthesize(text, voice).await {
            Ok(audio) => {
                out.insert(lang.clone(), audio);
            }
            Err(err) => {
                warn!(language = %lang, %err, "dubbing failed, skipping language");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedSynthesizer {
        fail_voice: &'static str,
    }

    #[async_trait]
    impl Synthesizer for CannedSynthesizer {
        async fn synthesize(&self, _text: &str, voice: &str) -> Result<Vec<u8>> {
            if voice == self.fail_voice {
                return Err(SamvadError::Synthesis(format!("voice {voice} unavailable")));
            }
            Ok(voice.as_bytes().to_vec())
        }
    }

    #[tokio::test]
    async fn test_one_failing_language_does_not_block_others() {
        let synth = CannedSynthesizer { fail_voice: "ta" };
        let langs = vec!["hi-IN".to_string(), "ta-IN".to_string(), "te-IN".to_string()];

        let out = synthesize_all(&synth, "namaste", &langs).await;

        assert_eq!(out.len(), 2);
        assert_eq!(out.get("hi-IN").map(Vec::as_slice), Some(b"hi".as_slice()));
        assert_eq!(out.get("te-IN").map(Vec::as_slice), Some(b"te".as_slice()));
        assert!(!out.contains_key("ta-IN"));
    }

    #[tokio::test]
    async fn test_unknown_language_dubs_with_english_voice() {
        let synth = CannedSynthesizer { fail_voice: "none" };
        let langs = vec!["xx-XX".to_string()];

        let out = synthesize_all(&synth, "hello", &langs).await;
        assert_eq!(out.get("xx-XX").map(Vec::as_slice), Some(b"en".as_slice()));
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_an_error() {
        let config: SynthesisConfig = serde_json::from_str("{}").unwrap();
        let synth = HttpSynthesizer::new(config);
        let err = synth.synthesize("hello", "hi").await.unwrap_err();
        assert!(err.to_string().contains("endpoint"));
    }
}
