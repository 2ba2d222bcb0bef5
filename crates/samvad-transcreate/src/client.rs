//! Messages-API model client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use samvad_core::config::TranscreationConfig;
use samvad_core::error::{Result, SamvadError};

/// Single-turn completion against an external model. The adapter only ever
/// needs one prompt in, one text out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Anthropic-style `/v1/messages` client.
pub struct MessagesClient {
    config: TranscreationConfig,
    api_key: String,
    client: reqwest::Client,
}

impl MessagesClient {
    pub fn new(config: TranscreationConfig, api_key: String) -> Self {
        Self {
            config,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl ModelClient for MessagesClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        debug!(model = %self.config.model, "requesting completion");

        let resp = self
            .client
            .post(&self.config.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SamvadError::Transcreation(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SamvadError::Transcreation(format!(
                "model API error {status}: {body}"
            )));
        }

        let parsed: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| SamvadError::Transcreation(format!("bad model response: {e}")))?;

        Ok(parsed
            .content
            .first()
            .map(|b| b.text.trim().to_string())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_response_extracts_first_block() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "  {\"a\": 1}  "}], "model": "m"}"#,
        )
        .unwrap();
        assert_eq!(parsed.content[0].text.trim(), r#"{"a": 1}"#);
    }

    #[test]
    fn test_messages_response_tolerates_empty_content() {
        let parsed: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(parsed.content.is_empty());
    }
}
