//! Speech-to-text from raw audio bytes.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use samvad_core::config::TranscriptionConfig;
use samvad_core::error::{Result, SamvadError};
use samvad_core::types::{Transcript, TranscriptSegment};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Turns audio bytes into a timestamped transcript. Empty speech is a
/// successful, empty transcript, not an error.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8], language_hint: Option<&str>) -> Result<Transcript>;

    /// Long-form variant for full recordings. Collaborators without a job API
    /// fall back to the direct call.
    async fn transcribe_job(
        &self,
        audio: Vec<u8>,
        language_hint: Option<&str>,
    ) -> Result<Transcript> {
        self.transcribe(&audio, language_hint).await
    }
}

/// Whisper-style multipart HTTP transcription client.
pub struct HttpTranscriber {
    config: TranscriptionConfig,
    client: reqwest::Client,
}

impl HttpTranscriber {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> &str {
        self.config.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn api_key(&self) -> Result<String> {
        self.config.resolve_api_key().ok_or_else(|| {
            SamvadError::Transcription("no transcription API key configured".into())
        })
    }

    fn form(&self, audio: Vec<u8>, language_hint: Option<&str>) -> Result<reqwest::multipart::Form> {
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| SamvadError::Transcription(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json")
            .part("file", part);

        if let Some(hint) = language_hint {
            // The API takes a bare ISO 639-1 code, not a BCP 47 tag
            form = form.text("language", short_code(hint));
        }
        Ok(form)
    }

    async fn poll_job(&self, job_id: &str, language_hint: Option<&str>) -> Result<Transcript> {
        let api_key = self.api_key()?;
        let url = format!("{}/jobs/{job_id}", self.endpoint());
        let interval = std::time::Duration::from_secs(self.config.poll_interval_secs);

        for attempt in 1..=self.config.max_poll_attempts {
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&api_key)
                .send()
                .await
                .map_err(|e| SamvadError::Transcription(format!("job status fetch failed: {e}")))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(SamvadError::Transcription(format!(
                    "job status error {status}: {body}"
                )));
            }

            let job: JobStatus = resp
                .json()
                .await
                .map_err(|e| SamvadError::Transcription(format!("bad job status response: {e}")))?;

            match job.status {
                JobState::Completed => {
                    info!(job_id, attempt, "transcription job completed");
                    let body = job.result.ok_or_else(|| {
                        SamvadError::Transcription(format!(
                            "transcription job {job_id} completed without a result"
                        ))
                    })?;
                    return Ok(into_transcript(body, language_hint));
                }
                JobState::Failed => {
                    let reason = job.error.unwrap_or_else(|| "unknown".into());
                    return Err(SamvadError::Transcription(format!(
                        "transcription job {job_id} failed: {reason}"
                    )));
                }
                JobState::Queued | JobState::InProgress => {
                    debug!(job_id, attempt, "transcription job still running");
                    tokio::time::sleep(interval).await;
                }
            }
        }

        Err(SamvadError::Timeout(format!(
            "transcription job {job_id} timed out"
        )))
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio: &[u8], language_hint: Option<&str>) -> Result<Transcript> {
        let api_key = self.api_key()?;
        let form = self.form(audio.to_vec(), language_hint)?;

        debug!(
            url = self.endpoint(),
            model = %self.config.model,
            audio_bytes = audio.len(),
            "sending audio for transcription"
        );

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SamvadError::Transcription(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SamvadError::Transcription(format!(
                "transcription API error {status}: {body}"
            )));
        }

        let body: VerboseTranscription = resp
            .json()
            .await
            .map_err(|e| SamvadError::Transcription(format!("bad transcription response: {e}")))?;

        Ok(into_transcript(body, language_hint))
    }

    /// Submit a long-form transcription job and poll until it finishes.
    /// A job still running after `max_poll_attempts` checks is a timeout.
    async fn transcribe_job(
        &self,
        audio: Vec<u8>,
        language_hint: Option<&str>,
    ) -> Result<Transcript> {
        let api_key = self.api_key()?;
        let url = format!("{}/jobs", self.endpoint());
        let form = self.form(audio, language_hint)?;

        debug!(url, model = %self.config.model, "submitting transcription job");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SamvadError::Transcription(format!("job submit failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SamvadError::Transcription(format!(
                "job submit error {status}: {body}"
            )));
        }

        let job: JobStatus = resp
            .json()
            .await
            .map_err(|e| SamvadError::Transcription(format!("bad job submit response: {e}")))?;

        info!(job_id = %job.id, "transcription job submitted");
        self.poll_job(&job.id, language_hint).await
    }
}

fn short_code(tag: &str) -> String {
    tag.chars().take(2).collect()
}

/// Whisper `verbose_json` response shape.
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
}

#[derive(Debug, Deserialize)]
struct VerboseSegment {
    text: String,
    start: f64,
    end: f64,
    #[serde(default)]
    no_speech_prob: f64,
}

#[derive(Debug, Deserialize)]
struct JobStatus {
    id: String,
    status: JobState,
    #[serde(default)]
    result: Option<VerboseTranscription>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum JobState {
    Queued,
    InProgress,
    Completed,
    Failed,
}

fn into_transcript(body: VerboseTranscription, language_hint: Option<&str>) -> Transcript {
    let language = body
        .language
        .filter(|l| !l.is_empty())
        .or_else(|| language_hint.map(str::to_string))
        .unwrap_or_else(|| "hi".into());

    let segments = body
        .segments
        .into_iter()
        .map(|seg| TranscriptSegment {
            text: seg.text.trim().to_string(),
            start: seg.start,
            end: seg.end,
            confidence: 1.0 - seg.no_speech_prob,
        })
        .collect();

    Transcript {
        text: body.text.trim().to_string(),
        language,
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_json_mapping() {
        let body: VerboseTranscription = serde_json::from_str(
            r#"{
                "text": " Main school ja raha hoon. ",
                "language": "hi",
                "segments": [
                    {"text": " Main school ja raha hoon.", "start": 0.0, "end": 2.4, "no_speech_prob": 0.1}
                ]
            }"#,
        )
        .unwrap();

        let transcript = into_transcript(body, Some("hi-IN"));
        assert_eq!(transcript.text, "Main school ja raha hoon.");
        assert_eq!(transcript.language, "hi");
        assert_eq!(transcript.segments.len(), 1);
        assert_eq!(transcript.segments[0].text, "Main school ja raha hoon.");
        assert!((transcript.segments[0].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_empty_transcription_is_not_an_error() {
        let body: VerboseTranscription =
            serde_json::from_str(r#"{"text": "  ", "segments": []}"#).unwrap();
        let transcript = into_transcript(body, Some("hi-IN"));
        assert!(transcript.is_empty());
        // Language falls back to the hint
        assert_eq!(transcript.language, "hi-IN");
    }

    #[test]
    fn test_job_status_states() {
        let queued: JobStatus =
            serde_json::from_str(r#"{"id": "job-1", "status": "queued"}"#).unwrap();
        assert_eq!(queued.status, JobState::Queued);

        let running: JobStatus =
            serde_json::from_str(r#"{"id": "job-1", "status": "in_progress"}"#).unwrap();
        assert_eq!(running.status, JobState::InProgress);

        let failed: JobStatus = serde_json::from_str(
            r#"{"id": "job-1", "status": "failed", "error": "unsupported codec"}"#,
        )
        .unwrap();
        assert_eq!(failed.status, JobState::Failed);
        assert_eq!(failed.error.as_deref(), Some("unsupported codec"));

        let done: JobStatus = serde_json::from_str(
            r#"{"id": "job-1", "status": "completed", "result": {"text": "hello", "segments": []}}"#,
        )
        .unwrap();
        assert_eq!(done.status, JobState::Completed);
        assert!(done.result.is_some());
    }

    #[test]
    fn test_language_hint_shortened() {
        assert_eq!(short_code("hi-IN"), "hi");
        assert_eq!(short_code("ta-IN"), "ta");
        assert_eq!(short_code("en"), "en");
    }

    /// Stub job API: submission always yields `job-9`, every status poll
    /// answers with the given body.
    async fn serve_job_status(status: serde_json::Value) -> String {
        use axum::routing::{get, post};
        use axum::{Json, Router};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let app = Router::new()
            .route(
                "/jobs",
                post(|| async { Json(serde_json::json!({"id": "job-9", "status": "queued"})) }),
            )
            .route(
                "/jobs/{id}",
                get(move || {
                    let status = status.clone();
                    async move { Json(status) }
                }),
            );

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://127.0.0.1:{port}")
    }

    fn job_config(endpoint: String) -> TranscriptionConfig {
        TranscriptionConfig {
            endpoint: Some(endpoint),
            api_key: Some("test-key".into()),
            poll_interval_secs: 0,
            max_poll_attempts: 2,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_job_stuck_in_progress_times_out() {
        let endpoint =
            serve_job_status(serde_json::json!({"id": "job-9", "status": "in_progress"})).await;
        let transcriber = HttpTranscriber::new(job_config(endpoint));

        let err = transcriber
            .transcribe_job(vec![0u8; 16], Some("hi-IN"))
            .await
            .unwrap_err();

        assert!(matches!(err, SamvadError::Timeout(_)), "expected timeout, got: {err}");
        assert!(err.to_string().contains("job-9"));
    }

    #[tokio::test]
    async fn test_job_failure_reason_surfaces() {
        let endpoint = serve_job_status(serde_json::json!({
            "id": "job-9",
            "status": "failed",
            "error": "unsupported codec"
        }))
        .await;
        let transcriber = HttpTranscriber::new(job_config(endpoint));

        let err = transcriber
            .transcribe_job(vec![0u8; 16], None)
            .await
            .unwrap_err();

        assert!(matches!(err, SamvadError::Transcription(_)), "expected failure, got: {err}");
        assert!(err.to_string().contains("job-9"));
        assert!(err.to_string().contains("unsupported codec"));
    }

    #[tokio::test]
    async fn test_job_completion_returns_transcript() {
        let endpoint = serve_job_status(serde_json::json!({
            "id": "job-9",
            "status": "completed",
            "result": {"text": "namaste", "language": "hi", "segments": []}
        }))
        .await;
        let transcriber = HttpTranscriber::new(job_config(endpoint));

        let transcript = transcriber
            .transcribe_job(vec![0u8; 16], Some("hi-IN"))
            .await
            .unwrap();

        assert_eq!(transcript.text, "namaste");
        assert_eq!(transcript.language, "hi");
    }
}
