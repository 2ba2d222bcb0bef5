//! Configuration loading and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level Samvad configuration, loaded from `samvad.json` (JSON5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamvadConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<TranscriptionConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcreation: Option<TranscreationConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<SynthesisConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<AvatarConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: None,
        }
    }
}

fn default_port() -> u16 {
    8790
}

/// Transcription collaborator (Whisper-style HTTP API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Model name (e.g. "whisper-1").
    #[serde(default = "default_transcription_model")]
    pub model: String,

    /// Seconds between batch-job status polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Status polls before a batch job is declared timed out.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_transcription_model() -> String {
    "whisper-1".into()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_max_poll_attempts() -> u32 {
    60
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_key_env: None,
            model: default_transcription_model(),
            poll_interval_secs: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl TranscriptionConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }
}

/// Cultural-adaptation model collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscreationConfig {
    /// Messages API endpoint. The adapter runs in passthrough mode when no
    /// API key resolves, regardless of this value.
    #[serde(default = "default_transcreation_endpoint")]
    pub endpoint: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default = "default_transcreation_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_transcreation_endpoint() -> String {
    "https://api.anthropic.com/v1/messages".into()
}

fn default_transcreation_model() -> String {
    "claude-3-5-sonnet-20241022".into()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f64 {
    0.3
}

impl Default for TranscreationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_transcreation_endpoint(),
            api_key: None,
            api_key_env: None,
            model: default_transcreation_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl TranscreationConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }
}

/// Speech-synthesis collaborator (dubbed audio).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Target languages for dubbing, attempted independently.
    #[serde(default = "default_dub_languages")]
    pub dub_languages: Vec<String>,

    /// Directory dubbed audio files are written to.
    #[serde(default = "default_audio_output_dir")]
    pub output_dir: String,
}

fn default_dub_languages() -> Vec<String> {
    vec!["hi-IN".into(), "ta-IN".into(), "te-IN".into()]
}

fn default_audio_output_dir() -> String {
    "assets/audio".into()
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_key_env: None,
            dub_languages: default_dub_languages(),
            output_dir: default_audio_output_dir(),
        }
    }
}

impl SynthesisConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }
}

/// Avatar clip index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    /// Directory scanned for sign clips at startup.
    #[serde(default = "default_clips_dir")]
    pub clips_dir: String,

    /// URL prefix clip references are served under.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

fn default_clips_dir() -> String {
    "assets/isl_clips".into()
}

fn default_public_prefix() -> String {
    "/assets/isl_clips".into()
}

/// Input validation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_text_chars() -> usize {
    500
}

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format, "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Base level used when RUST_LOG is unset (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "samvad_gateway=debug").
    #[serde(default)]
    pub filters: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: None,
            filters: Vec::new(),
        }
    }
}

fn default_log_format() -> String {
    "plain".into()
}

/// Resolve a secret from its inline field, falling back to the named env var.
pub fn resolve_secret_field(direct: &Option<String>, env_var: &Option<String>) -> Option<String> {
    if let Some(val) = direct {
        if !val.is_empty() {
            return Some(val.clone());
        }
    }
    if let Some(env) = env_var {
        if let Ok(val) = std::env::var(env) {
            if !val.is_empty() {
                return Some(val);
            }
        }
    }
    None
}

/// Expand `${ENV_VAR}` references against the process environment.
fn substitute_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .into_owned()
}

impl SamvadConfig {
    /// Load config from a JSON5 file, expanding `${ENV_VAR}` references.
    /// A missing file yields the default config.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::SamvadError::Io)?;

        // Env expansion runs on the raw text, before JSON5 sees it
        let substituted = substitute_env_vars(&raw);

        let config: SamvadConfig = json5::from_str(&substituted)
            .map_err(|e| crate::error::SamvadError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Server port.
    pub fn server_port(&self) -> u16 {
        self.server.as_ref().map(|s| s.port).unwrap_or_else(default_port)
    }

    /// Server bind address.
    pub fn bind_addr(&self) -> String {
        let host = self
            .server
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| "127.0.0.1".into());
        format!("{host}:{}", self.server_port())
    }

    pub fn max_text_chars(&self) -> usize {
        self.limits
            .as_ref()
            .map(|l| l.max_text_chars)
            .unwrap_or_else(default_max_text_chars)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.limits
            .as_ref()
            .map(|l| l.max_upload_bytes)
            .unwrap_or_else(default_max_upload_bytes)
    }

    pub fn dub_languages(&self) -> Vec<String> {
        self.synthesis
            .as_ref()
            .map(|s| s.dub_languages.clone())
            .unwrap_or_else(default_dub_languages)
    }

    pub fn clips_dir(&self) -> String {
        self.avatar
            .as_ref()
            .map(|a| a.clips_dir.clone())
            .unwrap_or_else(default_clips_dir)
    }

    pub fn clip_public_prefix(&self) -> String {
        self.avatar
            .as_ref()
            .map(|a| a.public_prefix.clone())
            .unwrap_or_else(default_public_prefix)
    }

    pub fn audio_output_dir(&self) -> String {
        self.synthesis
            .as_ref()
            .map(|s| s.output_dir.clone())
            .unwrap_or_else(default_audio_output_dir)
    }

    /// Check the config for problems. Warnings are survivable, errors are fatal.
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if let Some(server) = &self.server {
            if server.port == 0 {
                errors.push("Server port cannot be 0".to_string());
            }
        }

        let has_model_key = self
            .transcreation
            .as_ref()
            .and_then(|tc| tc.resolve_api_key())
            .is_some();
        if !has_model_key {
            warnings.push(
                "Transcreation has no API key configured; running in passthrough mode".to_string(),
            );
        }

        if let Some(tr) = &self.transcription {
            if tr.endpoint.is_some() && tr.resolve_api_key().is_none() {
                warnings.push("Transcription endpoint set but no API key resolves".to_string());
            }
            if tr.max_poll_attempts == 0 {
                errors.push("transcription.max_poll_attempts cannot be 0".to_string());
            }
        }

        if !Path::new(&self.clips_dir()).is_dir() {
            warnings.push(format!(
                "Avatar clips directory not found: {} (resolver will match nothing)",
                self.clips_dir()
            ));
        }

        for lang in self.dub_languages() {
            if !crate::language::is_supported(&lang) {
                warnings.push(format!("Dub language '{lang}' is not in the supported set"));
            }
        }

        (warnings, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_expansion() {
        // SAFETY: nothing else in this test binary reads this variable
        unsafe { std::env::set_var("TEST_SV_KEY", "sk-test-123") };
        let input = r#"{"key": "${TEST_SV_KEY}", "other": "plain"}"#;
        let result = substitute_env_vars(input);
        assert!(result.contains("sk-test-123"));
        assert!(result.contains("plain"));
        unsafe { std::env::remove_var("TEST_SV_KEY") };
    }

    #[test]
    fn test_env_expansion_missing_var() {
        let input = r#"{"key": "${NONEXISTENT_VAR_SV_TEST}"}"#;
        let result = substitute_env_vars(input);
        assert!(result.contains(r#""""#), "unset vars expand to empty: {result}");
    }

    #[test]
    fn test_defaults() {
        let config = SamvadConfig::default();
        assert_eq!(config.server_port(), 8790);
        assert_eq!(config.bind_addr(), "127.0.0.1:8790");
        assert_eq!(config.max_text_chars(), 500);
        assert_eq!(
            config.dub_languages(),
            vec!["hi-IN".to_string(), "ta-IN".to_string(), "te-IN".to_string()]
        );
        assert_eq!(config.clips_dir(), "assets/isl_clips");
    }

    #[test]
    fn test_transcreation_resolve_api_key() {
        // SAFETY: nothing else in this test binary reads this variable
        unsafe { std::env::set_var("TEST_SV_API_KEY", "from-env") };
        let tc: TranscreationConfig = json5::from_str(
            r#"{ api_key_env: "TEST_SV_API_KEY" }"#,
        )
        .unwrap();
        assert_eq!(tc.resolve_api_key(), Some("from-env".into()));

        let tc2: TranscreationConfig = json5::from_str(
            r#"{ api_key: "direct-key", api_key_env: "TEST_SV_API_KEY" }"#,
        )
        .unwrap();
        // The inline key wins over the env reference
        assert_eq!(tc2.resolve_api_key(), Some("direct-key".into()));
        unsafe { std::env::remove_var("TEST_SV_API_KEY") };
    }

    #[test]
    fn test_transcreation_defaults() {
        let tc: TranscreationConfig = json5::from_str("{}").unwrap();
        assert_eq!(tc.model, "claude-3-5-sonnet-20241022");
        assert_eq!(tc.max_tokens, 1000);
        assert_eq!(tc.temperature, 0.3);
        assert!(tc.endpoint.contains("api.anthropic.com"));
    }

    #[test]
    fn test_transcription_poll_defaults() {
        let tr: TranscriptionConfig = json5::from_str("{}").unwrap();
        assert_eq!(tr.poll_interval_secs, 5);
        assert_eq!(tr.max_poll_attempts, 60);
        assert_eq!(tr.model, "whisper-1");
    }

    #[test]
    fn test_logging_section_defaults() {
        let config: SamvadConfig = json5::from_str(r#"{ "logging": {} }"#).unwrap();
        let logging = config.logging.expect("logging should be present");
        assert_eq!(logging.format, "plain");
        assert!(logging.level.is_none());
        assert!(logging.filters.is_empty());
    }

    #[test]
    fn test_validate_warns_on_passthrough() {
        let config = SamvadConfig::default();
        let (warnings, errors) = config.validate();
        assert!(errors.is_empty());
        assert!(
            warnings.iter().any(|w| w.to_lowercase().contains("passthrough")),
            "Expected a passthrough-mode warning, got: {warnings:?}"
        );
    }

    #[test]
    fn test_validate_zero_port_errors() {
        let config: SamvadConfig = json5::from_str(r#"{ server: { port: 0 } }"#).unwrap();
        let (_warnings, errors) = config.validate();
        assert!(
            errors.iter().any(|e| e.contains("port")),
            "Expected a port error, got: {errors:?}"
        );
    }
}
