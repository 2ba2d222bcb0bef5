use thiserror::Error;

#[derive(Debug, Error)]
pub enum SamvadError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Transcreation error: {0}")]
    Transcreation(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Avatar error: {0}")]
    Avatar(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SamvadError>;
