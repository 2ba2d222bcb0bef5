//! Best-effort progress reporting.

use tokio::sync::mpsc::UnboundedSender;

use samvad_core::protocol::ProgressPayload;

/// Stages a pipeline run advances through, in order. `Idle` brackets runs on
/// the streaming side; `Error` reports a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    Idle,
    Transcribing,
    Transcreating,
    GeneratingAvatar,
    Dubbing,
    Complete,
    Error,
}

impl ProgressStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Transcribing => "transcribing",
            Self::Transcreating => "transcreating",
            Self::GeneratingAvatar => "generating_avatar",
            Self::Dubbing => "dubbing",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

/// Fire-and-forget progress observer. Emitting never blocks, and a dropped
/// receiver never fails the pipeline.
#[derive(Clone, Default)]
pub struct ProgressSink {
    tx: Option<UnboundedSender<ProgressPayload>>,
}

impl ProgressSink {
    pub fn new(tx: UnboundedSender<ProgressPayload>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that drops every notification.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, stage: ProgressStage, message: impl Into<String>, percent: u8) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(ProgressPayload {
                stage: stage.as_str().to_string(),
                message: message.into(),
                percent,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names_are_wire_format() {
        assert_eq!(ProgressStage::GeneratingAvatar.as_str(), "generating_avatar");
        assert_eq!(ProgressStage::Error.as_str(), "error");
    }

    #[tokio::test]
    async fn test_emit_delivers_in_order() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = ProgressSink::new(tx);

        sink.emit(ProgressStage::Transcribing, "Listening...", 20);
        sink.emit(ProgressStage::Complete, "done", 100);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.stage, "transcribing");
        assert_eq!(first.percent, 20);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.stage, "complete");
    }

    #[test]
    fn test_emit_survives_dropped_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let sink = ProgressSink::new(tx);
        sink.emit(ProgressStage::Dubbing, "Generating dubbed audio...", 80);
        // No panic, no error surface
    }
}
