//! Orchestrates the Samvad stages: transcription, cultural adaptation, ISL
//! gloss conversion, avatar lookup, and dubbed speech synthesis.
//!
//! One [`Pipeline`] is built at process start with every collaborator handle
//! and shared behind an `Arc`. The per-utterance path cannot fail (each
//! fallible stage degrades internally); the batch path propagates
//! transcription and storage failures as typed errors.

pub mod progress;

pub use progress::{ProgressSink, ProgressStage};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use samvad_avatar::ClipIndex;
use samvad_core::config::SamvadConfig;
use samvad_core::error::Result;
use samvad_core::language;
use samvad_core::types::{MediaResult, PipelineResult, SubtitleCue, Utterance};
use samvad_gloss::GlossConverter;
use samvad_media::stt::Transcriber;
use samvad_media::tts::{Synthesizer, synthesize_all};
use samvad_transcreate::Transcreator;

const SECONDS_PER_SIGN: f64 = 0.8;
const MIN_DURATION_SECONDS: f64 = 2.0;

/// Presentation-timing heuristic for how long a gloss takes to sign.
pub fn estimate_duration(word_count: usize) -> f64 {
    (word_count as f64 * SECONDS_PER_SIGN).max(MIN_DURATION_SECONDS)
}

pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    transcreator: Arc<Transcreator>,
    converter: GlossConverter,
    clips: Arc<ClipIndex>,
    synthesizer: Arc<dyn Synthesizer>,
    dub_languages: Vec<String>,
    audio_output_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        transcreator: Arc<Transcreator>,
        converter: GlossConverter,
        clips: Arc<ClipIndex>,
        synthesizer: Arc<dyn Synthesizer>,
        config: &SamvadConfig,
    ) -> Self {
        Self {
            transcriber,
            transcreator,
            converter,
            clips,
            synthesizer,
            dub_languages: config.dub_languages(),
            audio_output_dir: PathBuf::from(config.audio_output_dir()),
        }
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Run one utterance through adaptation, gloss conversion, and avatar
    /// lookup. Infallible: every stage that can degrade does so internally.
    pub async fn process_utterance(&self, utterance: &Utterance) -> PipelineResult {
        let adapted = self
            .transcreator
            .transcreate(&utterance.text, &utterance.language)
            .await
            .into_result();

        // A missing or empty adapted text falls back to the original wording
        let source = if adapted.adapted_text.trim().is_empty() {
            utterance.text.as_str()
        } else {
            adapted.adapted_text.as_str()
        };

        let gloss = self.converter.convert(source);
        let avatar = self.clips.resolve(&gloss);

        debug!(gloss = %gloss, avatar = avatar.url(), "utterance processed");

        PipelineResult {
            duration_seconds: estimate_duration(gloss.word_count()),
            gloss: gloss.to_string(),
            emotional_tone: adapted.emotional_tone,
            avatar_url: avatar.into_url(),
            cultural_notes: adapted.cultural_notes,
            name_signs: adapted.name_signs,
            emphasis_words: adapted.emphasis_words,
        }
    }

    /// Process a full recording: batch transcription, per-segment adaptation
    /// and gloss conversion, then multi-language dubbing.
    pub async fn run_media(
        &self,
        audio: Vec<u8>,
        language_hint: Option<&str>,
        progress: &ProgressSink,
    ) -> Result<MediaResult> {
        match self.run_media_inner(audio, language_hint, progress).await {
            Ok(result) => Ok(result),
            Err(err) => {
                progress.emit(ProgressStage::Error, format!("Error: {err}"), 0);
                Err(err)
            }
        }
    }

    async fn run_media_inner(
        &self,
        audio: Vec<u8>,
        language_hint: Option<&str>,
        progress: &ProgressSink,
    ) -> Result<MediaResult> {
        let started = Instant::now();

        progress.emit(ProgressStage::Transcribing, "Preparing audio...", 10);
        progress.emit(ProgressStage::Transcribing, "Transcribing audio...", 25);

        let transcript = self.transcriber.transcribe_job(audio, language_hint).await?;

        progress.emit(ProgressStage::Transcreating, "Cultural adaptation...", 40);

        let total = transcript.segments.len();
        let mut subtitles = Vec::with_capacity(total);
        for (i, segment) in transcript.segments.iter().enumerate() {
            let utterance = Utterance::from_segment(segment, &transcript.language);
            let result = self.process_utterance(&utterance).await;

            subtitles.push(SubtitleCue {
                start: segment.start,
                end: segment.end,
                text: segment.text.clone(),
                gloss: result.gloss,
                avatar_url: result.avatar_url,
                emotional_tone: result.emotional_tone,
            });

            if i % 3 == 0 {
                let percent = 40 + ((i as f64 / total.max(1) as f64) * 30.0) as u8;
                progress.emit(
                    ProgressStage::GeneratingAvatar,
                    format!("Processing segment {}/{total}", i + 1),
                    percent,
                );
            }
        }

        progress.emit(ProgressStage::Dubbing, "Generating dubbed audio...", 80);

        let dubbed = synthesize_all(
            self.synthesizer.as_ref(),
            &transcript.text,
            &self.dub_languages,
        )
        .await;
        let dubbed_audio = self.write_dubbed_audio(dubbed).await?;

        progress.emit(ProgressStage::Complete, "Processing complete!", 100);

        let result = MediaResult {
            full_transcript: transcript.text,
            language: transcript.language,
            subtitles,
            dubbed_audio,
            processing_time_ms: started.elapsed().as_millis() as u64,
            total_segments: total,
        };

        info!(
            segments = result.total_segments,
            dubbed = result.dubbed_audio.len(),
            elapsed_ms = result.processing_time_ms,
            "media processing finished"
        );
        Ok(result)
    }

    /// Write dubbed audio under the configured output directory. Returns
    /// language tag -> written file path.
    async fn write_dubbed_audio(
        &self,
        dubbed: BTreeMap<String, Vec<u8>>,
    ) -> Result<BTreeMap<String, String>> {
        if dubbed.is_empty() {
            return Ok(BTreeMap::new());
        }
        tokio::fs::create_dir_all(&self.audio_output_dir).await?;

        let mut paths = BTreeMap::new();
        for (lang, audio) in dubbed {
            let voice = language::synthesis_code(&lang);
            let id = uuid::Uuid::new_v4().simple().to_string();
            let path = self
                .audio_output_dir
                .join(format!("dub_{}_{voice}.mp3", &id[..8]));
            tokio::fs::write(&path, &audio).await?;
            debug!(language = %lang, path = %path.display(), bytes = audio.len(), "dub written");
            paths.insert(lang, path.display().to_string());
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use samvad_core::config::{AvatarConfig, SamvadConfig, SynthesisConfig};
    use samvad_core::error::SamvadError;
    use samvad_core::protocol::ProgressPayload;
    use samvad_core::types::{EmotionalTone, Transcript, TranscriptSegment};

    struct StaticTranscriber {
        transcript: Transcript,
    }

    #[async_trait]
    impl Transcriber for StaticTranscriber {
        async fn transcribe(&self, _audio: &[u8], _hint: Option<&str>) -> Result<Transcript> {
            Ok(self.transcript.clone())
        }
    }

    struct FailingTranscriber;

    #[async_trait]
    impl Transcriber for FailingTranscriber {
        async fn transcribe(&self, _audio: &[u8], _hint: Option<&str>) -> Result<Transcript> {
            Err(SamvadError::Timeout("transcription job job-7 timed out".into()))
        }
    }

    /// Succeeds for every voice except Tamil.
    struct VoicePickySynthesizer;

    #[async_trait]
    impl Synthesizer for VoicePickySynthesizer {
        async fn synthesize(&self, _text: &str, voice: &str) -> Result<Vec<u8>> {
            if voice == "ta" {
                return Err(SamvadError::Synthesis("voice ta unavailable".into()));
            }
            Ok(vec![1u8; 16])
        }
    }

    fn test_config(clips_dir: &std::path::Path, out_dir: &std::path::Path) -> SamvadConfig {
        SamvadConfig {
            avatar: Some(AvatarConfig {
                clips_dir: clips_dir.display().to_string(),
                public_prefix: "/assets/isl_clips".into(),
            }),
            synthesis: Some(SynthesisConfig {
                endpoint: None,
                api_key: None,
                api_key_env: None,
                dub_languages: vec!["hi-IN".into(), "ta-IN".into()],
                output_dir: out_dir.display().to_string(),
            }),
            ..Default::default()
        }
    }

    fn test_pipeline(
        config: &SamvadConfig,
        transcriber: Arc<dyn Transcriber>,
        transcreator: Arc<Transcreator>,
    ) -> Pipeline {
        let clips = ClipIndex::build(config.clips_dir(), &config.clip_public_prefix());
        Pipeline::new(
            transcriber,
            transcreator,
            GlossConverter::new(),
            Arc::new(clips),
            Arc::new(VoicePickySynthesizer),
            config,
        )
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<ProgressPayload>) -> Vec<ProgressPayload> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_duration_estimate() {
        assert_eq!(estimate_duration(0), 2.0);
        assert_eq!(estimate_duration(1), 2.0);
        assert_eq!(estimate_duration(2), 2.0);
        assert!((estimate_duration(4) - 3.2).abs() < 1e-9);
        assert_eq!(estimate_duration(5), 4.0);
        assert_eq!(estimate_duration(10), 8.0);
    }

    #[tokio::test]
    async fn test_process_utterance_passthrough_mode() {
        let clips = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(clips.path().join("HELLO.mp4"), b"stub").unwrap();

        let config = test_config(clips.path(), out.path());
        let pipeline = test_pipeline(
            &config,
            Arc::new(FailingTranscriber),
            Arc::new(Transcreator::passthrough()),
        );

        let result = pipeline
            .process_utterance(&Utterance::from_text("hello friend", "hi-IN"))
            .await;

        assert_eq!(result.gloss, "HELLO FRIEND");
        assert_eq!(result.avatar_url, "/assets/isl_clips/HELLO.mp4");
        assert_eq!(result.emotional_tone, EmotionalTone::Neutral);
        assert_eq!(result.duration_seconds, 2.0);
        assert_eq!(result.cultural_notes.len(), 1);
    }

    struct CannedModel {
        json: &'static str,
    }

    #[async_trait]
    impl samvad_transcreate::ModelClient for CannedModel {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.json.to_string())
        }
    }

    #[tokio::test]
    async fn test_process_utterance_uses_adapted_text() {
        let clips = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = test_config(clips.path(), out.path());

        let transcreator = Transcreator::with_client(Arc::new(CannedModel {
            json: r#"{"transcreated_text": "I go school", "emotional_tone": "happy"}"#,
        }));
        let pipeline = test_pipeline(&config, Arc::new(FailingTranscriber), Arc::new(transcreator));

        let result = pipeline
            .process_utterance(&Utterance::from_text("I am going to my school", "en-IN"))
            .await;

        assert_eq!(result.gloss, "I GO SCHOOL");
        assert_eq!(result.emotional_tone, EmotionalTone::Happy);
    }

    #[tokio::test]
    async fn test_empty_adapted_text_falls_back_to_original() {
        let clips = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = test_config(clips.path(), out.path());

        let transcreator = Transcreator::with_client(Arc::new(CannedModel {
            json: r#"{"transcreated_text": "  "}"#,
        }));
        let pipeline = test_pipeline(&config, Arc::new(FailingTranscriber), Arc::new(transcreator));

        let result = pipeline
            .process_utterance(&Utterance::from_text("hello school", "hi-IN"))
            .await;

        assert_eq!(result.gloss, "HELLO SCHOOL");
    }

    #[tokio::test]
    async fn test_run_media_full_flow() {
        let clips = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(clips.path().join("SCHOOL.mp4"), b"stub").unwrap();
        let config = test_config(clips.path(), out.path());

        let transcript = Transcript {
            text: "I am going to school. It is raining.".into(),
            language: "en".into(),
            segments: vec![
                TranscriptSegment {
                    text: "I am going to school.".into(),
                    start: 0.0,
                    end: 2.5,
                    confidence: 0.95,
                },
                TranscriptSegment {
                    text: "It is raining.".into(),
                    start: 2.5,
                    end: 4.0,
                    confidence: 0.9,
                },
            ],
        };
        let pipeline = test_pipeline(
            &config,
            Arc::new(StaticTranscriber { transcript }),
            Arc::new(Transcreator::passthrough()),
        );

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = ProgressSink::new(tx);
        let result = pipeline
            .run_media(vec![0u8; 64], Some("en-IN"), &sink)
            .await
            .unwrap();

        assert_eq!(result.total_segments, 2);
        assert_eq!(result.subtitles.len(), 2);
        assert_eq!(result.subtitles[0].text, "I am going to school.");
        assert_eq!(result.subtitles[0].gloss, "I GO SCHOOL");
        assert_eq!(result.subtitles[0].start, 0.0);
        assert_eq!(result.subtitles[0].avatar_url, "/assets/isl_clips/SCHOOL.mp4");
        assert_eq!(result.full_transcript, "I am going to school. It is raining.");

        // Tamil synthesis fails, Hindi survives and lands on disk
        assert_eq!(result.dubbed_audio.len(), 1);
        let hindi_path = result.dubbed_audio.get("hi-IN").unwrap();
        assert!(std::path::Path::new(hindi_path).exists());

        let events = drain(&mut rx);
        let stages: Vec<&str> = events.iter().map(|e| e.stage.as_str()).collect();
        assert_eq!(
            stages,
            vec![
                "transcribing",
                "transcribing",
                "transcreating",
                "generating_avatar",
                "dubbing",
                "complete"
            ]
        );
        let percents: Vec<u8> = events.iter().map(|e| e.percent).collect();
        assert_eq!(percents, vec![10, 25, 40, 40, 80, 100]);
    }

    #[tokio::test]
    async fn test_run_media_transcription_failure() {
        let clips = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = test_config(clips.path(), out.path());
        let pipeline = test_pipeline(
            &config,
            Arc::new(FailingTranscriber),
            Arc::new(Transcreator::passthrough()),
        );

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = ProgressSink::new(tx);
        let err = pipeline
            .run_media(vec![0u8; 64], None, &sink)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("timed out"));
        let events = drain(&mut rx);
        let last = events.last().unwrap();
        assert_eq!(last.stage, "error");
        assert_eq!(last.percent, 0);
        assert!(last.message.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_run_media_write_failure_is_fatal() {
        let clips = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        // Point the output dir at a plain file so the write fails
        let blocker = out.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();

        let config = test_config(clips.path(), &blocker);
        let transcript = Transcript {
            text: "hello".into(),
            language: "hi".into(),
            segments: vec![],
        };
        let pipeline = test_pipeline(
            &config,
            Arc::new(StaticTranscriber { transcript }),
            Arc::new(Transcreator::passthrough()),
        );

        let result = pipeline
            .run_media(vec![0u8; 8], None, &ProgressSink::disabled())
            .await;
        assert!(result.is_err());
    }
}
