use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Emotional tone detected during transcreation, carried through to the
/// avatar layer for expression control.
///
/// Deserialization is tolerant: any unrecognized tone collapses to neutral
/// rather than failing the whole response parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EmotionalTone {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Urgent,
    Sarcastic,
    Excited,
    Questioning,
    Surprised,
}

impl From<String> for EmotionalTone {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "happy" => Self::Happy,
            "sad" => Self::Sad,
            "angry" => Self::Angry,
            "urgent" => Self::Urgent,
            "sarcastic" => Self::Sarcastic,
            "excited" => Self::Excited,
            "questioning" => Self::Questioning,
            "surprised" => Self::Surprised,
            _ => Self::Neutral,
        }
    }
}

/// Time span of an utterance within its source recording, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

/// A single unit of input text entering the pipeline. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    /// BCP-47 source language tag (e.g. "hi-IN").
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<TimeSpan>,
}

impl Utterance {
    pub fn from_text(text: &str, language: &str) -> Self {
        Self {
            text: text.to_string(),
            language: language.to_string(),
            span: None,
        }
    }

    pub fn from_segment(segment: &TranscriptSegment, language: &str) -> Self {
        Self {
            text: segment.text.clone(),
            language: language.to_string(),
            span: Some(TimeSpan {
                start: segment.start,
                end: segment.end,
            }),
        }
    }
}

/// Output of the cultural-adaptation stage.
///
/// Every field carries a serde default so a partially-filled model response
/// still deserializes into a fully-populated result. Callers never branch on
/// field presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscreationResult {
    #[serde(default, alias = "transcreated_text")]
    pub adapted_text: String,

    #[serde(default)]
    pub emotional_tone: EmotionalTone,

    #[serde(default)]
    pub cultural_notes: Vec<String>,

    /// Named entities that get dedicated name-signs, entity -> sign description.
    #[serde(default)]
    pub name_signs: BTreeMap<String, String>,

    /// Words to sign with extra emphasis.
    #[serde(default)]
    pub emphasis_words: BTreeSet<String>,

    /// Idioms replaced with visually-signable equivalents, original -> equivalent.
    #[serde(default)]
    pub visual_metaphors: BTreeMap<String, String>,
}

/// Final per-utterance output bundle returned to API callers and emitted as
/// a stream result event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Space-joined ISL gloss string.
    pub gloss: String,
    pub emotional_tone: EmotionalTone,
    /// Clip URL, or empty when no clip matched and the presentation layer
    /// should fall back to a generic animation.
    pub avatar_url: String,
    pub duration_seconds: f64,
    pub cultural_notes: Vec<String>,
    pub name_signs: BTreeMap<String, String>,
    pub emphasis_words: BTreeSet<String>,
}

/// Transcription collaborator output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language: String,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// "No speech detected" counts as a successful transcription.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub confidence: f64,
}

/// One subtitle cue in a batch-processing result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleCue {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub gloss: String,
    pub avatar_url: String,
    pub emotional_tone: EmotionalTone,
}

/// Result of processing a full recording: per-segment subtitles plus
/// per-language dubbed audio paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaResult {
    pub full_transcript: String,
    pub language: String,
    pub subtitles: Vec<SubtitleCue>,
    /// Language tag -> written audio file path. Languages whose synthesis
    /// failed are absent.
    pub dubbed_audio: BTreeMap<String, String>,
    pub processing_time_ms: u64,
    pub total_segments: usize,
}
