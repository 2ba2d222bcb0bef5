//! Speech transcription and synthesis over HTTP.

pub mod stt;
pub mod tts;

pub use stt::{HttpTranscriber, Transcriber};
pub use tts::{HttpSynthesizer, Synthesizer, synthesize_all};
