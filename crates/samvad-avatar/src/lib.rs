//! Maps ISL gloss sequences to pre-recorded sign clips.
//!
//! The clip directory is scanned once at startup into an in-memory index
//! keyed by upper-cased file stem. Resolution prefers the most specific
//! asset: a whole-phrase clip first, then the first token with an
//! individual clip, then nothing. The presentation layer falls back to a
//! generic animation for the empty reference.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use samvad_gloss::GlossSequence;

/// A resolvable clip URL, or the empty "no match" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvatarReference(String);

impl AvatarReference {
    pub fn none() -> Self {
        Self(String::new())
    }

    pub fn url(&self) -> &str {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_url(self) -> String {
        self.0
    }
}

/// Read-only clip lookup built from a directory scan.
#[derive(Debug)]
pub struct ClipIndex {
    clips_dir: PathBuf,
    public_prefix: String,
    index: HashMap<String, String>,
}

impl ClipIndex {
    /// Scan `clips_dir` for `.mp4` clips. A missing or unreadable directory
    /// yields an empty index rather than an error.
    pub fn build(clips_dir: impl Into<PathBuf>, public_prefix: &str) -> Self {
        let mut this = Self {
            clips_dir: clips_dir.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            index: HashMap::new(),
        };
        this.rescan();
        this
    }

    /// Re-read the clip directory. Refresh is explicit only; nothing watches
    /// the directory for changes.
    pub fn rescan(&mut self) {
        let mut index = HashMap::new();

        let entries = match std::fs::read_dir(&self.clips_dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %self.clips_dir.display(), %err, "clip directory not readable");
                self.index = index;
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "mp4"))
            .collect();
        paths.sort();

        for path in paths {
            let (Some(stem), Some(name)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.file_name().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            index.insert(
                stem.to_uppercase(),
                format!("{}/{}", self.public_prefix, name),
            );
        }

        debug!(dir = %self.clips_dir.display(), clips = index.len(), "clip index built");
        self.index = index;
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clips_dir(&self) -> &Path {
        &self.clips_dir
    }

    /// Resolve a gloss sequence to a clip. First match wins:
    /// 1. the full sequence joined by `_` (pre-recorded phrase clips),
    /// 2. the first token with an individual clip, emphasis markers stripped,
    /// 3. the empty reference.
    pub fn resolve(&self, gloss: &GlossSequence) -> AvatarReference {
        let words: Vec<&str> = gloss.words().collect();

        let phrase_key = words.join("_");
        if let Some(url) = self.index.get(&phrase_key) {
            return AvatarReference(url.clone());
        }

        for word in &words {
            let clean = word.replace(['?', '!', '+'], "");
            if let Some(url) = self.index.get(&clean) {
                return AvatarReference(url.clone());
            }
        }

        AvatarReference::none()
    }
}
