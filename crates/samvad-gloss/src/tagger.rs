//! Linguistic analysis behind the tagger-assisted convert path.
//!
//! A [`Tagger`] stands in for a dependency parser: it labels each word with
//! a part of speech and whether it functions as a temporal modifier. The
//! converter only consults the labels; swapping in a model-backed tagger
//! does not change any call site.

/// Part-of-speech classes the converter cares about. Only the
/// grammatical-function classes influence elision; everything else is
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosTag {
    Determiner,
    Auxiliary,
    Conjunction,
    Particle,
    Pronoun,
    Numeral,
    Adverb,
    Other,
}

/// One analyzed word.
#[derive(Debug, Clone)]
pub struct TaggedWord {
    /// Surface form as written.
    pub text: String,
    /// Lower-cased form used for dictionary lookup.
    pub norm: String,
    pub pos: PosTag,
    /// Whether the word modifies the sentence temporally (adverbial use).
    pub temporal_modifier: bool,
}

/// Supplies per-word analyses, or `None` when no model is available; the
/// converter then falls back to its static rules.
pub trait Tagger: Send + Sync {
    fn analyze(&self, text: &str) -> Option<Vec<TaggedWord>>;
}

const DETERMINERS: &[&str] = &["a", "an", "the", "this", "that", "these", "those"];

const AUXILIARIES: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "am", "being", "do", "does", "did", "will",
    "would", "could", "should", "can", "shall", "may", "might", "must",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "because", "although", "though", "while", "if", "unless",
    "since", "until", "whereas",
];

const PARTICLES: &[&str] = &["to"];

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "you", "your", "he", "she", "it", "they", "we", "us", "them", "his",
    "her", "their", "our",
];

/// Closed-class word-list tagger. Always available; precision is bounded by
/// its lists, which is acceptable for the elision decisions it feeds.
pub struct RuleTagger {
    lexicon: crate::lexicon::Lexicon,
}

impl RuleTagger {
    pub fn new() -> Self {
        Self {
            lexicon: crate::lexicon::Lexicon::new(),
        }
    }

    fn tag_word(norm: &str) -> PosTag {
        if DETERMINERS.contains(&norm) {
            PosTag::Determiner
        } else if AUXILIARIES.contains(&norm) {
            PosTag::Auxiliary
        } else if CONJUNCTIONS.contains(&norm) {
            PosTag::Conjunction
        } else if PARTICLES.contains(&norm) {
            PosTag::Particle
        } else if PRONOUNS.contains(&norm) {
            PosTag::Pronoun
        } else if !norm.is_empty() && norm.chars().all(|c| c.is_ascii_digit()) {
            PosTag::Numeral
        } else if norm.len() > 2 && norm.ends_with("ly") {
            PosTag::Adverb
        } else {
            PosTag::Other
        }
    }
}

impl Default for RuleTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Tagger for RuleTagger {
    fn analyze(&self, text: &str) -> Option<Vec<TaggedWord>> {
        let words = text
            .split_whitespace()
            .map(|surface| {
                let norm = surface.to_lowercase();
                let stripped = crate::convert::strip_nonword(&norm);
                // Word lists cannot see dependency structure; treat every
                // time-word occurrence as adverbial.
                TaggedWord {
                    text: surface.to_string(),
                    pos: Self::tag_word(&stripped),
                    temporal_modifier: self.lexicon.is_time_word(&stripped),
                    norm,
                }
            })
            .collect();
        Some(words)
    }
}
