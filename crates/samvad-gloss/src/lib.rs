//! Text to Indian Sign Language gloss conversion.
//!
//! ISL uses Topic-Comment surface structure with time context fronted
//! (Time -> Topic -> Comment), not English subject-verb-object order. The
//! converter reorders tokens accordingly, maps them through a closed gloss
//! dictionary, and fingerspells what the dictionary does not cover.

mod convert;
mod lexicon;
mod reverse;
mod tagger;

pub use convert::{GlossConverter, GlossSequence, GlossToken};
pub use lexicon::Lexicon;
pub use reverse::signs_to_text;
pub use tagger::{PosTag, RuleTagger, TaggedWord, Tagger};
