//! The closed ISL gloss dictionary.
//!
//! An empty gloss marks a word ISL elides entirely (articles, copulas,
//! auxiliaries, most prepositions, intensifiers).

use std::collections::{HashMap, HashSet};

/// English word -> ISL gloss. Built into a [`Lexicon`] at startup.
static GLOSS_ENTRIES: &[(&str, &str)] = &[
    // Greetings
    ("hello", "HELLO"),
    ("hi", "HELLO"),
    ("goodbye", "BYE"),
    ("bye", "BYE"),
    ("thank", "THANK-YOU"),
    ("thanks", "THANK-YOU"),
    ("please", "PLEASE"),
    ("sorry", "SORRY"),
    ("excuse", "SORRY"),
    // Common verbs
    ("go", "GO"),
    ("going", "GO"),
    ("went", "GO"),
    ("come", "COME"),
    ("coming", "COME"),
    ("came", "COME"),
    ("eat", "EAT"),
    ("eating", "EAT"),
    ("ate", "EAT"),
    ("drink", "DRINK"),
    ("drinking", "DRINK"),
    ("see", "SEE"),
    ("seeing", "SEE"),
    ("saw", "SEE"),
    ("know", "KNOW"),
    ("knowing", "KNOW"),
    ("knew", "KNOW"),
    ("want", "WANT"),
    ("wanting", "WANT"),
    ("wanted", "WANT"),
    ("help", "HELP"),
    ("helping", "HELP"),
    ("need", "NEED"),
    ("needs", "NEED"),
    ("have", "HAVE"),
    ("has", "HAVE"),
    ("say", "SAY"),
    ("said", "SAY"),
    ("think", "THINK"),
    ("thought", "THINK"),
    ("feel", "FEEL"),
    ("felt", "FEEL"),
    ("work", "WORK"),
    ("working", "WORK"),
    ("play", "PLAY"),
    ("playing", "PLAY"),
    ("learn", "LEARN"),
    ("learning", "LEARN"),
    ("teach", "TEACH"),
    ("teaching", "TEACH"),
    ("buy", "BUY"),
    ("buying", "BUY"),
    ("bought", "BUY"),
    ("give", "GIVE"),
    ("giving", "GIVE"),
    ("gave", "GIVE"),
    ("take", "TAKE"),
    ("taking", "TAKE"),
    ("took", "TAKE"),
    ("make", "MAKE"),
    ("making", "MAKE"),
    ("made", "MAKE"),
    ("like", "LIKE"),
    ("love", "LOVE"),
    ("wait", "WAIT"),
    ("waiting", "WAIT"),
    ("sit", "SIT"),
    ("sitting", "SIT"),
    ("stand", "STAND"),
    ("standing", "STAND"),
    ("run", "RUN"),
    ("running", "RUN"),
    ("walk", "WALK"),
    ("walking", "WALK"),
    ("stop", "STOP"),
    // Common nouns
    ("india", "INDIA"),
    ("indian", "INDIA"),
    ("government", "GOVERNMENT"),
    ("news", "NEWS"),
    ("cricket", "CRICKET"),
    ("school", "SCHOOL"),
    ("hospital", "HOSPITAL"),
    ("doctor", "DOCTOR"),
    ("home", "HOME"),
    ("house", "HOME"),
    ("water", "WATER"),
    ("food", "FOOD"),
    ("money", "MONEY"),
    ("market", "MARKET"),
    ("vegetables", "VEGETABLES"),
    ("station", "STATION"),
    ("bus", "BUS"),
    ("train", "TRAIN"),
    ("family", "FAMILY"),
    ("friend", "FRIEND"),
    ("child", "CHILD"),
    ("children", "CHILD"),
    ("mother", "MOTHER"),
    ("father", "FATHER"),
    ("brother", "BROTHER"),
    ("sister", "SISTER"),
    ("teacher", "TEACHER"),
    ("student", "STUDENT"),
    ("book", "BOOK"),
    ("rain", "RAIN"),
    ("hot", "HOT"),
    ("cold", "COLD"),
    ("good", "GOOD"),
    ("bad", "BAD"),
    ("big", "BIG"),
    ("small", "SMALL"),
    ("happy", "HAPPY"),
    ("sad", "SAD"),
    // Time words
    ("today", "TODAY"),
    ("tomorrow", "TOMORROW"),
    ("yesterday", "YESTERDAY"),
    ("now", "NOW"),
    ("later", "LATER"),
    ("morning", "MORNING"),
    ("evening", "EVENING"),
    ("night", "NIGHT"),
    // Numbers
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
    ("six", "6"),
    ("seven", "7"),
    ("eight", "8"),
    ("nine", "9"),
    ("ten", "10"),
    // Question words
    ("what", "WHAT?"),
    ("who", "WHO?"),
    ("where", "WHERE?"),
    ("when", "WHEN?"),
    ("why", "WHY?"),
    ("how", "HOW?"),
    // Pronouns
    ("i", "I"),
    ("me", "ME"),
    ("my", "MY"),
    ("you", "YOU"),
    ("your", "YOUR"),
    ("he", "HE"),
    ("she", "SHE"),
    ("they", "THEY"),
    ("we", "WE"),
    // Articles/aux verbs/conjunctions/prepositions ISL drops
    ("a", ""),
    ("an", ""),
    ("the", ""),
    ("and", ""),
    ("or", ""),
    ("but", ""),
    ("is", ""),
    ("are", ""),
    ("was", ""),
    ("were", ""),
    ("be", ""),
    ("been", ""),
    ("am", ""),
    ("being", ""),
    ("do", ""),
    ("does", ""),
    ("did", ""),
    ("will", ""),
    ("would", ""),
    ("could", ""),
    ("should", ""),
    ("can", ""),
    ("to", ""),
    ("of", ""),
    ("in", ""),
    ("on", ""),
    ("at", ""),
    ("for", ""),
    ("with", ""),
    ("from", ""),
    ("by", ""),
    ("about", ""),
    ("into", ""),
    ("very", ""),
    ("much", ""),
    ("so", ""),
    ("too", ""),
    ("also", ""),
    ("not", "NOT"),
    ("no", "NO"),
    ("yes", "YES"),
];

/// Time markers come first in ISL surface order.
static TIME_WORDS: &[&str] = &[
    "today",
    "tomorrow",
    "yesterday",
    "now",
    "later",
    "soon",
    "morning",
    "evening",
    "night",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "week",
    "month",
    "year",
    "already",
    "before",
    "after",
    "always",
    "never",
    "sometimes",
];

/// Lookup structure over the gloss dictionary and time-word set.
#[derive(Debug, Clone)]
pub struct Lexicon {
    glosses: HashMap<&'static str, &'static str>,
    time_words: HashSet<&'static str>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self {
            glosses: GLOSS_ENTRIES.iter().copied().collect(),
            time_words: TIME_WORDS.iter().copied().collect(),
        }
    }

    /// Gloss for a normalized word. `Some("")` means the word is elided.
    pub fn gloss(&self, word: &str) -> Option<&'static str> {
        self.glosses.get(word).copied()
    }

    pub fn is_time_word(&self, word: &str) -> bool {
        self.time_words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.glosses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glosses.is_empty()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}
