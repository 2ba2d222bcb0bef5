//! Sign-to-text assembly for the reverse direction.
//!
//! Gesture classification happens upstream; this takes the recognized sign
//! names and produces a speakable sentence.

/// Sign name -> natural phrase. Signs the map does not cover pass through
/// lower-cased.
static PHRASE_MAP: &[(&str, &str)] = &[
    ("HELLO", "Hello"),
    ("HOW", "How"),
    ("YOU", "you"),
    ("I", "I"),
    ("GOOD", "good"),
    ("BAD", "bad"),
    ("THANK-YOU", "Thank you"),
    ("PLEASE", "Please"),
    ("HELP", "Help"),
    ("WATER", "I need water"),
    ("FOOD", "I want food"),
    ("HOME", "I want to go home"),
    ("SCHOOL", "school"),
    ("WORK", "I'm going to work"),
    ("HAPPY", "I am happy"),
    ("SAD", "I am sad"),
    ("YES", "Yes"),
    ("NO", "No"),
];

/// Assemble natural text from a sequence of recognized ISL sign names.
pub fn signs_to_text(signs: &[&str]) -> String {
    let phrases: Vec<String> = signs
        .iter()
        .map(|sign| {
            PHRASE_MAP
                .iter()
                .find(|(name, _)| name == sign)
                .map(|(_, phrase)| (*phrase).to_string())
                .unwrap_or_else(|| sign.to_lowercase())
        })
        .collect();
    phrases.join(" ")
}
