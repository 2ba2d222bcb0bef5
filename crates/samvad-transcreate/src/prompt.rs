//! Transcreation prompt construction.

use samvad_core::language;

/// Build the adaptation prompt for one utterance. The model is asked for a
/// strict JSON object matching `TranscreationResult`.
pub fn build_prompt(text: &str, source_language: &str) -> String {
    let lang_name = language::find(source_language)
        .map(|info| info.name)
        .unwrap_or("Hindi");

    format!(
        r#"You are an expert in Indian Sign Language (ISL) and Indian cultural adaptation.

INPUT TEXT (Source: {lang_name}): {text}

TASK: Transcreate the above text for deaf Indian audiences who use ISL as their primary language.

REQUIREMENTS:
1. Preserve the emotional tone and intent; do NOT do literal word-for-word translation
2. Adapt idioms and metaphors to visual equivalents (e.g., "raining cats and dogs" -> "heavy rain")
3. Identify culturally significant references (politicians, festivals, places) and provide their ISL name-signs
4. Flag the emotional tone
5. Identify words that need emphasis in signing

OUTPUT: Respond ONLY with a valid JSON object (no markdown, no backticks):
{{
  "transcreated_text": "simplified text suitable for ISL conversion",
  "emotional_tone": "neutral|happy|sad|angry|urgent|sarcastic|excited",
  "cultural_notes": ["list of cultural adaptations made"],
  "name_signs": {{"entity": "ISL description"}},
  "emphasis_words": ["words needing emphasis"],
  "visual_metaphors": {{"original": "visual equivalent"}}
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_the_source_language() {
        let prompt = build_prompt("vanakkam", "ta-IN");
        assert!(prompt.contains("Source: Tamil"));
        assert!(prompt.contains("vanakkam"));
    }

    #[test]
    fn test_unknown_language_defaults_to_hindi() {
        let prompt = build_prompt("hello", "fr-FR");
        assert!(prompt.contains("Source: Hindi"));
    }

    #[test]
    fn test_prompt_requests_strict_json() {
        let prompt = build_prompt("hello", "hi-IN");
        assert!(prompt.contains(r#""transcreated_text""#));
        assert!(prompt.contains("no markdown, no backticks"));
    }
}
