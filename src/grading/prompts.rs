use super::Script;

const LENIENCY_RULES: &str = "\
Judging rules:
- Ignore stroke thickness and line weight.
- Ignore imperfect proportions, slight rotation and uneven spacing.
- Messy handwriting is acceptable when the overall shape and structure match.
- Mark the answer incorrect only when the drawing is clearly a different character.";

pub(super) fn grading_prompt(script: Script, target_word: &str) -> String {
    match script {
        Script::Kanji => kanji_prompt(target_word),
        Script::Katakana | Script::Hiragana => kana_prompt(script, target_word),
    }
}

fn kanji_prompt(target_word: &str) -> String {
    format!(
        r#"You are a friendly and lenient Kanji handwriting judge.

Target English word: {target_word}

1. Convert the target word into its correct Kanji.
2. Compare it with the student's handwritten Kanji in the image.

{LENIENCY_RULES}

Respond ONLY with strict JSON, no text outside the object:
{{
  "correct": true or false,
  "kanji_correct": "THE_CORRECT_KANJI",
  "kanji_detected": "KANJI_DETECTED_FROM_IMAGE",
  "reading": "HIRAGANA_READING_OF_THE_CORRECT_KANJI",
  "romaji": "ROMAJI_READING_OF_THE_CORRECT_KANJI",
  "reason": "very short, friendly explanation"
}}"#
    )
}

fn kana_prompt(script: Script, target_word: &str) -> String {
    let name = script.display_name();
    let prefix = script.field_prefix();
    let placeholder = prefix.to_uppercase();
    format!(
        r#"You are a {name} handwriting judge.

The target word is: {target_word}

1. Convert the target word into its correct {name}.
2. Compare it with the student's handwritten {name} in the image.

{LENIENCY_RULES}

Respond ONLY with strict JSON, no text outside the object:
{{
  "correct": true or false,
  "{prefix}_correct": "CORRECT_{placeholder}",
  "{prefix}_detected": "{placeholder}_DETECTED_FROM_IMAGE",
  "reason": "brief explanation"
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_name_the_target_and_schema() {
        for script in [Script::Kanji, Script::Katakana, Script::Hiragana] {
            let prompt = grading_prompt(script, "water");
            let prefix = script.field_prefix();

            assert!(prompt.contains("water"));
            assert!(prompt.contains(&format!("\"{}_correct\"", prefix)));
            assert!(prompt.contains(&format!("\"{}_detected\"", prefix)));
            assert!(prompt.contains("strict JSON"));
        }
    }

    #[test]
    fn test_only_kanji_asks_for_pronunciation() {
        assert!(grading_prompt(Script::Kanji, "fire").contains("\"romaji\""));
        assert!(!grading_prompt(Script::Hiragana, "fire").contains("\"romaji\""));
        assert!(grading_prompt(Script::Katakana, "coffee").contains("Katakana"));
    }
}
