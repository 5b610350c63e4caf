use super::Script;
use crate::{Error, Result};
use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};

/// A structured verdict on one handwritten glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingResult {
    pub script: Script,
    pub correct: bool,
    pub detected_glyph: Option<String>,
    pub expected_glyph: Option<String>,
    pub similarity: Option<Value>,
    pub reason: Option<String>,
    pub reading: Option<String>,
    pub romaji: Option<String>,
}

impl GradingResult {
    /// Parses the model's reply. The reply must be a strict JSON object with
    /// a boolean `correct`; anything else is rejected rather than guessed at.
    pub fn parse(script: Script, raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw.trim())
            .map_err(|e| Error::malformed_output(format!("reply is not JSON: {}", e)))?;

        let Value::Object(fields) = value else {
            return Err(Error::malformed_output("reply is not a JSON object"));
        };

        let correct = fields
            .get("correct")
            .and_then(Value::as_bool)
            .ok_or_else(|| Error::malformed_output("missing boolean 'correct'"))?;

        Ok(Self {
            script,
            correct,
            detected_glyph: string_field(&fields, &script.detected_field())?,
            expected_glyph: string_field(&fields, &script.expected_field())?,
            similarity: fields.get("similarity").filter(|v| !v.is_null()).cloned(),
            reason: string_field(&fields, "reason")?,
            reading: string_field(&fields, "reading")?,
            romaji: string_field(&fields, "romaji")?,
        })
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::malformed_output(format!(
            "field '{}' should be a string, got {}",
            key, other
        ))),
    }
}

impl Serialize for GradingResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("correct", &self.correct)?;
        map.serialize_entry(&self.script.detected_field(), &self.detected_glyph)?;
        map.serialize_entry(&self.script.expected_field(), &self.expected_glyph)?;
        map.serialize_entry("similarity", &self.similarity)?;
        map.serialize_entry("reason", &self.reason)?;
        if let Some(reading) = &self.reading {
            map.serialize_entry("reading", reading)?;
        }
        if let Some(romaji) = &self.romaji {
            map.serialize_entry("romaji", romaji)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_parse_kanji_reply() {
        let raw = r#"
            {"correct": true, "kanji_correct": "水", "kanji_detected": "水", "reason": "close match"}
        "#;
        let result = GradingResult::parse(Script::Kanji, raw).unwrap();

        assert!(result.correct);
        assert_eq!(result.detected_glyph.as_deref(), Some("水"));
        assert_eq!(result.expected_glyph.as_deref(), Some("水"));
        assert_eq!(result.reason.as_deref(), Some("close match"));
        assert_eq!(result.similarity, None);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "correct": true,
                "kanji_correct": "水",
                "kanji_detected": "水",
                "similarity": null,
                "reason": "close match"
            })
        );
    }

    #[test]
    fn test_optional_fields_pass_through() {
        let raw = json!({
            "correct": false,
            "hiragana_correct": "みず",
            "hiragana_detected": "みす",
            "similarity": 0.8,
            "reading": "みず",
            "romaji": "mizu",
            "reason": "missing dakuten",
            "confidence": "ignored"
        })
        .to_string();
        let result = GradingResult::parse(Script::Hiragana, &raw).unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "correct": false,
                "hiragana_correct": "みず",
                "hiragana_detected": "みす",
                "similarity": 0.8,
                "reading": "みず",
                "romaji": "mizu",
                "reason": "missing dakuten"
            })
        );
    }

    #[test]
    fn test_fields_of_other_scripts_are_not_read() {
        let raw = r#"{"correct": true, "kanji_detected": "火"}"#;
        let result = GradingResult::parse(Script::Katakana, raw).unwrap();

        assert_eq!(result.detected_glyph, None);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["katakana_detected"], Value::Null);
        assert!(value.get("kanji_detected").is_none());
    }

    #[rstest]
    #[case("Looks correct to me!")]
    #[case("```json\n{\"correct\": true}\n```")]
    #[case("")]
    #[case("[true]")]
    #[case(r#"{"kanji_detected": "水"}"#)]
    #[case(r#"{"correct": "yes"}"#)]
    #[case(r#"{"correct": true, "reason": 42}"#)]
    fn test_malformed_replies_are_rejected(#[case] raw: &str) {
        let err = GradingResult::parse(Script::Kanji, raw).unwrap_err();
        assert!(matches!(err, Error::MalformedOutput(_)), "got {:?}", err);
    }
}
