mod judgment;
mod prompts;

pub use judgment::GradingResult;

use crate::{
    Error, Result,
    llm::{ChatMessage, ImageReference, VisionClient, media},
};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, warn};

/// The writing system a drawing is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Kanji,
    Katakana,
    Hiragana,
}

impl Script {
    /// Prefix of the script-specific response fields, e.g. `kanji_detected`.
    pub fn field_prefix(&self) -> &'static str {
        match self {
            Self::Kanji => "kanji",
            Self::Katakana => "katakana",
            Self::Hiragana => "hiragana",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Kanji => "Kanji",
            Self::Katakana => "Katakana",
            Self::Hiragana => "Hiragana",
        }
    }

    pub fn detected_field(&self) -> String {
        format!("{}_detected", self.field_prefix())
    }

    pub fn expected_field(&self) -> String {
        format!("{}_correct", self.field_prefix())
    }

    pub fn prompt(&self, target_word: &str) -> String {
        prompts::grading_prompt(*self, target_word)
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_prefix())
    }
}

/// Body of the `/grade-*` endpoints. Fields are optional at the serde level
/// so that a missing field is reported as a client error by [`validate`].
///
/// [`validate`]: GradingRequest::validate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradingRequest {
    #[serde(default)]
    pub target_word: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl GradingRequest {
    pub fn new(target_word: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            target_word: Some(target_word.into()),
            image: Some(image.into()),
        }
    }

    /// Returns the target word and the decoded image bytes.
    pub fn validate(&self) -> Result<(&str, Vec<u8>)> {
        let target_word = self
            .target_word
            .as_deref()
            .map(str::trim)
            .filter(|word| !word.is_empty());
        let image = self
            .image
            .as_deref()
            .filter(|image| !image.trim().is_empty());

        match (target_word, image) {
            (Some(word), Some(image)) => Ok((word, media::decode_base64_image(image)?)),
            _ => Err(Error::invalid_input("Missing word or image")),
        }
    }
}

pub async fn grade(
    client: &dyn VisionClient,
    script: Script,
    request: &GradingRequest,
) -> Result<GradingResult> {
    let (target_word, image) = request.validate()?;
    debug!(
        "Grading {} drawing for '{}' ({} bytes)",
        script,
        target_word,
        image.len()
    );

    let message =
        ChatMessage::user_with_image(script.prompt(target_word), &ImageReference::bytes(image));
    let raw = client.complete_text(message).await?;

    GradingResult::parse(script, &raw).inspect_err(|e| {
        warn!("Discarding {} judgment: {}", script, e);
    })
}
