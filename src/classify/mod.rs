mod label;

pub use label::{ReplyContent, extract_label};

use crate::{
    Error, Result,
    llm::{ChatMessage, ImageReference, VisionClient, media},
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub const CLASSIFY_PROMPT: &str =
    "Classify this image in ONE short label (single word or short phrase). Return only the label.";

/// The three ways a caller can hand over an image for classification.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationRequest {
    Upload {
        bytes: Vec<u8>,
        filename: Option<String>,
    },
    Base64(String),
    Url(String),
}

impl ClassificationRequest {
    pub fn into_image_reference(self) -> Result<ImageReference> {
        match self {
            Self::Upload { bytes, filename } => {
                if bytes.is_empty() {
                    return Err(Error::invalid_input("Uploaded file is empty"));
                }
                Ok(ImageReference::Bytes {
                    data: bytes,
                    filename,
                })
            }
            Self::Base64(encoded) => Ok(ImageReference::bytes(media::decode_base64_image(
                &encoded,
            )?)),
            Self::Url(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(Error::invalid_input("image_url must not be empty"));
                }
                Ok(ImageReference::Url(url.to_string()))
            }
        }
    }
}

/// Raw provider body plus the label extracted from it, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub vllm_raw: Value,
    pub label: Option<String>,
}

pub async fn classify(
    client: &dyn VisionClient,
    request: ClassificationRequest,
) -> Result<Classification> {
    let image = request.into_image_reference()?;
    let message = ChatMessage::user_with_image(CLASSIFY_PROMPT, &image);

    let vllm_raw = client.complete_raw(message).await?;
    let label = extract_label(&vllm_raw);
    if label.is_none() {
        debug!("No label found in provider reply");
    }

    Ok(Classification { vllm_raw, label })
}
