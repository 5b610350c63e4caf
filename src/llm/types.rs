use super::media;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
    ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
    ImageUrl as OpenAiImageUrl,
};
use serde::{Deserialize, Serialize};

/// One typed fragment of a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

/// Wire body of an OpenAI-compatible chat completion call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Where the image for a request comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageReference {
    Bytes {
        data: Vec<u8>,
        filename: Option<String>,
    },
    Url(String),
}

impl ImageReference {
    pub fn bytes(data: Vec<u8>) -> Self {
        Self::Bytes {
            data,
            filename: None,
        }
    }

    /// The URL to place in the image part: a data URL for raw bytes, the
    /// reference itself otherwise.
    pub fn to_url(&self) -> String {
        match self {
            Self::Bytes { data, filename } => {
                media::image_bytes_to_data_url(data, filename.as_deref())
            }
            Self::Url(url) => url.clone(),
        }
    }
}

impl ChatMessage {
    /// Single user message with the image part first and the instruction second.
    pub fn user_with_image(prompt: impl Into<String>, image: &ImageReference) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.to_url(),
                    },
                },
                ContentPart::Text {
                    text: prompt.into(),
                },
            ],
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|part| match part {
            ContentPart::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn image_url(&self) -> Option<&str> {
        self.content.iter().find_map(|part| match part {
            ContentPart::ImageUrl { image_url } => Some(image_url.url.as_str()),
            _ => None,
        })
    }

    pub fn to_openai_message(&self) -> Result<ChatCompletionRequestMessage, crate::Error> {
        match self.role.as_str() {
            "user" => {
                let parts: Vec<ChatCompletionRequestUserMessageContentPart> = self
                    .content
                    .iter()
                    .map(|part| match part {
                        ContentPart::Text { text } => {
                            ChatCompletionRequestUserMessageContentPart::Text(
                                ChatCompletionRequestMessageContentPartText { text: text.clone() },
                            )
                        }
                        ContentPart::ImageUrl { image_url } => {
                            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                                ChatCompletionRequestMessageContentPartImage {
                                    image_url: OpenAiImageUrl {
                                        url: image_url.url.clone(),
                                        detail: None,
                                    },
                                },
                            )
                        }
                    })
                    .collect();

                let msg = ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(parts))
                    .build()
                    .map_err(|e| {
                        crate::Error::internal(format!("Failed to build user message: {}", e))
                    })?;
                Ok(msg.into())
            }
            _ => Err(crate::Error::internal(format!(
                "Unknown message role: {}",
                self.role
            ))),
        }
    }
}
