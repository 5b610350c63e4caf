use async_trait::async_trait;
use glyph_judge::{
    Error, Result,
    llm::{ChatMessage, VisionClient},
};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Mock vision client for testing
#[derive(Debug, Default)]
pub struct MockVisionClient {
    pub text_reply: Option<String>,
    pub raw_reply: Option<Value>,
    pub upstream_error: Option<(u16, String)>,
    pub requests: Arc<Mutex<Vec<ChatMessage>>>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, reply: impl Into<String>) -> Self {
        self.text_reply = Some(reply.into());
        self
    }

    pub fn with_raw(mut self, reply: Value) -> Self {
        self.raw_reply = Some(reply);
        self
    }

    pub fn with_upstream_error(mut self, status: u16, body: impl Into<String>) -> Self {
        self.upstream_error = Some((status, body.into()));
        self
    }

    pub fn get_requests(&self) -> Vec<ChatMessage> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, message: ChatMessage) -> Result<()> {
        self.requests.lock().unwrap().push(message);
        match &self.upstream_error {
            Some((status, body)) => Err(Error::Upstream {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VisionClient for MockVisionClient {
    async fn complete_text(&self, message: ChatMessage) -> Result<String> {
        self.record(message)?;
        self.text_reply
            .clone()
            .ok_or_else(|| Error::internal("No mock text reply configured"))
    }

    async fn complete_raw(&self, message: ChatMessage) -> Result<Value> {
        self.record(message)?;
        self.raw_reply
            .clone()
            .ok_or_else(|| Error::internal("No mock raw reply configured"))
    }
}
