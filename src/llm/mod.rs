pub mod client;
pub mod media;
pub mod types;

pub use client::{OpenAiVisionClient, TEMPERATURE, VisionClient};
pub use types::*;
