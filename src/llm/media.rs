//! Image bytes to data URLs and back.

use crate::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Picks a MIME type for image bytes: filename extension first, then the
/// content's magic bytes, then [`DEFAULT_MIME_TYPE`].
pub fn detect_mime_type(bytes: &[u8], filename: Option<&str>) -> &'static str {
    let from_name = filename
        .and_then(|name| mime_guess::from_path(name).first_raw())
        .filter(|mime| mime.starts_with("image/"));

    from_name
        .or_else(|| {
            image::guess_format(bytes)
                .ok()
                .map(|format| format.to_mime_type())
        })
        .unwrap_or(DEFAULT_MIME_TYPE)
}

pub fn image_bytes_to_data_url(bytes: &[u8], filename: Option<&str>) -> String {
    let mime = detect_mime_type(bytes, filename);
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Decodes a base64 image payload. A leading `data:<mime>;base64,` prefix and
/// embedded whitespace are tolerated.
pub fn decode_base64_image(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let payload = match trimmed.strip_prefix("data:") {
        Some(rest) => match rest.split_once(";base64,") {
            Some((_, payload)) => payload,
            None => return Err(Error::invalid_input("Data URL is not base64 encoded")),
        },
        None => trimmed,
    };

    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::invalid_input(format!("Invalid base64 payload: {}", e)))?;

    if bytes.is_empty() {
        return Err(Error::invalid_input("Image payload is empty"));
    }

    Ok(bytes)
}
