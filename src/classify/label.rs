use serde_json::Value;

const TEXT_PART_TYPES: [&str; 2] = ["text", "output_text"];

/// Shape of `message.content` in a chat completion reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplyContent<'a> {
    Text(&'a str),
    Parts(&'a [Value]),
    /// Missing, null, or any non-string non-list value.
    Other,
}

impl<'a> ReplyContent<'a> {
    pub fn of(message: &'a Value) -> Self {
        match message.get("content") {
            Some(Value::String(text)) => Self::Text(text),
            Some(Value::Array(parts)) => Self::Parts(parts),
            _ => Self::Other,
        }
    }
}

/// Best-effort label from a raw `{choices: [{message: {content}}]}` body.
///
/// Never fails: a body that does not match any rule yields `None`.
pub fn extract_label(reply: &Value) -> Option<String> {
    let first = reply.get("choices")?.as_array()?.first()?;
    let choice = first.as_object()?;

    let message = match choice.get("message") {
        Some(message) if !is_empty_value(message) => message,
        _ => first,
    };

    match ReplyContent::of(message) {
        ReplyContent::Text(text) => Some(text.trim().trim_matches('"').to_string()),
        ReplyContent::Parts(parts) => first_text_part(parts),
        ReplyContent::Other => Some(render(message)),
    }
}

// null, false, zero and empty strings, lists or objects do not count as a message.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

// Strings are used verbatim, anything else as compact JSON.
fn render(message: &Value) -> String {
    match message {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// First part typed "text" or "output_text" wins. A part that is not an
// object ends the scan.
fn first_text_part(parts: &[Value]) -> Option<String> {
    for part in parts {
        let part = part.as_object()?;
        let is_text = part
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|kind| TEXT_PART_TYPES.contains(&kind));
        if is_text {
            return part.get("text").and_then(Value::as_str).map(str::to_string);
        }
    }
    None
}
