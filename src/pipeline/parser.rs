//! Defensive parsing of model responses.
//!
//! The classification and extraction capabilities are untrusted text
//! producers: the JSON body routinely arrives wrapped in Markdown code
//! fences or conversational noise. Both stages share this one routine so
//! they stay equally hardened.

use serde::de::DeserializeOwned;

/// Strip Markdown code fences and surrounding noise, leaving the JSON body.
pub fn strip_fences(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        let body = &trimmed[start + 7..];
        let body = match body.find("```") {
            Some(end) => &body[..end],
            None => body,
        };
        return body.trim();
    }

    if let Some(start) = trimmed.find("```") {
        let body = &trimmed[start + 3..];
        let body = match body.find("```") {
            Some(end) => &body[..end],
            None => body,
        };
        return body.trim();
    }

    trimmed
}

/// Strip wrapping delimiters, then parse the body as `T`.
///
/// The error is a plain description; each stage wraps it in its own
/// parse-failure variant.
pub fn parse_model_json<T: DeserializeOwned>(response: &str) -> Result<T, String> {
    let body = strip_fences(response);
    if body.is_empty() {
        return Err("empty response".to_string());
    }
    serde_json::from_str(body).map_err(|e| e.to_string())
}
