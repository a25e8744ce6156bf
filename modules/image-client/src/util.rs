use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

use crate::error::{ImageError, Result};

/// Longest error body kept in `ImageError::Api`.
const MAX_ERROR_BODY: usize = 500;

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Decode a base64 image payload, tolerating a `data:image/...;base64,` prefix.
pub fn decode_image(encoded: &str) -> Result<Bytes> {
    let payload = match encoded.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => encoded,
    };
    let raw = STANDARD.decode(payload.trim())?;
    if raw.is_empty() {
        return Err(ImageError::EmptyResponse);
    }
    Ok(Bytes::from(raw))
}

/// Turn a non-2xx response into `ImageError::Api`.
pub(crate) async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ImageError::Api {
        status: status.as_u16(),
        message: truncate_to_char_boundary(&body, MAX_ERROR_BODY).to_string(),
    })
}
