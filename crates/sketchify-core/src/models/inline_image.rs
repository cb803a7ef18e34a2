//! Inline image references (`data:` URLs).
//!
//! An inline image is a self-contained string carrying the MIME type and the
//! base64 payload, usable directly as a display source without a fetch.

use std::fmt::{Display, Formatter, Result as FmtResult};

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::constants::{FALLBACK_CONTENT_TYPE, INLINE_IMAGE_PREFIX};

const BASE64_MARKER: &str = ";base64";

#[derive(Debug, thiserror::Error)]
pub enum InlineImageError {
    #[error("Not an inline image reference")]
    NotInline,

    #[error("Malformed inline image reference: {0}")]
    Malformed(String),

    #[error("Unsupported inline image encoding (only base64 is supported)")]
    UnsupportedEncoding,

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineImage(String);

impl InlineImage {
    /// Encode raw bytes as `data:{content_type};base64,{payload}`.
    pub fn from_bytes(content_type: &str, data: &[u8]) -> Self {
        let content_type = if content_type.trim().is_empty() {
            FALLBACK_CONTENT_TYPE
        } else {
            content_type.trim()
        };
        let payload = base64::engine::general_purpose::STANDARD.encode(data);
        InlineImage(format!(
            "{}{}{},{}",
            INLINE_IMAGE_PREFIX, content_type, BASE64_MARKER, payload
        ))
    }

    /// Parse an existing reference, checking its header shape.
    pub fn parse(value: &str) -> Result<Self, InlineImageError> {
        let (header, _) = split(value)?;
        if !header.ends_with(BASE64_MARKER) {
            return Err(InlineImageError::UnsupportedEncoding);
        }
        Ok(InlineImage(value.to_string()))
    }

    /// Whether `value` is an inline reference rather than a remote URL.
    pub fn is_inline(value: &str) -> bool {
        value.starts_with(INLINE_IMAGE_PREFIX)
    }

    /// MIME type declared in the header.
    pub fn content_type(&self) -> &str {
        match split(&self.0) {
            Ok((header, _)) => {
                let mime = header.trim_end_matches(BASE64_MARKER);
                mime.split(';').next().unwrap_or(mime)
            }
            Err(_) => FALLBACK_CONTENT_TYPE,
        }
    }

    /// Decode the payload back into bytes.
    pub fn decode(&self) -> Result<Vec<u8>, InlineImageError> {
        let (_, payload) = split(&self.0)?;
        Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for InlineImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<InlineImage> for String {
    fn from(image: InlineImage) -> Self {
        image.0
    }
}

impl AsRef<str> for InlineImage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Split into (header without the `data:` prefix, payload).
fn split(value: &str) -> Result<(&str, &str), InlineImageError> {
    let rest = value
        .strip_prefix(INLINE_IMAGE_PREFIX)
        .ok_or(InlineImageError::NotInline)?;
    rest.split_once(',')
        .ok_or_else(|| InlineImageError::Malformed("missing ',' separator".to_string()))
}
