//! Resolve an image reference (inline or remote) into bytes for hosting.

use reqwest::header::CONTENT_TYPE;
use sketchify_core::InlineImage;

use crate::traits::{StorageError, StorageResult};

/// Load the bytes behind `url` together with their MIME type.
///
/// Inline references are decoded in place; `http(s)` URLs are fetched.
pub async fn load_image_bytes(
    http: &reqwest::Client,
    url: &str,
) -> StorageResult<(Vec<u8>, String)> {
    if InlineImage::is_inline(url) {
        let image =
            InlineImage::parse(url).map_err(|e| StorageError::InvalidSource(e.to_string()))?;
        let data = image
            .decode()
            .map_err(|e| StorageError::InvalidSource(e.to_string()))?;
        return Ok((data, image.content_type().to_string()));
    }

    let parsed = reqwest::Url::parse(url)
        .map_err(|e| StorageError::InvalidSource(format!("Invalid URL format: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(StorageError::InvalidSource(format!(
                "Unsupported URL scheme: {}",
                scheme
            )))
        }
    }

    let response = http
        .get(parsed)
        .send()
        .await
        .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(StorageError::DownloadFailed(format!(
            "{} responded with status {}",
            url, status
        )));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_lowercase())
        .unwrap_or_default();

    let data = response
        .bytes()
        .await
        .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

    Ok((data.to_vec(), content_type))
}
