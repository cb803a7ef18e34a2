//! Shared key generation for storage backends.
//!
//! Hosted images: `projects/{project_id}/{label}.{ext}`. Segments are sanitized
//! so keys never contain `..` or a leading `/`.

use crate::traits::{StorageError, StorageResult};

/// Storage key for a hosted project image.
pub fn hosted_image_key(project_id: &str, label: &str, content_type: &str) -> StorageResult<String> {
    let project = sanitize_segment(project_id);
    let label = sanitize_segment(label);
    if project.is_empty() || label.is_empty() {
        return Err(StorageError::InvalidKey(format!(
            "empty key segment (project_id={:?}, label={:?})",
            project_id, label
        )));
    }
    Ok(format!(
        "projects/{}/{}.{}",
        project,
        label,
        extension_for_content_type(content_type)
    ))
}

/// File name for a key-value entry, e.g. `project:abc` -> `project_abc.json`.
pub fn kv_file_name(key: &str) -> StorageResult<String> {
    let name = sanitize_segment(key);
    if name.is_empty() {
        return Err(StorageError::InvalidKey(format!("empty key: {:?}", key)));
    }
    Ok(format!("{}.json", name))
}

pub fn extension_for_content_type(content_type: &str) -> &'static str {
    match content_type.to_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Public URL for a key under a base URL.
pub fn public_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

fn sanitize_segment(segment: &str) -> String {
    segment
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_key_layout() {
        assert_eq!(
            hosted_image_key("1700000000", "source", "image/png").unwrap(),
            "projects/1700000000/source.png"
        );
        assert_eq!(
            hosted_image_key("p1", "rendered", "image/jpeg").unwrap(),
            "projects/p1/rendered.jpg"
        );
        assert_eq!(
            hosted_image_key("p1", "source", "application/octet-stream").unwrap(),
            "projects/p1/source.bin"
        );
    }

    #[test]
    fn traversal_is_neutralized() {
        let key = hosted_image_key("../../etc", "source", "image/png").unwrap();
        assert!(!key.contains(".."));
        assert!(key.starts_with("projects/"));
        assert!(hosted_image_key("", "source", "image/png").is_err());
    }

    #[test]
    fn kv_file_names() {
        assert_eq!(kv_file_name("project:abc").unwrap(), "project_abc.json");
        assert_eq!(kv_file_name("project:../x").unwrap(), "project____x.json");
        assert!(kv_file_name("   ").is_err());
    }

    #[test]
    fn public_url_joins_cleanly() {
        assert_eq!(
            public_url("http://localhost:8080/hosting/", "projects/p/source.png"),
            "http://localhost:8080/hosting/projects/p/source.png"
        );
    }
}
