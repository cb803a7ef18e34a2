use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::constants::PROJECT_KEY_PREFIX;

/// Project record.
///
/// A caller builds a draft after ingestion and rendering; the project persister
/// returns a new, finalized copy with hosted (or original) image references.
/// Fields the caller adds beyond the known ones are carried in `metadata` and
/// survive finalization untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Inline or remote reference to the uploaded image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
    /// Inline or remote reference to the rendered image. Serialized as `null`
    /// when absent so readers can tell "no render" from "unknown".
    #[serde(default)]
    pub rendered_image: Option<String>,
    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    // Derived path fields, dropped from finalized records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, JsonValue>,
}

impl DesignItem {
    /// Start a draft for the given project id and source image.
    pub fn draft(id: impl Into<String>, source_image: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            source_image: Some(source_image.into()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_rendered_image(mut self, rendered_image: impl Into<String>) -> Self {
        self.rendered_image = Some(rendered_image.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Project id, treating an empty string as missing.
    pub fn project_id(&self) -> Option<&str> {
        non_empty(self.id.as_deref())
    }

    /// Source image reference, treating an empty string as missing.
    pub fn source(&self) -> Option<&str> {
        non_empty(self.source_image.as_deref())
    }

    /// Rendered image reference, treating an empty string as missing.
    pub fn rendered(&self) -> Option<&str> {
        non_empty(self.rendered_image.as_deref())
    }

    /// Key-value store key for this project, if it has an id.
    pub fn storage_key(&self) -> Option<String> {
        self.project_id().map(project_key)
    }

    /// Copy of this record without the derived path fields.
    pub fn without_derived_paths(&self) -> Self {
        Self {
            source_path: None,
            rendered_path: None,
            public_path: None,
            ..self.clone()
        }
    }
}

/// Key-value store key for a project id: `project:{id}`.
pub fn project_key(project_id: &str) -> String {
    format!("{}{}", PROJECT_KEY_PREFIX, project_id)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_camel_case_with_null_render() {
        let item = DesignItem::draft("p1", "data:image/png;base64,AAAA").with_timestamp(42);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["id"], "p1");
        assert_eq!(value["sourceImage"], "data:image/png;base64,AAAA");
        assert_eq!(value["renderedImage"], JsonValue::Null);
        assert_eq!(value["timestamp"], 42);
        assert!(value.get("sourcePath").is_none());
    }

    #[test]
    fn caller_metadata_round_trips_through_flatten() {
        let raw = json!({
            "id": "p2",
            "sourceImage": "https://example.com/a.png",
            "renderedImage": null,
            "ownerId": "u-7",
            "isPublic": true
        });
        let item: DesignItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.metadata.get("ownerId"), Some(&json!("u-7")));
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let item = DesignItem {
            id: Some(String::new()),
            source_image: Some(String::new()),
            rendered_image: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(item.project_id(), None);
        assert_eq!(item.source(), None);
        assert_eq!(item.rendered(), None);
        assert_eq!(item.storage_key(), None);
    }

    #[test]
    fn derived_paths_are_dropped() {
        let mut item = DesignItem::draft("p3", "src");
        item.source_path = Some("projects/p3/source.png".to_string());
        item.rendered_path = Some("projects/p3/rendered.png".to_string());
        item.public_path = Some("/p3".to_string());

        let stripped = item.without_derived_paths();
        assert_eq!(stripped.source_path, None);
        assert_eq!(stripped.rendered_path, None);
        assert_eq!(stripped.public_path, None);
        assert_eq!(stripped.id.as_deref(), Some("p3"));
        assert_eq!(item.storage_key().as_deref(), Some("project:p3"));
    }
}
