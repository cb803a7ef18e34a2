use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Handle to a provisioned hosting location.
///
/// Absence of a config (`Option::None`) means the pipeline runs without hosting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingConfig {
    pub id: String,
    /// Public base URL under which hosted files are served.
    pub base_url: String,
    pub created_at: DateTime<Utc>,
}

/// Result of one hosting upload attempt.
///
/// A missing `url` means the upload did not happen and the caller falls back
/// to the original image reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedAsset {
    pub url: Option<String>,
    pub key: Option<String>,
}

impl HostedAsset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn hosted(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            key: Some(key.into()),
        }
    }

    pub fn is_hosted(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}
