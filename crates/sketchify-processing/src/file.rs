//! Candidate files: metadata known up front, content read lazily.
//!
//! The declared size and MIME type are available without touching the
//! content, so a file can be rejected before a single byte is read.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

/// Source of a candidate file's bytes.
#[async_trait]
pub trait FileContents: Send + Sync {
    async fn read_all(&self) -> std::io::Result<Vec<u8>>;
}

/// Content already held in memory.
pub struct InMemoryContents(Bytes);

impl InMemoryContents {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }
}

#[async_trait]
impl FileContents for InMemoryContents {
    async fn read_all(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.0.to_vec())
    }
}

/// Content read from the filesystem on demand.
pub struct PathContents(PathBuf);

impl PathContents {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

#[async_trait]
impl FileContents for PathContents {
    async fn read_all(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.0).await
    }
}

/// A file offered for upload via pick or drop.
#[derive(Clone)]
pub struct CandidateFile {
    pub name: String,
    /// Declared MIME type; empty when unknown.
    pub content_type: String,
    /// Declared size in bytes.
    pub size: u64,
    contents: Arc<dyn FileContents>,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
        contents: Arc<dyn FileContents>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size,
            contents,
        }
    }

    /// In-memory file whose declared size is the length of `data`.
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        let size = data.len() as u64;
        Self::new(name, content_type, size, Arc::new(InMemoryContents(data)))
    }

    /// File on disk; size comes from metadata and the MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(
            name,
            content_type_for_path(path),
            metadata.len(),
            Arc::new(PathContents::new(path)),
        ))
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        self.contents.read_all().await
    }
}

impl Debug for CandidateFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CandidateFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish()
    }
}

/// MIME type implied by a file's extension; empty when unknown.
pub fn content_type_for_path(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "",
    }
    .to_string()
}
