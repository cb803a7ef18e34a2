//! Shared fixtures for pipeline integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use sketchify_core::{Config, InlineImage, LocalIdentity, StorageBackend};
use sketchify_services::{
    CompletionHandler, ImageValidator, IngestionSession, ProgressSettings,
};
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Temporary hosting and key-value roots.
pub struct TestStorage {
    pub temp_dir: TempDir,
    pub base_url: String,
}

impl TestStorage {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        Self {
            temp_dir,
            base_url: "http://localhost:8080/hosting".to_string(),
        }
    }

    pub fn hosting_path(&self) -> PathBuf {
        self.temp_dir.path().join("hosting")
    }

    pub fn kv_path(&self) -> PathBuf {
        self.temp_dir.path().join("kv")
    }

    /// Configuration pointing the local backends at the temp roots.
    pub fn config(&self) -> Config {
        Config {
            storage_backend: StorageBackend::Local,
            storage_path: self.hosting_path().to_string_lossy().to_string(),
            storage_base_url: self.base_url.clone(),
            kv_path: self.kv_path().to_string_lossy().to_string(),
            ..Config::default()
        }
    }
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed-in session whose completions are forwarded to a channel.
pub fn session_with_channel(
    identity: LocalIdentity,
) -> (IngestionSession, mpsc::UnboundedReceiver<InlineImage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler: CompletionHandler = Arc::new(move |image| {
        let _ = tx.send(image);
    });
    let session = IngestionSession::new(
        Arc::new(identity),
        ImageValidator::default(),
        ProgressSettings::default(),
        handler,
    );
    (session, rx)
}

/// PNG signature followed by filler, `len` bytes in total.
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(len, 0xAB);
    data
}
