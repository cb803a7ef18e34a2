//! Mock key-value store for testing

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sketchify_storage::{KvStore, StorageBackend, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Key-value double that can be told to reject every write.
#[derive(Default)]
pub struct MockKvStore {
    fail_writes: bool,
    values: Mutex<HashMap<String, JsonValue>>,
    write_attempts: Mutex<usize>,
}

impl MockKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn value(&self, key: &str) -> Option<JsonValue> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn write_attempts(&self) -> usize {
        *self.write_attempts.lock().unwrap()
    }
}

#[async_trait]
impl KvStore for MockKvStore {
    async fn set(&self, key: &str, value: JsonValue) -> StorageResult<()> {
        *self.write_attempts.lock().unwrap() += 1;
        if self.fail_writes {
            return Err(StorageError::WriteFailed("kv quota exceeded".to_string()));
        }
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<JsonValue>> {
        Ok(self.value(key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
