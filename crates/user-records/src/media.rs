//! Media uploads for user images.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::UserError;
use crate::types::Upload;

/// Stores an uploaded file and returns the URL it is reachable at.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, folder: &str, file: &Upload) -> Result<String, UserError>;
}

/// In-memory `MediaStore` handing out `memory://<folder>/<uuid>-<file name>` URLs.
#[derive(Default)]
pub struct MemoryMediaStore {
    /// url → bytes
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.blobs.lock().get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn upload(&self, folder: &str, file: &Upload) -> Result<String, UserError> {
        if file.file_name.is_empty() || file.file_name.contains('/') {
            return Err(UserError::Media(format!(
                "invalid file name {:?}",
                file.file_name
            )));
        }
        if file.bytes.is_empty() {
            return Err(UserError::Media("empty upload".into()));
        }

        let url = format!(
            "memory://{folder}/{}-{}",
            uuid::Uuid::new_v4(),
            file.file_name
        );
        self.blobs.lock().insert(url.clone(), file.bytes.clone());
        tracing::debug!(%url, size = file.bytes.len(), "stored upload");
        Ok(url)
    }
}
