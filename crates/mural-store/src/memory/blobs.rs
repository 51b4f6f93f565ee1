use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use url::Url;

use mural_shared::paths::BlobPath;

use super::{MemoryBackend, Operation, StoredBlob};
use crate::backend::{blob_url, BlobStore};
use crate::error::{BackendError, Result};

const MEMORY_BLOB_BASE: &str = "memory://blobs";

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn put(&self, path: &BlobPath, data: Bytes, content_type: Option<&str>) -> Result<()> {
        let max = self.max_blob_size();
        let mut state = self.lock();
        state.record(Operation::PutBlob {
            path: path.to_string(),
            size: data.len(),
        })?;
        if data.len() > max {
            return Err(BackendError::BlobTooLarge {
                size: data.len(),
                max,
            });
        }
        let generation = state.next_generation;
        state.next_generation += 1;
        debug!(path = %path, size = data.len(), generation, "blob stored");
        state.blobs.insert(
            path.to_string(),
            StoredBlob {
                data,
                content_type: content_type.map(String::from),
                generation,
            },
        );
        Ok(())
    }

    async fn public_url(&self, path: &BlobPath) -> Result<String> {
        let state = self.lock();
        let blob = state
            .blobs
            .get(path.as_str())
            .ok_or_else(|| BackendError::NotFound(format!("storage/object-not-found: {path}")))?;
        let base = Url::parse(MEMORY_BLOB_BASE)
            .map_err(|e| BackendError::Storage(format!("Invalid blob base URL: {e}")))?;
        let mut url = blob_url(&base, path)?;
        // the generation changes on overwrite so cached players refetch
        url.set_query(Some(&format!("v={}", blob.generation)));
        Ok(url.into())
    }
}

impl MemoryBackend {
    pub fn blob_content_type(&self, path: &str) -> Option<String> {
        self.lock()
            .blobs
            .get(path)
            .and_then(|b| b.content_type.clone())
    }
}
