use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::{debug, info};
use url::Url;

use mural_shared::paths::BlobPath;

use crate::backend::{blob_url, BlobStore};
use crate::error::{BackendError, Result};

/// Resolve `relative` under `base`, refusing anything that would escape it.
fn ensure_within(base: &Path, relative: &str) -> Result<PathBuf> {
    let mut resolved = base.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(c) => resolved.push(c),
            Component::CurDir => {}
            _ => {
                return Err(BackendError::InvalidPath(format!(
                    "Path traversal detected: {relative}"
                )))
            }
        }
    }
    if !resolved.starts_with(base) || resolved == base {
        return Err(BackendError::InvalidPath(format!(
            "Path traversal detected: {relative}"
        )));
    }
    Ok(resolved)
}

/// Blobs as plain files under a base directory, served from
/// `{public_base_url}/{path}`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    base_path: PathBuf,
    public_base_url: Url,
    max_size: usize,
}

impl FsBlobStore {
    pub async fn new(base_path: PathBuf, public_base_url: &str, max_size: usize) -> Result<Self> {
        let public_base_url = Url::parse(public_base_url).map_err(|e| {
            BackendError::Storage(format!("Invalid public blob URL '{public_base_url}': {e}"))
        })?;
        if public_base_url.cannot_be_a_base() {
            return Err(BackendError::Storage(format!(
                "Public blob URL cannot hold a path: {public_base_url}"
            )));
        }

        fs::create_dir_all(&base_path).await.map_err(|e| {
            BackendError::Storage(format!(
                "Failed to create blob directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Blob store initialized");

        Ok(Self {
            base_path,
            public_base_url,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub async fn read(&self, path: &BlobPath) -> Result<Vec<u8>> {
        let file = ensure_within(&self.base_path, path.as_str())?;
        if !file.exists() {
            return Err(BackendError::NotFound(path.to_string()));
        }
        fs::read(&file)
            .await
            .map_err(|e| BackendError::Storage(format!("Failed to read blob {path}: {e}")))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, path: &BlobPath, data: Bytes, _content_type: Option<&str>) -> Result<()> {
        if data.len() > self.max_size {
            return Err(BackendError::BlobTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let file = ensure_within(&self.base_path, path.as_str())?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                BackendError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        fs::write(&file, &data)
            .await
            .map_err(|e| BackendError::Storage(format!("Failed to write blob {path}: {e}")))?;

        debug!(path = %path, size = data.len(), "Stored blob");
        Ok(())
    }

    async fn public_url(&self, path: &BlobPath) -> Result<String> {
        let file = ensure_within(&self.base_path, path.as_str())?;
        if !file.exists() {
            return Err(BackendError::NotFound(path.to_string()));
        }
        Ok(blob_url(&self.public_base_url, path)?.into())
    }
}
