//! Service contracts.
//!
//! Each trait describes the shape of one external collaborator, not any
//! particular vendor SDK. Async methods go over the network in a real
//! deployment; `push` and `subscribe` are local operations that return
//! immediately.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use url::Url;

use mural_shared::paths::{BlobPath, RecordPath};
use mural_shared::types::{RecordKey, UserId};

use crate::error::{BackendError, Result};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// The identity the auth service hands back after sign-in or sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: UserId,
    pub email: String,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and sign it in.
    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;

    async fn sign_out(&self) -> Result<()>;

    /// Current identity, updated on every sign-in / sign-out. The receiver
    /// starts out holding the current value.
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}

// ---------------------------------------------------------------------------
// Structured data
// ---------------------------------------------------------------------------

/// Value found at a path at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    path: RecordPath,
    value: Option<Value>,
}

impl Snapshot {
    pub fn new(path: RecordPath, value: Option<Value>) -> Self {
        // a null leaf and an empty object both mean "nothing here"
        let value = value.filter(|v| match v {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        });
        Self { path, value }
    }

    pub fn path(&self) -> &RecordPath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Decode the whole value. `Ok(None)` when nothing is stored.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.value {
            Some(v) => Ok(Some(serde_json::from_value(v.clone())?)),
            None => Ok(None),
        }
    }

    /// Direct children in key order. Leaves have no children.
    pub fn children(&self) -> Vec<(RecordKey, &Value)> {
        match &self.value {
            Some(Value::Object(map)) => {
                let mut children: Vec<_> = map
                    .iter()
                    .map(|(k, v)| (RecordKey(k.clone()), v))
                    .collect();
                children.sort_by(|a, b| a.0.cmp(&b.0));
                children
            }
            _ => Vec::new(),
        }
    }
}

/// Live feed of snapshots for one path. The first item is the value at
/// subscription time; after that, one item per change under the path.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl Subscription {
    pub fn new(rx: mpsc::UnboundedReceiver<Snapshot>) -> Self {
        Self { rx }
    }

    /// Next snapshot, or `None` once the store has gone away.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }
}

impl futures::Stream for Subscription {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Snapshot>> {
        self.rx.poll_recv(cx)
    }
}

#[async_trait]
pub trait DataStore: Send + Sync {
    async fn get(&self, path: &RecordPath) -> Result<Snapshot>;

    /// Replace whatever is at `path`. Setting `null` removes it.
    async fn set(&self, path: &RecordPath, value: Value) -> Result<()>;

    async fn remove(&self, path: &RecordPath) -> Result<()>;

    /// Fresh child location under `parent`. Nothing is written.
    fn push(&self, parent: &RecordPath) -> Result<RecordPath> {
        Ok(parent.child(RecordKey::generate().as_str())?)
    }

    fn subscribe(&self, path: &RecordPath) -> Subscription;
}

// ---------------------------------------------------------------------------
// Blobs
// ---------------------------------------------------------------------------

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` at `path`, replacing any existing blob.
    async fn put(&self, path: &BlobPath, data: Bytes, content_type: Option<&str>) -> Result<()>;

    /// Publicly fetchable URL for the blob at `path`.
    async fn public_url(&self, path: &BlobPath) -> Result<String>;
}

/// `base` with each segment of `path` appended, percent-encoded, so names
/// with spaces, `#` or `?` still point at the stored blob.
pub fn blob_url(base: &Url, path: &BlobPath) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| BackendError::Storage(format!("Blob base URL cannot hold a path: {base}")))?
        .pop_if_empty()
        .extend(path.segments());
    Ok(url)
}

// ---------------------------------------------------------------------------
// Per-device preferences
// ---------------------------------------------------------------------------

/// Small string key/value store local to one device (never synced).
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mural_shared::paths;
    use serde_json::json;

    #[test]
    fn empty_values_do_not_exist() {
        assert!(!Snapshot::new(paths::reviews(), Some(Value::Null)).exists());
        assert!(!Snapshot::new(paths::reviews(), Some(json!({}))).exists());
        assert!(Snapshot::new(paths::reviews(), Some(json!({"a": 1}))).exists());
    }

    #[test]
    fn children_in_key_order() {
        let snap = Snapshot::new(paths::gallery(), Some(json!({"b": 2, "a": 1, "c": 3})));
        let keys: Vec<_> = snap.children().into_iter().map(|(k, _)| k.0).collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn push_creates_child_path_without_writing() {
        struct Nothing;
        #[async_trait]
        impl DataStore for Nothing {
            async fn get(&self, path: &RecordPath) -> Result<Snapshot> {
                Ok(Snapshot::new(path.clone(), None))
            }
            async fn set(&self, _: &RecordPath, _: Value) -> Result<()> {
                unreachable!()
            }
            async fn remove(&self, _: &RecordPath) -> Result<()> {
                unreachable!()
            }
            fn subscribe(&self, _: &RecordPath) -> Subscription {
                Subscription::new(mpsc::unbounded_channel().1)
            }
        }

        let a = Nothing.push(&paths::reviews()).unwrap();
        let b = Nothing.push(&paths::reviews()).unwrap();
        assert_eq!(a.parent().unwrap(), paths::reviews());
        assert_ne!(a, b);
    }
}
