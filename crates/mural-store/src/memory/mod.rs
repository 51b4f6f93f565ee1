//! In-process backend.
//!
//! One [`MemoryBackend`] plays all three remote services: auth, records and
//! blobs. Clones share state, so one instance can be handed out as
//! `Arc<dyn AuthService>`, `Arc<dyn DataStore>` and `Arc<dyn BlobStore>`. Every
//! call is appended to an operation log, and faults can be injected per
//! operation kind.

mod auth;
mod blobs;
mod data;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use serde_json::Value;
use tokio::sync::{mpsc, watch};

use mural_shared::constants::MAX_BLOB_SIZE;
use mural_shared::paths::RecordPath;

use crate::backend::{AuthUser, Snapshot};
use crate::error::{BackendError, Result};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    CreateAccount { email: String },
    SignIn { email: String },
    SignOut,
    Get { path: String },
    Set { path: String, value: Value },
    Remove { path: String },
    PutBlob { path: String, size: usize },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::CreateAccount { .. } => OperationKind::CreateAccount,
            Self::SignIn { .. } => OperationKind::SignIn,
            Self::SignOut => OperationKind::SignOut,
            Self::Get { .. } => OperationKind::Get,
            Self::Set { .. } => OperationKind::Set,
            Self::Remove { .. } => OperationKind::Remove,
            Self::PutBlob { .. } => OperationKind::PutBlob,
        }
    }

    fn target(&self) -> &str {
        match self {
            Self::CreateAccount { email } | Self::SignIn { email } => email,
            Self::SignOut => "",
            Self::Get { path } | Self::Set { path, .. } | Self::Remove { path } => path,
            Self::PutBlob { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateAccount,
    SignIn,
    SignOut,
    Get,
    Set,
    Remove,
    PutBlob,
}

/// Makes every matching call fail with `PermissionDenied(message)` until
/// cleared. `target` matches by substring against the path (or email).
#[derive(Debug, Clone)]
struct Fault {
    kind: OperationKind,
    target: String,
    message: String,
}

pub(crate) struct Account {
    pub(crate) user: AuthUser,
    pub(crate) digest: String,
}

pub(crate) struct StoredBlob {
    pub(crate) data: Bytes,
    pub(crate) content_type: Option<String>,
    pub(crate) generation: u64,
}

struct Subscriber {
    path: RecordPath,
    tx: mpsc::UnboundedSender<Snapshot>,
}

pub(crate) struct State {
    pub(crate) accounts: HashMap<String, Account>,
    pub(crate) tree: Value,
    pub(crate) blobs: HashMap<String, StoredBlob>,
    pub(crate) next_generation: u64,
    subscribers: Vec<Subscriber>,
    log: Vec<Operation>,
    faults: Vec<Fault>,
}

struct Inner {
    state: Mutex<State>,
    current_user: watch::Sender<Option<AuthUser>>,
    max_blob_size: usize,
}

#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_max_blob_size(MAX_BLOB_SIZE)
    }

    pub fn with_max_blob_size(max_blob_size: usize) -> Self {
        let (current_user, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    accounts: HashMap::new(),
                    tree: Value::Object(Default::default()),
                    blobs: HashMap::new(),
                    next_generation: 1,
                    subscribers: Vec::new(),
                    log: Vec::new(),
                    faults: Vec::new(),
                }),
                current_user,
                max_blob_size,
            }),
        }
    }

    /// Every call made so far, oldest first.
    pub fn operations(&self) -> Vec<Operation> {
        self.lock().log.clone()
    }

    pub fn operations_of(&self, kind: OperationKind) -> Vec<Operation> {
        self.lock()
            .log
            .iter()
            .filter(|op| op.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn clear_operations(&self) {
        self.lock().log.clear();
    }

    pub fn inject_fault(&self, kind: OperationKind, target: &str, message: &str) {
        self.lock().faults.push(Fault {
            kind,
            target: target.to_string(),
            message: message.to_string(),
        });
    }

    pub fn clear_faults(&self) {
        self.lock().faults.clear();
    }

    pub fn blob_count(&self) -> usize {
        self.lock().blobs.len()
    }

    pub fn blob_bytes(&self, path: &str) -> Option<Bytes> {
        self.lock().blobs.get(path).map(|b| b.data.clone())
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        // a panicking test thread must not wedge every other handle
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn current_user(&self) -> &watch::Sender<Option<AuthUser>> {
        &self.inner.current_user
    }

    pub(crate) fn max_blob_size(&self) -> usize {
        self.inner.max_blob_size
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    /// Log `op`, then fail it if a matching fault is armed.
    pub(crate) fn record(&mut self, op: Operation) -> Result<()> {
        let fault = self
            .faults
            .iter()
            .find(|f| f.kind == op.kind() && op.target().contains(&f.target))
            .map(|f| f.message.clone());
        self.log.push(op);
        match fault {
            Some(message) => Err(BackendError::PermissionDenied(message)),
            None => Ok(()),
        }
    }

    pub(crate) fn add_subscriber(&mut self, path: RecordPath) -> mpsc::UnboundedReceiver<Snapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        let initial = Snapshot::new(path.clone(), data::value_at(&self.tree, &path).cloned());
        // receiver is alive, cannot fail
        let _ = tx.send(initial);
        self.subscribers.push(Subscriber { path, tx });
        rx
    }

    /// Push a fresh snapshot to every subscriber whose path overlaps
    /// `changed`, dropping subscribers that went away.
    pub(crate) fn notify(&mut self, changed: &RecordPath) {
        let tree = &self.tree;
        self.subscribers.retain(|sub| {
            if !sub.path.overlaps(changed) {
                return !sub.tx.is_closed();
            }
            let snapshot = Snapshot::new(sub.path.clone(), data::value_at(tree, &sub.path).cloned());
            sub.tx.send(snapshot).is_ok()
        });
    }
}
