//! # mural-store
//!
//! Contracts for the services Mural delegates to: authentication, the
//! path-addressed record store, blob storage and the per-device preference
//! store. Alongside the traits live the reference implementations used for
//! local runs and tests:
//!
//! - [`MemoryBackend`]: auth, records and blobs in one process, with an
//!   operation log
//! - [`FsBlobStore`]: blobs on the local filesystem
//! - [`SqlitePreferences`] / [`MemoryPreferences`]: preference stores

pub mod backend;
pub mod database;
pub mod fs_blobs;
pub mod memory;
pub mod migrations;
pub mod prefs;

mod error;

pub use backend::{AuthService, AuthUser, BlobStore, DataStore, PreferenceStore, Snapshot, Subscription};
pub use database::SqlitePreferences;
pub use error::{BackendError, Result};
pub use fs_blobs::FsBlobStore;
pub use memory::{MemoryBackend, Operation, OperationKind};
pub use prefs::MemoryPreferences;
