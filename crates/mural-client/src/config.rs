//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client can start with zero
//! configuration for local development.

use std::path::PathBuf;
use std::time::Duration;

use mural_shared::constants::{MAX_BLOB_SIZE, TOAST_DISPLAY_MS, TOAST_EXIT_MS};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The one account granted admin controls (exact match).
    /// Env: `MURAL_ADMIN_EMAIL`
    /// Default: `admin@mural.local`
    pub admin_email: String,

    /// How long a toast stays fully visible.
    /// Env: `MURAL_TOAST_MS`
    /// Default: `3000`
    pub toast_display: Duration,

    /// Length of the toast slide-out before removal.
    /// Env: `MURAL_TOAST_EXIT_MS`
    /// Default: `300`
    pub toast_exit: Duration,

    /// Where the filesystem blob store keeps uploads.
    /// Env: `BLOB_STORAGE_PATH`
    /// Default: `./blobs`
    pub blob_storage_path: PathBuf,

    /// Base URL blobs are publicly served from.
    /// Env: `PUBLIC_BLOB_URL`
    /// Default: `http://localhost:8080/blobs`
    pub public_blob_url: String,

    /// Maximum blob size in bytes.
    /// Env: `MAX_BLOB_SIZE`
    /// Default: 50 MiB
    pub max_blob_size: usize,

    /// Preference database file. `None` means the platform data directory.
    /// Env: `PREFERENCES_DB`
    pub preferences_db: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@mural.local".to_string(),
            toast_display: Duration::from_millis(TOAST_DISPLAY_MS),
            toast_exit: Duration::from_millis(TOAST_EXIT_MS),
            blob_storage_path: PathBuf::from("./blobs"),
            public_blob_url: "http://localhost:8080/blobs".to_string(),
            max_blob_size: MAX_BLOB_SIZE,
            preferences_db: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(email) = lookup("MURAL_ADMIN_EMAIL") {
            let email = email.trim();
            if email.contains('@') {
                config.admin_email = email.to_string();
            } else {
                tracing::warn!(value = %email, "Invalid MURAL_ADMIN_EMAIL, using default");
            }
        }

        if let Some(ms) = parse_var::<u64>(&lookup, "MURAL_TOAST_MS") {
            config.toast_display = Duration::from_millis(ms);
        }

        if let Some(ms) = parse_var::<u64>(&lookup, "MURAL_TOAST_EXIT_MS") {
            config.toast_exit = Duration::from_millis(ms);
        }

        if let Some(path) = lookup("BLOB_STORAGE_PATH") {
            config.blob_storage_path = PathBuf::from(path);
        }

        if let Some(url) = lookup("PUBLIC_BLOB_URL") {
            config.public_blob_url = url.trim_end_matches('/').to_string();
        }

        if let Some(size) = parse_var::<usize>(&lookup, "MAX_BLOB_SIZE") {
            config.max_blob_size = size;
        }

        if let Some(path) = lookup("PREFERENCES_DB") {
            if !path.is_empty() {
                config.preferences_db = Some(PathBuf::from(path));
            }
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Invalid value, using default");
            None
        }
    }
}
