//! SQLite-backed preference store.
//!
//! [`SqlitePreferences`] owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation. The connection sits behind
//! a mutex so the store can be shared across tasks.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::backend::PreferenceStore;
use crate::error::{BackendError, Result};
use crate::migrations;

pub struct SqlitePreferences {
    conn: Mutex<Connection>,
}

impl SqlitePreferences {
    /// Open (or create) the default preference database.
    ///
    /// The file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/mural/preferences.db`
    /// - macOS:   `~/Library/Application Support/com.mural.mural/preferences.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\mural\mural\data\preferences.db`
    pub fn open_default() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "mural", "mural").ok_or(BackendError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Self::open_at(&data_dir.join("preferences.db"))
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "opening preference database");

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Fully in-memory database, gone when dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.conn().path().map(PathBuf::from)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PreferenceStore for SqlitePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let prefs = SqlitePreferences::open_in_memory().unwrap();
        assert_eq!(prefs.get("themeColor").unwrap(), None);

        prefs.set("themeColor", "#ff0000").unwrap();
        prefs.set("themeColor", "#00ff00").unwrap();
        assert_eq!(prefs.get("themeColor").unwrap().as_deref(), Some("#00ff00"));

        prefs.remove("themeColor").unwrap();
        assert_eq!(prefs.get("themeColor").unwrap(), None);
        // removing a missing key is fine
        prefs.remove("themeColor").unwrap();
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");

        {
            let prefs = SqlitePreferences::open_at(&path).unwrap();
            prefs.set("rainbowMode", "true").unwrap();
            assert!(prefs.path().is_some());
        }

        let prefs = SqlitePreferences::open_at(&path).unwrap();
        assert_eq!(prefs.get("rainbowMode").unwrap().as_deref(), Some("true"));
    }
}
