//! Everything a command needs, bundled once and shared behind an `Arc`.

use std::sync::Arc;

use mural_shared::clock::Clock;
use mural_shared::models::UserProfile;
use mural_shared::paths;
use mural_shared::types::UserId;
use mural_store::{AuthService, BlobStore, DataStore, MemoryBackend, PreferenceStore};

use crate::config::ClientConfig;
use crate::error::{ClientError, ErrorKind};
use crate::notify::Notifier;
use crate::policy::{AdminEmailPolicy, AuthorizationPolicy};
use crate::state::{Member, SessionHandle};
use crate::view::View;

/// The external services, one handle each.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthService>,
    pub data: Arc<dyn DataStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub prefs: Arc<dyn PreferenceStore>,
}

impl Backend {
    /// Auth, records and blobs from one in-process backend.
    pub fn in_memory(memory: &MemoryBackend, prefs: Arc<dyn PreferenceStore>) -> Self {
        Self {
            auth: Arc::new(memory.clone()),
            data: Arc::new(memory.clone()),
            blobs: Arc::new(memory.clone()),
            prefs,
        }
    }
}

pub struct AppContext {
    pub backend: Backend,
    pub view: Arc<dyn View>,
    pub session: SessionHandle,
    pub notifier: Notifier,
    pub policy: Arc<dyn AuthorizationPolicy>,
    pub clock: Arc<dyn Clock>,
    pub config: ClientConfig,
}

impl AppContext {
    /// Admin resolution follows `config.admin_email`; toast timings follow
    /// the config as well.
    pub fn new(backend: Backend, view: Arc<dyn View>, config: ClientConfig, clock: Arc<dyn Clock>) -> Self {
        let notifier = Notifier::new(view.clone(), config.toast_display, config.toast_exit);
        Self {
            backend,
            view,
            session: SessionHandle::new(),
            notifier,
            policy: Arc::new(AdminEmailPolicy::new(config.admin_email.clone())),
            clock,
            config,
        }
    }

    /// The one place failures are turned into user feedback.
    ///
    /// Validation and permission failures show their own message. Backend
    /// failures show `context: raw message`. Nothing is retried.
    pub fn report(&self, context: &str, err: &ClientError) {
        match err.kind() {
            ErrorKind::Validation => {
                tracing::debug!(context, error = %err, "rejected");
                self.notifier.error(err.to_string());
            }
            ErrorKind::Backend => {
                tracing::warn!(context, error = %err, "backend call failed");
                self.notifier.error(format!("{context}: {err}"));
            }
            ErrorKind::Unexpected => {
                tracing::error!(context, error = %err, "unexpected failure");
                self.notifier.error(format!("{context}: {err}"));
            }
        }
    }

    /// Run `result` through [`report`](Self::report) on the error path.
    pub fn reported<T>(&self, context: &str, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(err) = &result {
            self.report(context, err);
        }
        result
    }

    pub async fn fetch_profile(&self, uid: &UserId) -> Result<Option<UserProfile>, ClientError> {
        let path = paths::user_profile(uid)?;
        let snapshot = self.backend.data.get(&path).await?;
        Ok(snapshot.decode::<UserProfile>()?)
    }

    pub fn require_member(&self, message: &str) -> Result<Member, ClientError> {
        self.session
            .current()
            .member()
            .cloned()
            .ok_or_else(|| ClientError::validation(message))
    }

    pub fn require_admin(&self, message: &str) -> Result<Member, ClientError> {
        match self.session.current().member() {
            Some(member) if member.is_admin() => Ok(member.clone()),
            _ => Err(ClientError::forbidden(message)),
        }
    }
}
