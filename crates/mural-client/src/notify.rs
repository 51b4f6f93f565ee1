//! Transient toast notifications.
//!
//! Toasts are fire-and-forget. Each one gets its own removal timer and
//! nothing queues, so simultaneous toasts simply stack.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mural_shared::types::NoticeKind;

use crate::events::{Toast, ToastId};
use crate::view::View;

#[derive(Clone)]
pub struct Notifier {
    view: Arc<dyn View>,
    next_id: Arc<AtomicU64>,
    display: Duration,
    exit: Duration,
}

impl Notifier {
    pub fn new(view: Arc<dyn View>, display: Duration, exit: Duration) -> Self {
        Self {
            view,
            next_id: Arc::new(AtomicU64::new(1)),
            display,
            exit,
        }
    }

    pub fn success(&self, message: impl Into<String>) -> ToastId {
        self.notify(message, NoticeKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> ToastId {
        self.notify(message, NoticeKind::Error)
    }

    pub fn info(&self, message: impl Into<String>) -> ToastId {
        self.notify(message, NoticeKind::Info)
    }

    pub fn notify(&self, message: impl Into<String>, kind: NoticeKind) -> ToastId {
        let id = ToastId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let toast = Toast {
            id,
            message: message.into(),
            kind,
            color: kind.color_token(),
        };

        tracing::debug!(id = id.0, ?kind, message = %toast.message, "toast");
        self.view.show_toast(&toast);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let view = self.view.clone();
                let (display, exit) = (self.display, self.exit);
                handle.spawn(async move {
                    tokio::time::sleep(display).await;
                    view.hide_toast(id);
                    tokio::time::sleep(exit).await;
                    view.remove_toast(id);
                });
            }
            Err(_) => {
                tracing::warn!(id = id.0, "no async runtime, toast will not auto-dismiss");
            }
        }

        id
    }
}
