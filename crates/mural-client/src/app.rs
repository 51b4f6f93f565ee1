//! Application root: builds the shared context, starts the session manager
//! and the live feeds, and hands out the command handlers.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use mural_shared::clock::{Clock, SystemClock};

use crate::commands::account::AccountForms;
use crate::commands::media::MediaAdmin;
use crate::commands::reviews::ReviewBoard;
use crate::commands::session::SessionManager;
use crate::commands::settings::SettingsPanel;
use crate::config::ClientConfig;
use crate::context::{AppContext, Backend};
use crate::state::SessionHandle;
use crate::view::View;

/// Owns the background tasks. Dropping the `App` aborts them.
pub struct App {
    ctx: Arc<AppContext>,
    pub account: Arc<AccountForms>,
    pub reviews: Arc<ReviewBoard>,
    pub media: Arc<MediaAdmin>,
    pub settings: Arc<SettingsPanel>,
    tasks: Vec<JoinHandle<()>>,
}

impl App {
    /// Must be called inside a tokio runtime.
    pub fn start(backend: Backend, view: Arc<dyn View>, config: ClientConfig) -> Self {
        Self::start_with_clock(backend, view, config, Arc::new(SystemClock))
    }

    pub fn start_with_clock(
        backend: Backend,
        view: Arc<dyn View>,
        config: ClientConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::from_context(Arc::new(AppContext::new(backend, view, config, clock)))
    }

    pub fn from_context(ctx: Arc<AppContext>) -> Self {
        let account = Arc::new(AccountForms::new(ctx.clone()));
        let reviews = Arc::new(ReviewBoard::new(ctx.clone()));
        let media = Arc::new(MediaAdmin::new(ctx.clone()));
        let settings = Arc::new(SettingsPanel::new(ctx.clone()));

        // preferences first so the page never flashes the default theme
        settings.load();

        let tasks = vec![
            tokio::spawn(SessionManager::new(ctx.clone()).run()),
            tokio::spawn(reviews.clone().run_feed()),
            tokio::spawn(media.clone().run_video_feed()),
            tokio::spawn(media.clone().run_gallery_feed()),
        ];
        info!(admin = %ctx.config.admin_email, "mural client started");

        Self {
            ctx,
            account,
            reviews,
            media,
            settings,
            tasks,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.ctx.session
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }
}

impl Drop for App {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
