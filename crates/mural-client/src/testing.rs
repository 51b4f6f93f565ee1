//! Test doubles shared by the command tests: a view that records every
//! call and a harness wiring it to the in-memory backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use mural_shared::clock::ManualClock;
use mural_shared::models::MediaRecord;
use mural_store::{AuthService, AuthUser, MemoryBackend, MemoryPreferences};

use crate::commands::session::SessionManager;
use crate::config::ClientConfig;
use crate::context::{AppContext, Backend};
use crate::events::{
    AuthPanel, GalleryView, ProfileCard, ReviewList, SessionView, ThemeView, Toast, ToastId,
};
use crate::state::Member;
use crate::view::View;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Session(SessionView),
    AuthPanel(Option<AuthPanel>),
    Profile(ProfileCard),
    MenuOpen(bool),
    Rating(u8),
    ReviewFormCleared,
    Reviews(ReviewList),
    Video(Option<MediaRecord>),
    Gallery(GalleryView),
    Overlay(Option<String>),
    ImageSelectionCleared,
    Theme(ThemeView),
    ToastShown(Toast),
    ToastHidden(ToastId),
    ToastRemoved(ToastId),
}

pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
    prompts: Mutex<Vec<String>>,
    confirm_answer: Mutex<bool>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            confirm_answer: Mutex::new(true),
        }
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    fn last<T>(&self, f: impl Fn(&ViewEvent) -> Option<T>) -> Option<T> {
        self.events.lock().unwrap().iter().rev().find_map(f)
    }

    /// Toasts shown and not yet removed, oldest first.
    pub fn visible_toasts(&self) -> Vec<Toast> {
        let events = self.events.lock().unwrap();
        events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::ToastShown(t) => Some(t),
                _ => None,
            })
            .filter(|t| !events.contains(&ViewEvent::ToastRemoved(t.id)))
            .cloned()
            .collect()
    }

    pub fn last_session(&self) -> Option<SessionView> {
        self.last(|e| match e {
            ViewEvent::Session(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn menu_open(&self) -> Option<bool> {
        self.last(|e| match e {
            ViewEvent::MenuOpen(open) => Some(*open),
            _ => None,
        })
    }

    pub fn last_rating(&self) -> Option<u8> {
        self.last(|e| match e {
            ViewEvent::Rating(stars) => Some(*stars),
            _ => None,
        })
    }

    pub fn last_reviews(&self) -> Option<ReviewList> {
        self.last(|e| match e {
            ViewEvent::Reviews(list) => Some(list.clone()),
            _ => None,
        })
    }

    pub fn last_video(&self) -> Option<Option<MediaRecord>> {
        self.last(|e| match e {
            ViewEvent::Video(video) => Some(video.clone()),
            _ => None,
        })
    }

    pub fn last_gallery(&self) -> Option<GalleryView> {
        self.last(|e| match e {
            ViewEvent::Gallery(g) => Some(g.clone()),
            _ => None,
        })
    }

    pub fn last_theme(&self) -> Option<ThemeView> {
        self.last(|e| match e {
            ViewEvent::Theme(t) => Some(t.clone()),
            _ => None,
        })
    }

    /// URL in the overlay right now, if it is open.
    pub fn overlay(&self) -> Option<String> {
        self.last(|e| match e {
            ViewEvent::Overlay(url) => Some(url.clone()),
            _ => None,
        })
        .flatten()
    }

    pub fn answer_confirm(&self, answer: bool) {
        *self.confirm_answer.lock().unwrap() = answer;
    }

    pub fn confirm_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Poll until `pred` holds. Panics after two seconds.
    pub async fn wait_until(&self, pred: impl Fn(&RecordingView) -> bool) {
        let poll = async {
            while !pred(self) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        if tokio::time::timeout(Duration::from_secs(2), poll).await.is_err() {
            panic!("view never reached the expected state: {:#?}", self.events());
        }
    }
}

#[async_trait]
impl View for RecordingView {
    fn render_session(&self, session: &SessionView) {
        self.push(ViewEvent::Session(session.clone()));
    }

    fn show_auth_panel(&self, panel: Option<AuthPanel>) {
        self.push(ViewEvent::AuthPanel(panel));
    }

    fn render_profile(&self, card: &ProfileCard) {
        self.push(ViewEvent::Profile(card.clone()));
    }

    fn set_session_menu_open(&self, open: bool) {
        self.push(ViewEvent::MenuOpen(open));
    }

    fn render_rating(&self, stars: u8) {
        self.push(ViewEvent::Rating(stars));
    }

    fn clear_review_form(&self) {
        self.push(ViewEvent::ReviewFormCleared);
    }

    fn render_reviews(&self, reviews: &ReviewList) {
        self.push(ViewEvent::Reviews(reviews.clone()));
    }

    fn render_video(&self, video: Option<&MediaRecord>) {
        self.push(ViewEvent::Video(video.cloned()));
    }

    fn render_gallery(&self, gallery: &GalleryView) {
        self.push(ViewEvent::Gallery(gallery.clone()));
    }

    fn show_image_overlay(&self, url: Option<&str>) {
        self.push(ViewEvent::Overlay(url.map(String::from)));
    }

    fn clear_image_selection(&self) {
        self.push(ViewEvent::ImageSelectionCleared);
    }

    fn apply_theme(&self, theme: &ThemeView) {
        self.push(ViewEvent::Theme(theme.clone()));
    }

    fn show_toast(&self, toast: &Toast) {
        self.push(ViewEvent::ToastShown(toast.clone()));
    }

    fn hide_toast(&self, id: ToastId) {
        self.push(ViewEvent::ToastHidden(id));
    }

    fn remove_toast(&self, id: ToastId) {
        self.push(ViewEvent::ToastRemoved(id));
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        *self.confirm_answer.lock().unwrap()
    }
}

/// In-memory backend, recording view and a stepping clock, wired into an
/// [`AppContext`]. No background tasks are started.
pub struct Harness {
    pub memory: MemoryBackend,
    pub prefs: Arc<MemoryPreferences>,
    pub view: Arc<RecordingView>,
    pub clock: Arc<ManualClock>,
    ctx: Arc<AppContext>,
}

impl Harness {
    pub const ADMIN: &'static str = "admin@mural.test";
    pub const PASSWORD: &'static str = "segredo";

    pub fn new() -> Self {
        let memory = MemoryBackend::new();
        let prefs = Arc::new(MemoryPreferences::new());
        let view = Arc::new(RecordingView::new());
        let clock = Arc::new(ManualClock::with_step(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            chrono::Duration::milliseconds(1),
        ));
        let config = ClientConfig {
            admin_email: Self::ADMIN.to_string(),
            ..ClientConfig::default()
        };
        let ctx = Arc::new(AppContext::new(
            Backend::in_memory(&memory, prefs.clone()),
            view.clone(),
            config,
            clock.clone(),
        ));
        Self {
            memory,
            prefs,
            view,
            clock,
            ctx,
        }
    }

    pub fn ctx(&self) -> Arc<AppContext> {
        self.ctx.clone()
    }

    /// New account, left signed in at the auth service.
    pub async fn create_account(&self, email: &str) -> AuthUser {
        self.memory
            .create_account(email, Self::PASSWORD)
            .await
            .unwrap()
    }

    pub async fn sign_out(&self) {
        self.memory.sign_out().await.unwrap();
    }

    /// Sign in (creating the account if needed) and publish the resulting
    /// session, as the session manager would.
    pub async fn sign_in_session(&self, email: &str) -> Member {
        let user = match self.memory.sign_in(email, Self::PASSWORD).await {
            Ok(user) => user,
            Err(_) => self.create_account(email).await,
        };
        SessionManager::new(self.ctx())
            .apply(Some(user))
            .await
            .member()
            .cloned()
            .unwrap()
    }
}
