//! # mural
//!
//! Smoke run of the Mural client. Wires the in-memory auth/data backend,
//! filesystem blob storage and the SQLite preference store to a view that
//! only logs, then walks through a short scripted session:
//!
//! - a member registers and posts a review
//! - the admin signs up, replaces the video and adds gallery images
//! - the admin removes the member's review
//!
//! Configuration comes from the same environment variables as the library
//! (`MURAL_ADMIN_EMAIL`, `BLOB_STORAGE_PATH`, `PREFERENCES_DB`, ...).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use tracing::info;

use mural_client::commands::account::RegistrationForm;
use mural_client::events::{
    AuthPanel, GalleryView, ProfileCard, ReviewList, SessionView, ThemeView, Toast, ToastId,
};
use mural_client::state::Session;
use mural_client::{App, Backend, ClientConfig, View};
use mural_shared::files::FileUpload;
use mural_shared::models::MediaRecord;
use mural_store::{FsBlobStore, MemoryBackend, SqlitePreferences};

/// Prints every render call through `tracing` and accepts every prompt.
struct LogView;

#[async_trait]
impl View for LogView {
    fn render_session(&self, session: &SessionView) {
        info!(name = %session.display_name, subtitle = %session.subtitle, admin = session.show_admin_controls, "header");
    }

    fn show_auth_panel(&self, panel: Option<AuthPanel>) {
        info!(?panel, "auth modal");
    }

    fn render_profile(&self, card: &ProfileCard) {
        info!(name = %card.full_name, handle = %card.handle, "profile");
    }

    fn set_session_menu_open(&self, open: bool) {
        info!(open, "session menu");
    }

    fn render_rating(&self, stars: u8) {
        info!(stars, "rating selector");
    }

    fn clear_review_form(&self) {
        info!("review form cleared");
    }

    fn render_reviews(&self, reviews: &ReviewList) {
        match reviews {
            ReviewList::Empty => info!("reviews: none yet"),
            ReviewList::Cards(cards) => {
                for card in cards {
                    info!(
                        author = %card.author_name,
                        date = %card.date,
                        stars = card.filled_stars,
                        deletable = card.can_delete,
                        "review: {}",
                        card.text
                    );
                }
            }
        }
    }

    fn render_video(&self, video: Option<&MediaRecord>) {
        info!(url = video.map(|v| v.url.as_str()), "video");
    }

    fn render_gallery(&self, gallery: &GalleryView) {
        match gallery {
            GalleryView::Empty => info!("gallery: empty"),
            GalleryView::Tiles(tiles) => info!(count = tiles.len(), "gallery"),
        }
    }

    fn show_image_overlay(&self, url: Option<&str>) {
        info!(url, "image overlay");
    }

    fn clear_image_selection(&self) {
        info!("image selection cleared");
    }

    fn apply_theme(&self, theme: &ThemeView) {
        info!(color = %theme.primary_color, font = %theme.font_family, rainbow = theme.rainbow_mode, "theme");
    }

    fn show_toast(&self, toast: &Toast) {
        info!(id = toast.id.0, kind = ?toast.kind, "toast: {}", toast.message);
    }

    fn hide_toast(&self, _id: ToastId) {}

    fn remove_toast(&self, _id: ToastId) {}

    async fn confirm(&self, prompt: &str) -> bool {
        info!("confirm: {prompt} -> yes");
        true
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mural_client::init_tracing();

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let memory = MemoryBackend::with_max_blob_size(config.max_blob_size);
    let blobs = FsBlobStore::new(
        config.blob_storage_path.clone(),
        &config.public_blob_url,
        config.max_blob_size,
    )
    .await
    .context("opening blob storage")?;
    let prefs = match &config.preferences_db {
        Some(path) => SqlitePreferences::open_at(path),
        None => SqlitePreferences::open_default(),
    }
    .context("opening preference store")?;

    let backend = Backend {
        auth: Arc::new(memory.clone()),
        data: Arc::new(memory.clone()),
        blobs: Arc::new(blobs),
        prefs: Arc::new(prefs),
    };
    let admin_email = config.admin_email.clone();
    let app = App::start(backend, Arc::new(LogView), config);

    // -- A member posts a review ------------------------------------------
    let member = app
        .account
        .register(RegistrationForm {
            full_name: "Joana Souza".into(),
            nickname: "jo".into(),
            email: "joana@example.com".into(),
            password: "joana-123".into(),
            photo: None,
        })
        .await?;
    app.session()
        .wait_for(|s| s.member().is_some_and(|m| m.user.uid == member.uid))
        .await;

    app.reviews.hover_rating(3);
    app.reviews.select_rating(4);
    app.reviews.leave_rating();
    let review = app.reviews.submit("Muito bom, recomendo!").await?;
    app.account.logout().await?;
    app.session().wait_for(|s| *s == Session::Guest).await;

    // -- The admin takes over ----------------------------------------------
    app.account
        .register(RegistrationForm {
            full_name: "Admin".into(),
            nickname: "admin".into(),
            email: admin_email,
            password: "admin-123".into(),
            photo: None,
        })
        .await?;
    app.session().wait_for(Session::is_admin).await;

    app.media
        .upload_video(&[FileUpload::new("journal.mp4", vec![0u8; 1024]).with_content_type("video/mp4")])
        .await?;
    let report = app
        .media
        .upload_images(&[
            FileUpload::new("capa.png", vec![1u8; 256]).with_content_type("image/png"),
            FileUpload::new("bastidores.jpg", vec![2u8; 512]).with_content_type("image/jpeg"),
        ])
        .await?;
    if let Some(first) = report.uploaded.first() {
        app.media.open_image(&first.record.url);
        app.media.close_image();
    }

    app.settings.toggle_rainbow()?;
    app.reviews.delete(&review).await?;
    app.settings.reset().await?;

    // let the feeds and toasts catch up before exiting
    tokio::time::sleep(Duration::from_millis(200)).await;
    info!(uploaded = report.uploaded.len(), "demo finished");
    Ok(())
}
