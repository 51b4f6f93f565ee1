use async_trait::async_trait;

use mural_shared::models::MediaRecord;

use crate::events::{
    AuthPanel, GalleryView, ProfileCard, ReviewList, SessionView, ThemeView, Toast, ToastId,
};

/// The rendering target. Commands never touch markup; they hand finished
/// view models to this trait.
///
/// Methods are called from async tasks and must not block.
#[async_trait]
pub trait View: Send + Sync {
    fn render_session(&self, session: &SessionView);

    /// Open one of the auth modal panels, or close the modal with `None`.
    fn show_auth_panel(&self, panel: Option<AuthPanel>);

    fn render_profile(&self, card: &ProfileCard);

    fn set_session_menu_open(&self, open: bool);

    /// Number of highlighted stars in the rating selector (0..=5).
    fn render_rating(&self, stars: u8);

    fn clear_review_form(&self);

    fn render_reviews(&self, reviews: &ReviewList);

    /// `None` leaves the static video placeholder in place.
    fn render_video(&self, video: Option<&MediaRecord>);

    fn render_gallery(&self, gallery: &GalleryView);

    /// Full-screen overlay for one gallery image; `None` closes it.
    fn show_image_overlay(&self, url: Option<&str>);

    fn clear_image_selection(&self);

    fn apply_theme(&self, theme: &ThemeView);

    fn show_toast(&self, toast: &Toast);

    /// Start the exit animation.
    fn hide_toast(&self, id: ToastId);

    fn remove_toast(&self, id: ToastId);

    /// Yes/no question for destructive actions.
    async fn confirm(&self, prompt: &str) -> bool;
}
