//! View models pushed to the rendering target.
//!
//! Everything here is plain data. A renderer decides how to draw it, and
//! must escape user-supplied strings (names, review text) for its medium.

use serde::Serialize;

use mural_shared::constants::{CSS_FONT_FAMILY, CSS_PRIMARY_COLOR};
use mural_shared::models::{GalleryItem, StoredReview};
use mural_shared::timestamp::short_date;
use mural_shared::types::{NoticeKind, RecordKey};

use crate::state::Session;

pub const GUEST_NAME: &str = "Visitante";
pub const GUEST_SUBTITLE: &str = "Faça login";
pub const NO_REVIEWS: &str = "Nenhuma avaliação ainda. Seja o primeiro!";
pub const EMPTY_GALLERY: &str = "Nenhuma imagem na galeria ainda";

/// Header badge plus which session controls are visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub display_name: String,
    pub subtitle: String,
    pub avatar_url: Option<String>,
    pub signed_in: bool,
    pub show_admin_controls: bool,
}

impl SessionView {
    pub fn from_session(session: &Session) -> Self {
        match session.member() {
            None => Self {
                display_name: GUEST_NAME.to_string(),
                subtitle: GUEST_SUBTITLE.to_string(),
                avatar_url: None,
                signed_in: false,
                show_admin_controls: false,
            },
            Some(member) => Self {
                display_name: member.display_name(),
                subtitle: member.user.email.clone(),
                avatar_url: member.profile.as_ref().and_then(|p| p.photo_url.clone()),
                signed_in: true,
                show_admin_controls: member.is_admin(),
            },
        }
    }

    pub fn show_login_button(&self) -> bool {
        !self.signed_in
    }

    pub fn show_profile_button(&self) -> bool {
        self.signed_in
    }

    pub fn show_logout_button(&self) -> bool {
        self.signed_in
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthPanel {
    Login,
    Register,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCard {
    pub full_name: String,
    pub handle: String,
    pub email: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard {
    pub id: RecordKey,
    pub author_name: String,
    /// `@nickname`, or the author's email when there is no nickname.
    pub handle_line: String,
    pub date: String,
    pub filled_stars: u8,
    pub empty_stars: u8,
    pub text: String,
    pub avatar_url: Option<String>,
    pub can_delete: bool,
}

impl ReviewCard {
    pub fn new(stored: &StoredReview, can_delete: bool) -> Self {
        let review = &stored.review;
        let (filled_stars, empty_stars) = review.rating.stars();
        let handle_line = if review.user_nickname.is_empty() {
            review.user_email.clone()
        } else {
            format!("@{}", review.user_nickname)
        };
        Self {
            id: stored.id.clone(),
            author_name: review.user_name.clone(),
            handle_line,
            date: short_date(&review.timestamp),
            filled_stars,
            empty_stars,
            text: review.text.clone(),
            avatar_url: review.user_photo.clone(),
            can_delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "cards", rename_all = "lowercase")]
pub enum ReviewList {
    Empty,
    Cards(Vec<ReviewCard>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryTile {
    pub id: RecordKey,
    pub url: String,
}

impl From<&GalleryItem> for GalleryTile {
    fn from(item: &GalleryItem) -> Self {
        Self {
            id: item.id.clone(),
            url: item.record.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "tiles", rename_all = "lowercase")]
pub enum GalleryView {
    Empty,
    Tiles(Vec<GalleryTile>),
}

/// CSS custom properties and body classes driven by the settings panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeView {
    pub primary_color: String,
    pub font_family: String,
    pub rainbow_mode: bool,
}

impl ThemeView {
    pub fn css_properties(&self) -> [(&'static str, &str); 2] {
        [
            (CSS_PRIMARY_COLOR, self.primary_color.as_str()),
            (CSS_FONT_FAMILY, self.font_family.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ToastId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: NoticeKind,
    pub color: &'static str,
}
