//! Record shapes stored in the structured data store.
//!
//! Field names are camelCase on the wire; timestamps are ISO-8601 with
//! milliseconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::timestamp::iso_millis;
use crate::types::{Rating, RecordKey, UserId};

// ---------------------------------------------------------------------------
// User profile
// ---------------------------------------------------------------------------

/// Stored at `users/{uid}`. Written once at registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub nickname: String,
    pub email: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Nickname, then full name, then `None`.
    pub fn preferred_name(&self) -> Option<&str> {
        [self.nickname.as_str(), self.full_name.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
    }
}

/// Part of an email before the `@`.
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// Stored at `reviews/{key}`. The `user*` fields are a copy of the author's
/// profile taken when the review was submitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_id: UserId,
    pub user_email: String,
    pub user_name: String,
    #[serde(default)]
    pub user_nickname: String,
    #[serde(default)]
    pub user_photo: Option<String>,
    pub rating: Rating,
    pub text: String,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

/// Profile fields copied into a review at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSnapshot {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub nickname: String,
    pub photo: Option<String>,
}

impl AuthorSnapshot {
    /// Falls back to the email local-part for the name when there is no
    /// profile or the profile has no full name.
    pub fn new(user_id: UserId, email: &str, profile: Option<&UserProfile>) -> Self {
        let name = profile
            .map(|p| p.full_name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email_local_part(email))
            .to_string();
        Self {
            user_id,
            email: email.to_string(),
            name,
            nickname: profile.map(|p| p.nickname.clone()).unwrap_or_default(),
            photo: profile.and_then(|p| p.photo_url.clone()),
        }
    }
}

impl Review {
    pub fn compose(
        author: AuthorSnapshot,
        rating: Rating,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ModelError::EmptyReviewText);
        }
        Ok(Self {
            user_id: author.user_id,
            user_email: author.email,
            user_name: author.name,
            user_nickname: author.nickname,
            user_photo: author.photo,
            rating,
            text: text.to_string(),
            timestamp,
        })
    }
}

/// A review together with the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReview {
    pub id: RecordKey,
    pub review: Review,
}

/// Newest first. Equal timestamps keep no particular order.
pub fn sort_newest_first(reviews: &mut [StoredReview]) {
    reviews.sort_by(|a, b| b.review.timestamp.cmp(&a.review.timestamp));
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// Metadata for an uploaded blob. The video singleton at `content/video`
/// and every gallery entry share this shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub url: String,
    pub uploaded_by: String,
    #[serde(with = "iso_millis")]
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub id: RecordKey,
    pub record: MediaRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn profile(full: &str, nick: &str, photo: Option<&str>) -> UserProfile {
        UserProfile {
            full_name: full.into(),
            nickname: nick.into(),
            email: "ana@example.com".into(),
            photo_url: photo.map(String::from),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn profile_wire_format() {
        let json = serde_json::to_value(profile("Ana Lima", "ana", None)).unwrap();
        assert_eq!(json["fullName"], "Ana Lima");
        assert_eq!(json["photoURL"], serde_json::Value::Null);
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn preferred_name_order() {
        assert_eq!(profile("Ana Lima", "ana", None).preferred_name(), Some("ana"));
        assert_eq!(profile("Ana Lima", "", None).preferred_name(), Some("Ana Lima"));
        assert_eq!(profile("", "", None).preferred_name(), None);
    }

    #[test]
    fn snapshot_falls_back_to_email() {
        let uid = UserId("u1".into());
        let snap = AuthorSnapshot::new(uid.clone(), "bruno@example.com", None);
        assert_eq!(snap.name, "bruno");
        assert_eq!(snap.nickname, "");
        assert_eq!(snap.photo, None);

        let p = profile("Ana Lima", "ana", Some("http://x/p"));
        let snap = AuthorSnapshot::new(uid, "ana@example.com", Some(&p));
        assert_eq!(snap.name, "Ana Lima");
        assert_eq!(snap.photo.as_deref(), Some("http://x/p"));
    }

    #[test]
    fn compose_trims_and_rejects_blank() {
        let snap = AuthorSnapshot::new(UserId("u".into()), "a@b.c", None);
        let ts = Utc::now();
        let rating = Rating::new(4).unwrap();
        assert_eq!(
            Review::compose(snap.clone(), rating, "  \n\t ", ts),
            Err(ModelError::EmptyReviewText)
        );
        let review = Review::compose(snap, rating, "  bom  ", ts).unwrap();
        assert_eq!(review.text, "bom");
    }

    #[test]
    fn sorts_newest_first() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let snap = AuthorSnapshot::new(UserId("u".into()), "a@b.c", None);
        let mk = |id: &str, offset: i64| StoredReview {
            id: RecordKey::from(id),
            review: Review::compose(
                snap.clone(),
                Rating::new(3).unwrap(),
                "ok",
                base + Duration::minutes(offset),
            )
            .unwrap(),
        };
        let mut list = vec![mk("t2", 2), mk("t1", 1), mk("t3", 3)];
        sort_newest_first(&mut list);
        let ids: Vec<_> = list.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["t3", "t2", "t1"]);
    }
}
