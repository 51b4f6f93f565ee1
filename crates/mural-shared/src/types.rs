use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_THEME_COLOR, MAX_RATING, MIN_RATING};
use crate::error::ModelError;

/// Identifier the auth service assigns to an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Push keys are UUIDv7 so lexical order follows creation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecordKey(pub String);

impl RecordKey {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A star rating in `1..=5`. The UI uses 0 for "nothing selected", which
/// never makes it into a `Rating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Result<Self, ModelError> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ModelError::InvalidRating(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Filled and empty star counts, e.g. `(3, 2)` for a 3-star rating.
    pub fn stars(self) -> (u8, u8) {
        (self.0, MAX_RATING - self.0)
    }
}

impl TryFrom<u8> for Rating {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> u8 {
        r.0
    }
}

/// A `#rrggbb` colour, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThemeColor(String);

impl ThemeColor {
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let raw = raw.trim();
        match raw.strip_prefix('#') {
            Some(hex) if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
                Ok(Self(raw.to_ascii_lowercase()))
            }
            _ => Err(ModelError::InvalidColor(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ThemeColor {
    fn default() -> Self {
        Self(DEFAULT_THEME_COLOR.to_string())
    }
}

impl TryFrom<String> for ThemeColor {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ThemeColor> for String {
    fn from(c: ThemeColor) -> String {
        c.0
    }
}

impl std::fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a transient notification. Selects a colour token only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    pub fn color_token(self) -> &'static str {
        match self {
            Self::Success => "var(--success)",
            Self::Error => "var(--danger)",
            Self::Info => "var(--primary-color)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        for r in 1..=5 {
            assert_eq!(Rating::new(r).unwrap().get(), r);
        }
    }

    #[test]
    fn rating_rejected_when_deserialized_out_of_range() {
        assert!(serde_json::from_str::<Rating>("0").is_err());
        assert!(serde_json::from_str::<Rating>("9").is_err());
        assert_eq!(serde_json::from_str::<Rating>("4").unwrap().get(), 4);
    }

    #[test]
    fn stars_split() {
        assert_eq!(Rating::new(3).unwrap().stars(), (3, 2));
        assert_eq!(Rating::new(5).unwrap().stars(), (5, 0));
    }

    #[test]
    fn theme_colors() {
        assert_eq!(ThemeColor::parse("#FF3B30").unwrap().as_str(), "#ff3b30");
        for bad in ["ff3b30", "#fff", "#12345g", "", "#1234567"] {
            assert_eq!(
                ThemeColor::parse(bad),
                Err(ModelError::InvalidColor(bad.to_string()))
            );
        }
    }

    #[test]
    fn push_keys_sort_in_creation_order() {
        let a = RecordKey::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = RecordKey::generate();
        assert!(a < b);
    }
}
