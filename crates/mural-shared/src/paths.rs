//! Typed addresses for records and blobs.
//!
//! Record paths follow the realtime-database rules: slash separated,
//! non-empty segments, none of `. # $ [ ]`. Blob paths only forbid empty,
//! `.` and `..` segments and backslashes.

use serde::{Deserialize, Serialize};

use crate::constants::{
    GALLERY_BLOB_DIR, GALLERY_PATH, PROFILE_PHOTOS_DIR, REVIEWS_PATH, USERS_PATH,
    VIDEO_BLOB_PATH, VIDEO_RECORD_PATH,
};
use crate::error::ModelError;
use crate::types::{RecordKey, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordPath(Vec<String>);

impl RecordPath {
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let segments = raw
            .trim_matches('/')
            .split('/')
            .map(|s| validate_record_segment(raw, s).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(segments))
    }

    pub fn child(&self, segment: &str) -> Result<Self, ModelError> {
        validate_record_segment(segment, segment)?;
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Last segment, i.e. the record's key under its parent.
    pub fn key(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn is_ancestor_or_self_of(&self, other: &RecordPath) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// True when a write at one path changes what is visible at the other.
    pub fn overlaps(&self, other: &RecordPath) -> bool {
        self.is_ancestor_or_self_of(other) || other.is_ancestor_or_self_of(self)
    }
}

impl std::fmt::Display for RecordPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

fn validate_record_segment<'a>(raw: &str, segment: &'a str) -> Result<&'a str, ModelError> {
    if segment.is_empty() || segment.contains(['.', '#', '$', '[', ']', '/']) {
        return Err(ModelError::InvalidPath(raw.to_string()));
    }
    Ok(segment)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlobPath(String);

impl BlobPath {
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let trimmed = raw.trim_matches('/');
        let bad = trimmed.is_empty()
            || trimmed.contains('\\')
            || trimmed
                .split('/')
                .any(|s| s.is_empty() || s == "." || s == "..");
        if bad {
            return Err(ModelError::InvalidPath(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl std::fmt::Display for BlobPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Well-known locations
// ---------------------------------------------------------------------------

pub fn users() -> RecordPath {
    RecordPath(vec![USERS_PATH.to_string()])
}

pub fn user_profile(uid: &UserId) -> Result<RecordPath, ModelError> {
    users().child(uid.as_str())
}

pub fn reviews() -> RecordPath {
    RecordPath(vec![REVIEWS_PATH.to_string()])
}

pub fn review(key: &RecordKey) -> Result<RecordPath, ModelError> {
    reviews().child(key.as_str())
}

pub fn video_record() -> RecordPath {
    RecordPath(VIDEO_RECORD_PATH.split('/').map(str::to_string).collect())
}

pub fn gallery() -> RecordPath {
    RecordPath(GALLERY_PATH.split('/').map(str::to_string).collect())
}

pub fn profile_photo(uid: &UserId) -> Result<BlobPath, ModelError> {
    BlobPath::parse(&format!("{PROFILE_PHOTOS_DIR}/{uid}"))
}

pub fn video_blob() -> BlobPath {
    BlobPath(VIDEO_BLOB_PATH.to_string())
}

/// `gallery/{prefix}_{name}`; `name` must already be a single segment.
pub fn gallery_blob(prefix: i64, name: &str) -> Result<BlobPath, ModelError> {
    BlobPath::parse(&format!("{GALLERY_BLOB_DIR}/{prefix}_{name}"))
}
