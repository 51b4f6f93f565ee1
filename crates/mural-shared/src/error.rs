use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Review text must not be empty")]
    EmptyReviewText,

    #[error("Invalid colour: {0}")]
    InvalidColor(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}
