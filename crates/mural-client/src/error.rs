use thiserror::Error;

use mural_shared::error::ModelError;
use mural_store::BackendError;

/// Failures a command handler can run into.
///
/// `Display` is the text shown to the user; see
/// [`AppContext::report`](crate::context::AppContext::report).
#[derive(Error, Debug)]
pub enum ClientError {
    /// Input rejected before any backend call.
    #[error("{0}")]
    Validation(String),

    /// The current session may not perform the action.
    #[error("{0}")]
    Forbidden(String),

    /// A backend call failed. The message is passed through untouched.
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// The three outcomes users can observe when something goes wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Backend,
    Unexpected,
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Forbidden(_) => ErrorKind::Validation,
            Self::Backend(_) => ErrorKind::Backend,
            Self::Model(ModelError::InvalidPath(_)) => ErrorKind::Unexpected,
            Self::Model(_) => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy() {
        assert_eq!(ClientError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(ClientError::forbidden("x").kind(), ErrorKind::Validation);
        assert_eq!(
            ClientError::from(BackendError::Storage("disk".into())).kind(),
            ErrorKind::Backend
        );
        assert_eq!(
            ClientError::from(ModelError::InvalidPath("a/../b".into())).kind(),
            ErrorKind::Unexpected
        );
        assert_eq!(
            ClientError::from(ModelError::InvalidRating(0)).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn backend_message_is_verbatim() {
        let err = ClientError::from(BackendError::auth(
            "auth/invalid-credential",
            "The supplied auth credential is incorrect.",
        ));
        assert_eq!(
            err.to_string(),
            "The supplied auth credential is incorrect. (auth/invalid-credential)"
        );
    }
}
