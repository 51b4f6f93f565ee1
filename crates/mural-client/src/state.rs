//! Session state shared across all commands.
//!
//! The [`SessionHandle`] wraps a `watch` channel. The session manager is the
//! only writer, and every other component reads the current value or
//! subscribes to changes.

use std::sync::Arc;

use tokio::sync::watch;

use mural_shared::models::{email_local_part, UserProfile};
use mural_store::AuthUser;

use crate::policy::Role;

/// A signed-in account as the rest of the client sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Identity reported by the auth service.
    pub user: AuthUser,

    /// Resolved once, when the auth state changed.
    pub role: Role,

    /// The stored profile. `None` when it is missing or could not be read.
    pub profile: Option<UserProfile>,
}

impl Member {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Nickname, full name, "Usuário" when the profile has neither, or the
    /// email local-part when there is no profile at all.
    pub fn display_name(&self) -> String {
        match &self.profile {
            Some(profile) => profile.preferred_name().unwrap_or("Usuário").to_string(),
            None => email_local_part(&self.user.email).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Guest,
    Member(Member),
}

impl Session {
    pub fn member(&self) -> Option<&Member> {
        match self {
            Self::Member(m) => Some(m),
            Self::Guest => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.member().is_some_and(Member::is_admin)
    }
}

#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: Arc<watch::Sender<Session>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Session::Guest);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Resolve once the session satisfies `pred`.
    pub async fn wait_for(&self, pred: impl FnMut(&Session) -> bool) -> Session {
        let mut rx = self.subscribe();
        // the sender lives in `self`, so the channel cannot close here
        let session = match rx.wait_for(pred).await {
            Ok(session) => session.clone(),
            Err(_) => self.current(),
        };
        session
    }

    pub(crate) fn publish(&self, session: Session) {
        self.tx.send_replace(session);
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mural_shared::types::UserId;

    fn member(profile: Option<UserProfile>) -> Member {
        Member {
            user: AuthUser {
                uid: UserId("u1".into()),
                email: "carla.souza@example.com".into(),
            },
            role: Role::Member,
            profile,
        }
    }

    fn profile(full: &str, nick: &str) -> UserProfile {
        UserProfile {
            full_name: full.into(),
            nickname: nick.into(),
            email: "carla.souza@example.com".into(),
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn display_name_fallbacks() {
        assert_eq!(member(None).display_name(), "carla.souza");
        assert_eq!(member(Some(profile("Carla Souza", "carla"))).display_name(), "carla");
        assert_eq!(member(Some(profile("Carla Souza", ""))).display_name(), "Carla Souza");
        assert_eq!(member(Some(profile("", ""))).display_name(), "Usuário");
    }

    #[tokio::test]
    async fn wait_for_sees_published_value() {
        let handle = SessionHandle::new();
        assert_eq!(handle.current(), Session::Guest);

        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.wait_for(|s| s.member().is_some()).await })
        };
        handle.publish(Session::Member(member(None)));

        let seen = waiter.await.unwrap();
        assert_eq!(seen.member().unwrap().user.uid.as_str(), "u1");
        assert!(!seen.is_admin());
    }
}
