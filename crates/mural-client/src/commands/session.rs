//! Keeps the shared session in step with the auth service.

use std::sync::Arc;

use tracing::{info, warn};

use mural_store::AuthUser;

use crate::context::AppContext;
use crate::events::SessionView;
use crate::state::{Member, Session};

pub struct SessionManager {
    ctx: Arc<AppContext>,
}

impl SessionManager {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// Follow auth state until the auth service goes away.
    pub async fn run(self) {
        let mut rx = self.ctx.backend.auth.subscribe();
        loop {
            let user = rx.borrow_and_update().clone();
            self.apply(user).await;
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// Re-resolve whoever the auth service has signed in right now, e.g.
    /// once their profile has been written.
    pub async fn refresh(&self) -> Session {
        let user = self.ctx.backend.auth.subscribe().borrow().clone();
        self.apply(user).await
    }

    /// Handle one auth transition: resolve the session, publish it and
    /// render the header.
    pub async fn apply(&self, user: Option<AuthUser>) -> Session {
        let session = match user {
            Some(user) => Session::Member(self.sign_in(user).await),
            None => {
                info!("session: guest");
                Session::Guest
            }
        };

        self.ctx.session.publish(session.clone());
        self.ctx
            .view
            .render_session(&SessionView::from_session(&session));
        session
    }

    async fn sign_in(&self, user: AuthUser) -> Member {
        let role = self.ctx.policy.resolve(&user);
        let profile = match self.ctx.fetch_profile(&user.uid).await {
            Ok(profile) => profile,
            Err(e) => {
                // shown like a missing profile
                warn!(uid = %user.uid, error = %e, "profile fetch failed");
                None
            }
        };
        info!(uid = %user.uid, ?role, has_profile = profile.is_some(), "session: signed in");
        Member {
            user,
            role,
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Role;
    use crate::testing::Harness;
    use mural_shared::paths;
    use mural_store::memory::OperationKind;
    use mural_store::DataStore;
    use serde_json::json;

    #[tokio::test]
    async fn signed_in_with_profile() {
        let h = Harness::new();
        let user = h.create_account("ana@example.com").await;
        h.memory
            .set(
                &paths::user_profile(&user.uid).unwrap(),
                json!({
                    "fullName": "Ana Lima",
                    "nickname": "aninha",
                    "email": "ana@example.com",
                    "photoURL": "http://cdn/ana.png",
                    "createdAt": "2024-01-01T00:00:00.000Z"
                }),
            )
            .await
            .unwrap();

        let manager = SessionManager::new(h.ctx());
        let session = manager.apply(Some(user)).await;

        let member = session.member().unwrap();
        assert_eq!(member.role, Role::Member);
        let header = h.view.last_session().unwrap();
        assert_eq!(header.display_name, "aninha");
        assert_eq!(header.subtitle, "ana@example.com");
        assert_eq!(header.avatar_url.as_deref(), Some("http://cdn/ana.png"));
        assert!(!header.show_admin_controls);
        assert_eq!(h.ctx().session.current(), session);
    }

    #[tokio::test]
    async fn missing_profile_uses_email_local_part() {
        let h = Harness::new();
        let user = h.create_account("bruno@example.com").await;

        SessionManager::new(h.ctx()).apply(Some(user)).await;
        assert_eq!(h.view.last_session().unwrap().display_name, "bruno");
    }

    #[tokio::test]
    async fn profile_fetch_failure_degrades() {
        let h = Harness::new();
        let user = h.create_account("carla@example.com").await;
        h.memory.inject_fault(OperationKind::Get, "users/", "offline");

        let session = SessionManager::new(h.ctx()).apply(Some(user)).await;
        assert!(session.member().unwrap().profile.is_none());
        let header = h.view.last_session().unwrap();
        assert_eq!(header.display_name, "carla");
        assert!(header.signed_in);
        assert!(h.view.visible_toasts().is_empty());
    }

    #[tokio::test]
    async fn admin_gets_controls_and_guest_loses_them() {
        let h = Harness::new();
        let admin = h.create_account(Harness::ADMIN).await;
        let manager = SessionManager::new(h.ctx());

        let session = manager.apply(Some(admin)).await;
        assert!(session.is_admin());
        assert!(h.view.last_session().unwrap().show_admin_controls);

        let session = manager.apply(None).await;
        assert_eq!(session, Session::Guest);
        let header = h.view.last_session().unwrap();
        assert!(!header.show_admin_controls);
        assert!(header.show_login_button());
    }

    #[tokio::test]
    async fn run_follows_auth_changes() {
        let h = Harness::new();
        let ctx = h.ctx();
        tokio::spawn(SessionManager::new(ctx.clone()).run());

        h.create_account("davi@example.com").await;
        let session = ctx.session.wait_for(|s| s.member().is_some()).await;
        assert_eq!(session.member().unwrap().user.email, "davi@example.com");

        h.sign_out().await;
        ctx.session.wait_for(|s| *s == Session::Guest).await;
    }
}
