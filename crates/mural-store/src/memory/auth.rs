use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use mural_shared::constants::MIN_PASSWORD_LEN;
use mural_shared::types::UserId;

use super::{Account, MemoryBackend, Operation};
use crate::backend::{AuthService, AuthUser};
use crate::error::{BackendError, Result};

fn digest(uid: &UserId, password: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(uid.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize().as_bytes())
}

fn validate_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(BackendError::auth(
            "auth/invalid-email",
            "The email address is badly formatted.",
        ));
    }
    Ok(())
}

#[async_trait]
impl AuthService for MemoryBackend {
    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser> {
        let user = {
            let mut state = self.lock();
            state.record(Operation::CreateAccount {
                email: email.to_string(),
            })?;
            validate_email(email)?;
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(BackendError::auth(
                    "auth/weak-password",
                    "Password should be at least 6 characters.",
                ));
            }
            let key = email.to_lowercase();
            if state.accounts.contains_key(&key) {
                return Err(BackendError::auth(
                    "auth/email-already-in-use",
                    "The email address is already in use by another account.",
                ));
            }
            let user = AuthUser {
                uid: UserId::new(),
                email: email.to_string(),
            };
            let digest = digest(&user.uid, password);
            state.accounts.insert(
                key,
                Account {
                    user: user.clone(),
                    digest,
                },
            );
            user
        };

        info!(uid = %user.uid, "account created");
        self.current_user().send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let user = {
            let mut state = self.lock();
            state.record(Operation::SignIn {
                email: email.to_string(),
            })?;
            validate_email(email)?;
            match state.accounts.get(&email.to_lowercase()) {
                Some(account) if account.digest == digest(&account.user.uid, password) => {
                    account.user.clone()
                }
                _ => {
                    return Err(BackendError::auth(
                        "auth/invalid-credential",
                        "The supplied auth credential is incorrect.",
                    ))
                }
            }
        };

        info!(uid = %user.uid, "signed in");
        self.current_user().send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.lock().record(Operation::SignOut)?;
        self.current_user().send_replace(None);
        info!("signed out");
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current_user().subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_sign_in() {
        let auth = MemoryBackend::new();
        let created = auth.create_account("ana@example.com", "segredo").await.unwrap();
        auth.sign_out().await.unwrap();

        let signed = auth.sign_in("ana@example.com", "segredo").await.unwrap();
        assert_eq!(created, signed);
    }

    #[tokio::test]
    async fn error_codes() {
        let auth = MemoryBackend::new();
        let code = |e: BackendError| match e {
            BackendError::Auth { code, .. } => code,
            other => panic!("unexpected {other:?}"),
        };

        assert_eq!(
            code(auth.create_account("nope", "segredo").await.unwrap_err()),
            "auth/invalid-email"
        );
        assert_eq!(
            code(auth.create_account("ana@example.com", "123").await.unwrap_err()),
            "auth/weak-password"
        );
        auth.create_account("ana@example.com", "segredo").await.unwrap();
        assert_eq!(
            code(auth.create_account("ANA@example.com", "segredo").await.unwrap_err()),
            "auth/email-already-in-use"
        );
        assert_eq!(
            code(auth.sign_in("ana@example.com", "errado").await.unwrap_err()),
            "auth/invalid-credential"
        );
    }

    #[tokio::test]
    async fn watch_tracks_current_user() {
        let auth = MemoryBackend::new();
        let mut rx = auth.subscribe();
        assert!(rx.borrow_and_update().is_none());

        auth.create_account("ana@example.com", "segredo").await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|u| u.email.clone()),
            Some("ana@example.com".to_string())
        );

        auth.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }
}
