//! Login, registration, logout and the session menu / auth modal.

use std::sync::{Arc, Mutex};

use tracing::info;

use mural_shared::files::FileUpload;
use mural_shared::models::UserProfile;
use mural_shared::paths;
use mural_store::AuthUser;

use crate::commands::session::SessionManager;
use crate::context::AppContext;
use crate::error::ClientError;
use crate::events::{AuthPanel, ProfileCard};

/// Fields of the sign-up form. Values are stored as typed.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub full_name: String,
    pub nickname: String,
    pub email: String,
    pub password: String,
    pub photo: Option<FileUpload>,
}

pub struct AccountForms {
    ctx: Arc<AppContext>,
    menu_open: Mutex<bool>,
}

impl AccountForms {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            menu_open: Mutex::new(false),
        }
    }

    // -- Session menu and auth modal ---------------------------------------

    pub fn toggle_menu(&self) -> bool {
        let mut open = self.menu_open.lock().unwrap_or_else(|e| e.into_inner());
        *open = !*open;
        self.ctx.view.set_session_menu_open(*open);
        *open
    }

    pub fn close_menu(&self) {
        *self.menu_open.lock().unwrap_or_else(|e| e.into_inner()) = false;
        self.ctx.view.set_session_menu_open(false);
    }

    pub fn show_login(&self) {
        self.ctx.view.show_auth_panel(Some(AuthPanel::Login));
        self.close_menu();
    }

    pub fn show_register(&self) {
        self.ctx.view.show_auth_panel(Some(AuthPanel::Register));
    }

    pub fn close_auth_modal(&self) {
        self.ctx.view.show_auth_panel(None);
    }

    /// Re-read the profile and open the profile panel. Guests get nothing.
    pub async fn show_profile(&self) -> Result<Option<ProfileCard>, ClientError> {
        let Some(member) = self.ctx.session.current().member().cloned() else {
            return Ok(None);
        };

        let profile = self
            .ctx
            .reported("Erro ao carregar perfil", self.ctx.fetch_profile(&member.user.uid).await)?;

        let card = profile.map(|p| profile_card(&p, &member.user.email));
        if let Some(card) = &card {
            self.ctx.view.render_profile(card);
        }
        self.ctx.view.show_auth_panel(Some(AuthPanel::Profile));
        self.close_menu();
        Ok(card)
    }

    // -- Auth actions -------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, ClientError> {
        let result = self
            .ctx
            .backend
            .auth
            .sign_in(email, password)
            .await
            .map_err(ClientError::from);
        let user = self.ctx.reported("Erro no login", result)?;

        self.close_auth_modal();
        self.ctx.notifier.success("Login realizado com sucesso!");
        Ok(user)
    }

    pub async fn register(&self, form: RegistrationForm) -> Result<AuthUser, ClientError> {
        let user = self.ctx.reported("Erro no registro", self.create_account(form).await)?;
        // the auth transition fired before the profile existed
        SessionManager::new(self.ctx.clone()).refresh().await;

        self.close_auth_modal();
        self.ctx.notifier.success("Registro realizado com sucesso!");
        Ok(user)
    }

    // Not atomic: if a later step fails the account stays, without a profile.
    async fn create_account(&self, form: RegistrationForm) -> Result<AuthUser, ClientError> {
        let user = self
            .ctx
            .backend
            .auth
            .create_account(&form.email, &form.password)
            .await?;

        let photo_url = match &form.photo {
            Some(photo) => {
                let path = paths::profile_photo(&user.uid)?;
                self.ctx
                    .backend
                    .blobs
                    .put(&path, photo.bytes.clone(), photo.content_type.as_deref())
                    .await?;
                Some(self.ctx.backend.blobs.public_url(&path).await?)
            }
            None => None,
        };

        let profile = UserProfile {
            full_name: form.full_name,
            nickname: form.nickname,
            email: form.email,
            photo_url,
            created_at: self.ctx.clock.now(),
        };
        let path = paths::user_profile(&user.uid)?;
        self.ctx
            .backend
            .data
            .set(&path, serde_json::to_value(&profile).map_err(mural_store::BackendError::from)?)
            .await?;

        info!(uid = %user.uid, with_photo = profile.photo_url.is_some(), "account registered");
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.ctx.backend.auth.sign_out().await.map_err(ClientError::from);
        // the menu closes whatever happened
        self.close_menu();
        self.ctx.reported("Erro ao fazer logout", result)?;
        self.ctx.notifier.success("Logout realizado com sucesso!");
        Ok(())
    }
}

fn profile_card(profile: &UserProfile, email: &str) -> ProfileCard {
    ProfileCard {
        full_name: if profile.full_name.is_empty() {
            "Sem nome".to_string()
        } else {
            profile.full_name.clone()
        },
        handle: if profile.nickname.is_empty() {
            "@sem apelido".to_string()
        } else {
            format!("@{}", profile.nickname)
        },
        email: email.to_string(),
        photo_url: profile.photo_url.clone(),
    }
}
