//! Who gets admin controls.
//!
//! Gating here only drives what the client shows and attempts. Whether the
//! backend enforces the same rule is up to its own access configuration.

use serde::Serialize;

use mural_store::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

/// Resolves a role once per sign-in.
pub trait AuthorizationPolicy: Send + Sync {
    fn resolve(&self, user: &AuthUser) -> Role;
}

/// Exactly one admin, matched by case-sensitive email equality.
#[derive(Debug, Clone)]
pub struct AdminEmailPolicy {
    admin_email: String,
}

impl AdminEmailPolicy {
    pub fn new(admin_email: impl Into<String>) -> Self {
        Self {
            admin_email: admin_email.into(),
        }
    }
}

impl AuthorizationPolicy for AdminEmailPolicy {
    fn resolve(&self, user: &AuthUser) -> Role {
        if user.email == self.admin_email {
            Role::Admin
        } else {
            Role::Member
        }
    }
}
