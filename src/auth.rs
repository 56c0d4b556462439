//! Caller identity.
//!
//! Sign-in happens upstream; the auth proxy forwards the verified user as
//! `x-user-id` / `x-user-email` headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::warn;

use crate::db::profiles;
use crate::error::AppError;
use crate::models::{Profile, Role};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthenticated)?;

        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Identity::new(id, email))
    }
}

/// Loads the caller's profile and checks it has `role`.
pub async fn require_role(
    db: &SqlitePool,
    identity: &Identity,
    role: Role,
) -> Result<Profile, AppError> {
    let profile = profiles::find_profile(db, &identity.id)
        .await?
        .ok_or_else(|| AppError::Forbidden("no profile for this account".to_string()))?;

    if profile.role != role {
        warn!("{} tried a {:?}-only action as {:?}", identity.id, role, profile.role);
        return Err(AppError::Forbidden(format!("only a {:?} can do this", role).to_lowercase()));
    }

    Ok(profile)
}
