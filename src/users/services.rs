//! Password reset flow.
//!
//! A reset link carries the user id (base64url) and a short-lived JWT bound to
//! a fingerprint of the current password hash. Changing the password, by any
//! route, invalidates every outstanding link.

use axum::extract::FromRef;
use base64ct::{Base64UrlUnpadded, Encoding};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        jwt::JwtKeys,
        password::{fingerprint, hash_password},
    },
    error::ApiError,
    state::AppState,
};

pub const RESET_SUBJECT: &str = "Password Reset";

pub fn encode_uid(id: Uuid) -> String {
    Base64UrlUnpadded::encode_string(id.to_string().as_bytes())
}

pub fn decode_uid(raw: &str) -> Option<Uuid> {
    let bytes = Base64UrlUnpadded::decode_vec(raw.trim_end_matches('=')).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    Uuid::parse_str(&text).ok()
}

pub fn reset_link(base_url: &str, id: Uuid, token: &str) -> String {
    format!("{base_url}?uid={}&token={token}", encode_uid(id))
}

/// Mails a reset link if `email` belongs to an active account. Unknown
/// addresses are a silent no-op.
#[instrument(skip(state))]
pub async fn request_reset(state: &AppState, email: &str) -> Result<(), ApiError> {
    let user = match state.store.find_user_by_email(email).await? {
        Some(u) if u.is_active => u,
        _ => {
            info!("reset requested for unknown or inactive account");
            return Ok(());
        }
    };

    let token = JwtKeys::from_ref(state).sign_reset(user.id, fingerprint(&user.password_hash))?;
    let link = reset_link(&state.config.password_reset_url, user.id, &token);
    let body = format!("To reset your password follow the link: {link}");

    state.mailer.send(&user.email, RESET_SUBJECT, &body).await?;
    info!(user_id = %user.id, "reset link sent");
    Ok(())
}

fn invalid_link() -> ApiError {
    ApiError::BadRequest("Invalid URL".into())
}

#[instrument(skip(state, token, new_password))]
pub async fn confirm_reset(
    state: &AppState,
    uid: &str,
    token: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    let id = decode_uid(uid).ok_or_else(invalid_link)?;
    let claims = JwtKeys::from_ref(state).verify_reset(token).map_err(|e| {
        warn!(error = %e, "reset token rejected");
        invalid_link()
    })?;
    if claims.sub != id {
        warn!(%id, "reset token issued for another user");
        return Err(invalid_link());
    }

    let user = match state.store.find_user(id).await? {
        Some(u) if u.is_active => u,
        _ => return Err(invalid_link()),
    };
    if claims.fp.as_deref() != Some(fingerprint(&user.password_hash).as_str()) {
        warn!(user_id = %user.id, "reset token already used");
        return Err(invalid_link());
    }

    let hash = hash_password(new_password)?;
    state.store.set_password(user.id, &hash).await?;
    info!(user_id = %user.id, "password reset");
    Ok(())
}
