use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{
        ChangePasswordRequest, Detail, Profile, ProfileUpdate, RegisterRequest, RegisteredUser,
        ResetPasswordConfirm, ResetPasswordRequest,
    },
    repo_types::{NewUser, Role},
    services,
};
use crate::{
    auth::{
        extractors::AuthUser,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    store::StoreError,
    validation::JsonBody,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register/", post(register))
        .route(
            "/users/me/",
            get(get_me).put(update_me).patch(update_me).delete(delete_me),
        )
        .route("/users/change-password/", put(change_password))
        .route("/users/reset-password/", post(reset_password))
        .route("/users/reset-password-confirm/", post(reset_password_confirm))
}

fn duplicate_email() -> ApiError {
    ApiError::field("email", "user with this email already exists.")
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredUser>), ApiError> {
    let payload = body.validated()?;
    let email = normalize_email(&payload.email.unwrap_or_default());

    if state.store.find_user_by_email(&email).await?.is_some() {
        warn!(%email, "register duplicate email");
        return Err(duplicate_email());
    }

    let password_hash = hash_password(&payload.password.unwrap_or_default())?;
    let user = state
        .store
        .create_user(NewUser {
            email,
            password_hash,
            first_name: payload.first_name.unwrap_or_default(),
            last_name: payload.last_name.unwrap_or_default(),
            role: Role::User,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => duplicate_email(),
            other => other.into(),
        })?;

    info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<Profile> {
    Json(user.into())
}

/// Serves both `PUT` and `PATCH`; every field is optional either way.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: JsonBody<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError> {
    let changes = body.validated()?.into();
    let updated = state
        .store
        .update_profile(user.id, changes)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    info!("profile updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    state.store.delete_user(user.id).await?;
    info!("account deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: JsonBody<ChangePasswordRequest>,
) -> Result<Json<Detail>, ApiError> {
    let payload = body.validated()?;
    let old = payload.old_password.unwrap_or_default();
    if !verify_password(&old, &user.password_hash)? {
        warn!("change password with wrong old password");
        return Err(ApiError::field("old_password", "Wrong password."));
    }

    let hash = hash_password(&payload.new_password.unwrap_or_default())?;
    state.store.set_password(user.id, &hash).await?;
    info!("password changed");
    Ok(Json(Detail {
        detail: "Password updated successfully.",
    }))
}

#[instrument(skip(state, body))]
pub async fn reset_password(
    State(state): State<AppState>,
    body: JsonBody<ResetPasswordRequest>,
) -> Result<Json<Detail>, ApiError> {
    let payload = body.validated()?;
    let email = normalize_email(&payload.email.unwrap_or_default());
    services::request_reset(&state, &email).await?;
    Ok(Json(Detail {
        detail: "If an account with this email exists, a password reset link has been sent.",
    }))
}

#[instrument(skip(state, body))]
pub async fn reset_password_confirm(
    State(state): State<AppState>,
    body: JsonBody<ResetPasswordConfirm>,
) -> Result<Json<Detail>, ApiError> {
    let payload = body.validated()?;
    services::confirm_reset(
        &state,
        payload.uid.as_deref().unwrap_or_default(),
        payload.token.as_deref().unwrap_or_default(),
        payload.new_password.as_deref().unwrap_or_default(),
    )
    .await?;
    Ok(Json(Detail {
        detail: "Password has been reset.",
    }))
}
