use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AccessToken, RefreshRequest, TokenPair, TokenRequest},
        jwt::JwtKeys,
        password::verify_password,
    },
    error::ApiError,
    state::AppState,
    validation::JsonBody,
};

pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/users/token/", post(obtain_token))
        .route("/users/token/refresh/", post(refresh_token))
}

fn bad_credentials() -> ApiError {
    ApiError::Unauthorized("No active account found with the given credentials".into())
}

#[instrument(skip(state, body))]
pub async fn obtain_token(
    State(state): State<AppState>,
    body: JsonBody<TokenRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let payload = body.validated()?;
    let email = payload.email.unwrap_or_default().trim().to_lowercase();
    let password = payload.password.unwrap_or_default();

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(bad_credentials());
    };

    if !verify_password(&password, &user.password_hash)? || !user.is_active {
        warn!(%email, user_id = %user.id, "login rejected");
        return Err(bad_credentials());
    }

    let keys = JwtKeys::from_ref(&state);
    let pair = TokenPair {
        access: keys.sign_access(user.id)?,
        refresh: keys.sign_refresh(user.id)?,
    };

    info!(user_id = %user.id, "user logged in");
    Ok(Json(pair))
}

#[instrument(skip(state, body))]
pub async fn refresh_token(
    State(state): State<AppState>,
    body: JsonBody<RefreshRequest>,
) -> Result<Json<AccessToken>, ApiError> {
    let payload = body.validated()?;
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(payload.refresh.as_deref().unwrap_or_default())
        .map_err(|e| {
            warn!(error = %e, "refresh rejected");
            ApiError::Unauthorized("Token is invalid or expired".into())
        })?;

    let access = keys.sign_access(claims.sub)?;
    Ok(Json(AccessToken { access }))
}
