use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{error::ApiError, state::AppState, users::repo_types::User};

/// The authenticated requester, loaded from the bearer access token.
pub struct AuthUser(pub User);

fn invalid_token() -> ApiError {
    ApiError::Unauthorized("Given token not valid for any token type".into())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Authentication credentials were not provided.".into())
            })?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(invalid_token)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify_access(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            invalid_token()
        })?;

        let user = state
            .store
            .find_user(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token for missing or inactive user");
                ApiError::Unauthorized("User not found".into())
            })?;

        Ok(AuthUser(user))
    }
}
