use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::{ads::repo_types::Ad, error::ApiError, state::AppState, validation::parse_id};

/// Parent ad of a nested review route, resolved once per request.
///
/// Declared before `AuthUser` in handler signatures, so an unknown ad is a
/// 404 no matter who is asking.
pub struct AdScope(pub Ad);

#[async_trait]
impl FromRequestParts<AppState> for AdScope {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let not_found = || ApiError::NotFound("No Ad matches the given query.".into());

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| not_found())?;
        let raw = params.get("ad_id").ok_or_else(not_found)?;
        let ad_id = parse_id(raw, "Ad")?;

        let ad = state.store.find_ad(ad_id).await?.ok_or_else(not_found)?;
        Ok(AdScope(ad))
    }
}
