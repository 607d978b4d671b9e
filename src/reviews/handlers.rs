use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{
    dto::{ReviewPatch, ReviewWrite},
    extractors::AdScope,
    repo_types::Review,
};
use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    permissions::{author_or_admin, authorize},
    state::AppState,
    users::repo_types::User,
    validation::{parse_id, trimmed, JsonBody},
};

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/ads/:ad_id/reviews/", get(list_reviews).post(create_review))
        .route(
            "/ads/:ad_id/reviews/:id/",
            get(get_review)
                .put(update_review)
                .patch(patch_review)
                .delete(delete_review),
        )
}

#[derive(Debug, Deserialize)]
pub struct ReviewPath {
    id: String,
}

async fn load_review(state: &AppState, ad: &AdScope, path: &ReviewPath) -> Result<Review, ApiError> {
    let id = parse_id(&path.id, "Review")?;
    state
        .store
        .find_review(ad.0.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No Review matches the given query.".into()))
}

#[instrument(skip_all, fields(ad_id = %ad.id))]
pub async fn list_reviews(
    State(state): State<AppState>,
    AdScope(ad): AdScope,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<Review>>, ApiError> {
    Ok(Json(state.store.list_reviews(ad.id).await?))
}

#[instrument(skip_all, fields(ad_id = %ad.id, user_id = %user.id))]
pub async fn create_review(
    State(state): State<AppState>,
    AdScope(ad): AdScope,
    AuthUser(user): AuthUser,
    body: JsonBody<ReviewWrite>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let payload = body.validated()?;
    let text = trimmed(payload.text.unwrap_or_default());
    let review = state.store.create_review(ad.id, user.id, &text).await?;
    info!(review_id = %review.id, "review created");
    Ok((StatusCode::CREATED, Json(review)))
}

#[instrument(skip_all)]
pub async fn get_review(
    State(state): State<AppState>,
    ad: AdScope,
    AuthUser(_user): AuthUser,
    Path(path): Path<ReviewPath>,
) -> Result<Json<Review>, ApiError> {
    Ok(Json(load_review(&state, &ad, &path).await?))
}

async fn apply_update(
    state: &AppState,
    ad: &AdScope,
    user: &User,
    path: &ReviewPath,
    text: impl FnOnce() -> Result<Option<String>, ApiError>,
) -> Result<Json<Review>, ApiError> {
    let review = load_review(state, ad, path).await?;
    authorize(&author_or_admin(), user, &review)?;
    let updated = match text()? {
        Some(text) => state
            .store
            .update_review(review.id, &text)
            .await?
            .ok_or_else(|| ApiError::NotFound("No Review matches the given query.".into()))?,
        None => review,
    };
    info!(review_id = %updated.id, user_id = %user.id, "review updated");
    Ok(Json(updated))
}

#[instrument(skip_all)]
pub async fn update_review(
    State(state): State<AppState>,
    ad: AdScope,
    AuthUser(user): AuthUser,
    Path(path): Path<ReviewPath>,
    body: JsonBody<ReviewWrite>,
) -> Result<Json<Review>, ApiError> {
    apply_update(&state, &ad, &user, &path, || Ok(body.validated()?.text.map(trimmed))).await
}

#[instrument(skip_all)]
pub async fn patch_review(
    State(state): State<AppState>,
    ad: AdScope,
    AuthUser(user): AuthUser,
    Path(path): Path<ReviewPath>,
    body: JsonBody<ReviewPatch>,
) -> Result<Json<Review>, ApiError> {
    apply_update(&state, &ad, &user, &path, || Ok(body.validated()?.text.map(trimmed))).await
}

#[instrument(skip_all)]
pub async fn delete_review(
    State(state): State<AppState>,
    ad: AdScope,
    AuthUser(user): AuthUser,
    Path(path): Path<ReviewPath>,
) -> Result<StatusCode, ApiError> {
    let review = load_review(&state, &ad, &path).await?;
    authorize(&author_or_admin(), &user, &review)?;
    state.store.delete_review(review.id).await?;
    info!(review_id = %review.id, user_id = %user.id, "review deleted");
    Ok(StatusCode::NO_CONTENT)
}
