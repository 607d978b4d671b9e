use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{invalid_page, last_page, AdPatch, AdQuery, AdWrite, Page, PAGE_SIZE},
    repo_types::{Ad, AdChanges},
};
use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    permissions::{author_or_admin, authorize},
    state::AppState,
    users::repo_types::User,
    validation::{parse_id, JsonBody},
};

pub fn ad_routes() -> Router<AppState> {
    Router::new()
        .route("/ads/", get(list_ads).post(create_ad))
        .route(
            "/ads/:ad_id/",
            get(get_ad).put(update_ad).patch(patch_ad).delete(delete_ad),
        )
}

fn ad_not_found() -> ApiError {
    ApiError::NotFound("No Ad matches the given query.".into())
}

async fn load_ad(state: &AppState, raw_id: &str) -> Result<Ad, ApiError> {
    let id = parse_id(raw_id, "Ad")?;
    state.store.find_ad(id).await?.ok_or_else(ad_not_found)
}

#[instrument(skip(state))]
pub async fn list_ads(
    State(state): State<AppState>,
    Query(q): Query<AdQuery>,
) -> Result<Json<Page<Ad>>, ApiError> {
    let page = q.page_number()?;
    let search = q.search_term();

    let count = state.store.count_ads(search).await?;
    let last = last_page(count);
    if page > last {
        return Err(invalid_page());
    }

    let results = state
        .store
        .list_ads(search, PAGE_SIZE, (page - 1) * PAGE_SIZE)
        .await?;

    Ok(Json(Page {
        count,
        next: (page < last).then_some(page + 1),
        previous: (page > 1).then_some(page - 1),
        results,
    }))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_ad(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: JsonBody<AdWrite>,
) -> Result<(StatusCode, Json<Ad>), ApiError> {
    let payload = body.validated()?;
    let ad = state.store.create_ad(user.id, payload.into_new()).await?;
    info!(ad_id = %ad.id, "ad created");
    Ok((StatusCode::CREATED, Json(ad)))
}

#[instrument(skip(state, _user))]
pub async fn get_ad(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Ad>, ApiError> {
    Ok(Json(load_ad(&state, &id).await?))
}

async fn apply_update(
    state: &AppState,
    user: &User,
    raw_id: &str,
    changes: impl FnOnce() -> Result<AdChanges, ApiError>,
) -> Result<Json<Ad>, ApiError> {
    let ad = load_ad(state, raw_id).await?;
    authorize(&author_or_admin(), user, &ad)?;
    let changes = changes()?;
    let updated = state
        .store
        .update_ad(ad.id, changes)
        .await?
        .ok_or_else(ad_not_found)?;
    info!(ad_id = %updated.id, user_id = %user.id, "ad updated");
    Ok(Json(updated))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_ad(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    body: JsonBody<AdWrite>,
) -> Result<Json<Ad>, ApiError> {
    apply_update(&state, &user, &id, || Ok(body.validated()?.into())).await
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn patch_ad(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    body: JsonBody<AdPatch>,
) -> Result<Json<Ad>, ApiError> {
    apply_update(&state, &user, &id, || Ok(body.validated()?.into())).await
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_ad(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let ad = load_ad(&state, &id).await?;
    authorize(&author_or_admin(), &user, &ad)?;
    state.store.delete_ad(ad.id).await?;
    info!(ad_id = %ad.id, "ad deleted");
    Ok(StatusCode::NO_CONTENT)
}
