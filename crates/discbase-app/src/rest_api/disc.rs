use axum::{
    Json,
    extract::{DefaultBodyLimit, Path, State},
    response::IntoResponse,
    routing::{get, patch, post},
};
use discbase_dal::{
    category::DiscCategory,
    disc::{CreateDisc, DiscRepository, UpdateDisc},
};
use http::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    rest_api::image,
    state::AppState,
    validate::Garde,
};

crate::repository_from_request!(DiscRepository);

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub id: i64,
    pub name: &'static str,
}

pub async fn list(repository: DiscRepository) -> ApiResult<impl IntoResponse> {
    let discs = repository.list_all().await?;
    Ok((StatusCode::OK, Json(discs)))
}

pub async fn list_by_category(
    Path(category): Path<String>,
    repository: DiscRepository,
) -> ApiResult<impl IntoResponse> {
    let category: DiscCategory = category
        .parse()
        .map_err(|e: discbase_dal::category::UnknownCategory| {
            ApiError::InvalidRequest(e.to_string())
        })?;
    let discs = repository.list_by_category(category).await?;
    Ok((StatusCode::OK, Json(discs)))
}

/// Taxonomy listing for selection UIs, in declaration order.
pub async fn categories() -> impl IntoResponse {
    let categories: Vec<CategoryInfo> = DiscCategory::ALL
        .iter()
        .map(|c| CategoryInfo {
            id: c.id(),
            name: c.name(),
        })
        .collect();
    (StatusCode::OK, Json(categories))
}

pub async fn get_disc(
    Path(id): Path<i64>,
    repository: DiscRepository,
) -> ApiResult<impl IntoResponse> {
    let record = repository.get(id).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn create(
    State(state): State<AppState>,
    repository: DiscRepository,
    Garde(Json(payload)): Garde<Json<CreateDisc>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.create(payload).await?;
    debug!("Created disc {} ({})", record.id, record.name);
    let location = state
        .build_url(&format!("api/discs/{}", record.id))
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        [(http::header::LOCATION, location.to_string())],
        Json(record),
    ))
}

pub async fn update(
    Path(id): Path<i64>,
    repository: DiscRepository,
    Garde(Json(payload)): Garde<Json<UpdateDisc>>,
) -> ApiResult<impl IntoResponse> {
    if payload.id != id {
        return Err(ApiError::InvalidRequest(format!(
            "Id in path ({id}) does not match id in body ({})",
            payload.id
        )));
    }
    repository.update(id, payload).await?;

    Ok((StatusCode::NO_CONTENT, ()))
}

pub async fn delete_disc(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    repository: DiscRepository,
) -> ApiResult<impl IntoResponse> {
    let image_path = repository.delete(id).await?;
    if let Some(image_path) = image_path {
        // the record is gone; file cleanup is best effort
        image::release_image(&state, &image_path).await;
    }

    Ok((StatusCode::NO_CONTENT, ()))
}

pub fn router(upload_limit_mb: usize) -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list).post(create))
        .route("/categories", get(categories))
        .route("/category/{category}", get(list_by_category))
        .route("/{id}", get(get_disc).put(update).delete(delete_disc))
        .route("/{id}/image", post(image::upload_image))
        .route("/{id}/image-position", patch(image::update_position))
        .layer(DefaultBodyLimit::max(1024 * 1024 * upload_limit_mb))
}
