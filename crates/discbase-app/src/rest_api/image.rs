use std::future::Future;

use axum::{
    Json, RequestPartsExt as _, Router,
    body::Body,
    extract::{FromRequestParts, Multipart, Path, State},
    response::IntoResponse,
    routing::get,
};
use discbase_dal::disc::DiscRepository;
use discbase_store::{StorePrefix, ValidPath, file_ext, image_path};
use http::{HeaderMap, StatusCode, request::Parts};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    validate::Garde,
};

const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

#[derive(Debug, Serialize)]
pub struct UploadResult {
    #[serde(rename = "imagePath")]
    pub image_path: String,
}

/// Attaches an uploaded image to a disc.
///
/// The bytes are staged to a temp file first, the record is pointed at the
/// new path, and only then is the file renamed into place; a failed record
/// update leaves nothing behind. The previously referenced file is released
/// once the swap is done.
pub async fn upload_image(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    repository: DiscRepository,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    // resolve the disc before touching the payload
    repository.get(id).await?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|t| t.to_ascii_lowercase())
            .ok_or_else(|| ApiError::InvalidRequest("Missing image content type".into()))?;
        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::UnsupportedMedia(content_type));
        }
        let file_name = field
            .file_name()
            .ok_or_else(|| ApiError::InvalidRequest("Missing file name".into()))?
            .to_string();
        let ext = file_ext(&file_name)
            .ok_or_else(|| ApiError::InvalidRequest("Missing file extension".into()))?;
        let data = field.bytes().await?;
        upload = Some((file_name, ext, content_type, data));
        break;
    }
    let (file_name, ext, content_type, data) =
        upload.ok_or_else(|| ApiError::InvalidRequest("No image provided".into()))?;
    if data.is_empty() {
        return Err(ApiError::InvalidRequest("No image provided".into()));
    }

    let dest_path = image_path(id, &ext)?;
    debug!(
        "Uploading image {} for disc {} to {:?}, mime {}",
        file_name, id, dest_path, content_type
    );

    let staged = state.store().stage(&data).await?;
    let route_path = format!("/{}", dest_path.as_ref());
    let previous = repository.set_image_path(id, &route_path).await?;
    let info = staged.commit(&dest_path).await?;
    debug!(
        "Stored image {:?} ({} bytes, sha256 {})",
        info.final_path, info.size, info.hash
    );

    if let Some(previous) = previous.filter(|p| p != &route_path) {
        release_image(&state, &previous).await;
    }

    Ok((
        StatusCode::OK,
        Json(UploadResult {
            image_path: route_path,
        }),
    ))
}

/// Removes the file behind a stored `/images/...` reference. Failures are
/// logged, never propagated; the catalog record is the source of truth.
pub(crate) async fn release_image(state: &AppState, route_path: &str) {
    let relative = route_path.strip_prefix('/').unwrap_or(route_path);
    match ValidPath::new(relative) {
        Ok(path) => {
            if let Err(e) = state.store().remove(&path).await {
                warn!("Could not delete image file {route_path}: {e}");
            }
        }
        Err(e) => warn!("Stored image path {route_path} is not valid: {e}"),
    }
}

#[derive(Debug, serde::Deserialize, Serialize, garde::Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImagePositionRequest {
    #[garde(range(min = 0.0, max = 100.0))]
    pub image_position_x: f64,
    #[garde(range(min = 0.0, max = 100.0))]
    pub image_position_y: f64,
    #[garde(range(min = 50.0, max = 200.0))]
    pub image_zoom: f64,
}

pub async fn update_position(
    Path(id): Path<i64>,
    repository: DiscRepository,
    Garde(Json(payload)): Garde<Json<ImagePositionRequest>>,
) -> ApiResult<impl IntoResponse> {
    repository
        .update_image_position(
            id,
            payload.image_position_x,
            payload.image_position_y,
            payload.image_zoom,
        )
        .await?;

    Ok((StatusCode::NO_CONTENT, ()))
}

/// Path extractor rejecting traversal attempts before the store is touched.
pub struct ImagePath(pub ValidPath);

impl<S: Send + Sync> FromRequestParts<S> for ImagePath {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let Path(path) = parts.extract::<Path<String>>().await?;
            Ok(ImagePath(ValidPath::new(path)?))
        }
    }
}

pub async fn serve_image(
    State(state): State<AppState>,
    path: ImagePath,
) -> ApiResult<impl IntoResponse> {
    let path = path.0.with_prefix(StorePrefix::Images);
    let store = state.store();
    let data = store.load_data(&path).await?;
    let size = store.size(&path).await?;
    let body = Body::from_stream(data);

    let mime = file_ext(path.as_ref())
        .and_then(|ext| new_mime_guess::from_ext(&ext).first().map(|m| m.to_string()))
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        mime.parse().unwrap(), // safe as MIME is ASCII
    );
    headers.insert(
        http::header::CONTENT_LENGTH,
        size.to_string().parse().unwrap(), // safe - number is ASCII
    );

    Ok((StatusCode::OK, headers, body))
}

/// Public routes serving stored images.
pub fn images_router() -> Router<AppState> {
    Router::new().route("/images/{*path}", get(serve_image))
}
