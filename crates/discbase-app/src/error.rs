use axum::response::{IntoResponse, Response};
use discbase_store::error::StoreError;
use http::StatusCode;
use tracing::error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Repository error: {0}")]
    Repository(#[from] discbase_dal::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid multipart request: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Invalid path: {0}")]
    Path(#[from] axum::extract::rejection::PathRejection),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_)
            | ApiError::UnsupportedMedia(_)
            | ApiError::Multipart(_)
            | ApiError::Path(_) => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Repository(discbase_dal::Error::RecordNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::InvalidPath) => StatusCode::BAD_REQUEST,
            ApiError::Repository(_) | ApiError::Store(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Internal error: {self}");
        }
        if status == StatusCode::NOT_FOUND {
            // not-found responses carry no body
            return status.into_response();
        }
        (status, self.to_string()).into_response()
    }
}
