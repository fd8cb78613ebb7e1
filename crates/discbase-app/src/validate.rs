use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use garde::{Report, Validate};
use http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};

use crate::state::AppState;

/// Extractor wrapper running garde validation on the extracted payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct Garde<E>(pub E);

impl<E> Deref for Garde<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<E> DerefMut for Garde<E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<E: Display> Display for Garde<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<E> Garde<E> {
    /// Consumes the `Garde` and returns the validated data within.
    pub fn into_inner(self) -> E {
        self.0
    }
}

/// Field-level violations as sent to clients on validation failure.
#[derive(Debug, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&Report> for ValidationErrors {
    fn from(report: &Report) -> Self {
        let errors = report
            .iter()
            .map(|(path, error)| FieldError {
                field: path.to_string(),
                message: error.to_string(),
            })
            .collect();
        ValidationErrors { errors }
    }
}

#[derive(Debug)]
pub enum ValidationRejection<V, E> {
    /// `Valid` variant captures errors related to the validation logic.
    Valid(V),
    /// `Inner` variant represents potential errors that might occur within the inner extractor.
    Inner(E),
}

impl<V: Display, E: Display> Display for ValidationRejection<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationRejection::Valid(errors) => write!(f, "{errors}"),
            ValidationRejection::Inner(error) => write!(f, "{error}"),
        }
    }
}

impl<V: Error + 'static, E: Error + 'static> Error for ValidationRejection<V, E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ValidationRejection::Valid(ve) => Some(ve),
            ValidationRejection::Inner(e) => Some(e),
        }
    }
}

impl<E: IntoResponse> IntoResponse for ValidationRejection<Report, E> {
    fn into_response(self) -> Response {
        match self {
            ValidationRejection::Valid(report) => (
                StatusCode::BAD_REQUEST,
                axum::Json(ValidationErrors::from(&report)),
            )
                .into_response(),
            ValidationRejection::Inner(e) => {
                // malformed payloads surface as 400, the client contract of this API
                let mut response = e.into_response();
                if response.status().is_client_error() {
                    *response.status_mut() = StatusCode::BAD_REQUEST;
                }
                response
            }
        }
    }
}

/// `GardeRejection` is returned when the `Garde` extractor fails.
pub type GardeRejection<E> = ValidationRejection<Report, E>;

impl<E> From<Report> for GardeRejection<E> {
    fn from(value: Report) -> Self {
        Self::Valid(value)
    }
}

impl<T> FromRequest<AppState> for Garde<Json<T>>
where
    T: DeserializeOwned + Validate<Context = ()>,
{
    type Rejection = GardeRejection<JsonRejection>;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(GardeRejection::Inner)?;

        payload.validate()?;
        Ok(Garde(Json(payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, garde::Validate)]
    struct Payload {
        #[garde(length(min = 1, max = 3))]
        name: String,
    }

    #[test]
    fn test_report_to_field_errors() {
        let report = Payload {
            name: String::new(),
        }
        .validate()
        .unwrap_err();
        let errors = ValidationErrors::from(&report);
        assert_eq!(errors.errors.len(), 1);
        assert_eq!(errors.errors[0].field, "name");
        assert!(!errors.errors[0].message.is_empty());
    }
}
