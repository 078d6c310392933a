use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use crate::auth::AuthUser;
use crate::dto::transfer::CsvExport;
use crate::errors::ServiceError;
use crate::services::export::CSV_CONTENT_TYPE;
use crate::ApiResponse;

/// JSON body that has already passed its `validator` rules.
///
/// Malformed bodies are a plain 400; rule violations become a 400 with the
/// offending fields listed under `errors`.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ServiceError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Like [`ValidatedJson`], but an empty body yields `T::default()`.
///
/// Action endpoints (stage start, assembly complete, ...) are commonly called
/// without any body at all.
pub struct LenientJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection: BytesRejection| ServiceError::BadRequest(rejection.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        let value: T = serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::BadRequest(format!("Invalid JSON body: {e}")))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string extractor that reports bad parameters in the error envelope.
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| ServiceError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path extractor; a non-numeric id is a 400 in the error envelope.
pub struct ValidPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| ServiceError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// 201 with the standard envelope
pub fn created<T: Serialize>(data: T, message: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::CREATED,
        Json(ApiResponse::success(data).with_message(message)),
    )
}

/// Renders an export as a downloadable attachment.
pub fn csv_attachment(export: CsvExport) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response()
}

/// Identity recorded as operator/inspector on audit-style rows.
pub fn actor(user: &AuthUser) -> Option<&str> {
    Some(user.username.as_str()).filter(|name| !name.is_empty())
}
