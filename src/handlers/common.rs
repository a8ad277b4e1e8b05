use crate::{
    config::AppConfig,
    errors::{ApiError, ServiceError},
    services::PageRequest,
    ApiResponse, PaginatedResponse,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Envelope without data, used by deletes and bulk updates
pub fn message_response(message: impl Into<String>) -> Response {
    (StatusCode::OK, Json(ApiResponse::<()>::message(message))).into_response()
}

/// One page of a list wrapped in the envelope
pub fn paginated_response<T: Serialize>(items: Vec<T>, total: u64, page: PageRequest) -> Response {
    success_response(PaginatedResponse::new(items, total, page))
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input.validate().map_err(ApiError::from)
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Builds a page window from raw query values, clamped to the configured size.
pub fn page_request(config: &AppConfig, page: Option<u64>, limit: Option<u64>) -> PageRequest {
    PageRequest::new(page.unwrap_or(1), config.page_size(limit))
}

/// Treats a blank query value (`?kategori=`) as absent.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
