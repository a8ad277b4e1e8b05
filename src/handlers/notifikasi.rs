//! Notification feeds.
//!
//! Customers see their own rows plus broadcasts. The admin feed holds
//! system events (new orders, uploaded proofs, stock alerts) and the
//! broadcasts admins have sent.

use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ApiError,
    handlers::common::{
        created_response, empty_as_none, map_service_error, message_response, page_request,
        paginated_response, success_response, validate_input,
    },
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct NotifikasiQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub unread_only: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BroadcastInput {
    #[validate(length(min = 1, max = 255, message = "The judul field is required"))]
    pub judul: String,
    #[validate(length(min = 1, message = "The pesan field is required"))]
    pub pesan: String,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub jumlah: u64,
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/notifikasi", get(user_list))
        .route("/notifikasi/jumlah-belum-dibaca", get(user_unread_count))
        .route("/notifikasi/baca-semua", put(user_mark_all_read))
        .route("/notifikasi/{id}/baca", put(user_mark_read))
        .with_auth()
}

/// Mounted under `/admin`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/notifikasi", get(admin_list))
        .route("/notifikasi/jumlah-belum-dibaca", get(admin_unread_count))
        .route("/notifikasi/baca-semua", put(admin_mark_all_read))
        .route("/notifikasi/broadcast", post(broadcast))
        .route("/notifikasi/{id}/baca", put(admin_mark_read))
        .route("/notifikasi/{id}", delete(admin_delete))
}

async fn user_list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NotifikasiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .notifikasi
        .user_list(user.user_id, query.unread_only.unwrap_or(false), page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page))
}

async fn user_unread_count(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let jumlah = state
        .services
        .notifikasi
        .user_unread_count(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(UnreadCount { jumlah }))
}

async fn user_mark_read(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notif = state
        .services
        .notifikasi
        .user_mark_read(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(notif))
}

async fn user_mark_all_read(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .services
        .notifikasi
        .user_mark_all_read(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response(format!(
        "{} notification(s) marked as read",
        updated
    )))
}

async fn admin_list(
    State(state): State<AppState>,
    Query(query): Query<NotifikasiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .notifikasi
        .admin_list(query.unread_only.unwrap_or(false), page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page))
}

async fn admin_unread_count(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let jumlah = state
        .services
        .notifikasi
        .admin_unread_count()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(UnreadCount { jumlah }))
}

async fn admin_mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notif = state
        .services
        .notifikasi
        .mark_read(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(notif))
}

async fn admin_mark_all_read(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .services
        .notifikasi
        .mark_all_read()
        .await
        .map_err(map_service_error)?;
    Ok(message_response(format!(
        "{} notification(s) marked as read",
        updated
    )))
}

async fn admin_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .notifikasi
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response("Notification deleted"))
}

async fn broadcast(
    State(state): State<AppState>,
    Json(payload): Json<BroadcastInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let notif = state
        .services
        .notifikasi
        .broadcast(payload.judul.trim().to_string(), payload.pesan)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(notif))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_requires_title_and_message() {
        let input = BroadcastInput {
            judul: String::new(),
            pesan: String::new(),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("judul"));
        assert!(fields.contains_key("pesan"));
    }
}
