//! Likes, ratings and favourites.
//!
//! Listing feedback is public while posting it needs a customer token; both
//! share the path, so the post handler authenticates through its `AuthUser`
//! extractor rather than a router layer.

use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ApiError,
    handlers::common::{map_service_error, success_response, validate_input},
    services::interaksi::FeedbackInput,
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/barang/{id}/feedback", get(list_feedback).post(give_feedback))
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/barang/{id}/like", post(toggle_like))
        .route("/favorit", get(favorites))
        .with_auth()
}

async fn list_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = state
        .services
        .interaksi
        .list_feedback(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(feedback))
}

async fn give_feedback(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FeedbackInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let result = state
        .services
        .interaksi
        .give_feedback(user.user_id, id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(result))
}

async fn toggle_like(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .services
        .interaksi
        .toggle_like(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(result))
}

async fn favorites(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .interaksi
        .favorites(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}
