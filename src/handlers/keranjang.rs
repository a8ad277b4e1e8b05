use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ApiError,
    handlers::common::{created_response, map_service_error, message_response, success_response},
    services::keranjang::{AddToCartInput, UpdateCartInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use uuid::Uuid;

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/keranjang",
            get(list_keranjang).post(add_item).delete(clear_keranjang),
        )
        .route("/keranjang/{id}", put(update_item).delete(remove_item))
        .with_auth()
}

async fn list_keranjang(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .services
        .keranjang
        .list(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(view))
}

async fn add_item(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<AddToCartInput>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .keranjang
        .add(user.user_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(item))
}

async fn update_item(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartInput>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .keranjang
        .update(user.user_id, id, payload.jumlah)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(item))
}

async fn remove_item(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .keranjang
        .remove(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response("Item removed from cart"))
}

async fn clear_keranjang(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state
        .services
        .keranjang
        .clear(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response(format!("{} item(s) removed from cart", removed)))
}
