use crate::{
    entities::StatusPekerja,
    errors::ApiError,
    handlers::common::{
        created_response, empty_as_none, map_service_error, message_response, page_request,
        paginated_response, success_response, validate_input,
    },
    services::pekerja::{PekerjaFilter, PekerjaInput, SetStatusInput},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct PekerjaQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<StatusPekerja>,
    pub search: Option<String>,
}

/// Mounted under `/admin`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/pekerja", get(list_pekerja).post(create_pekerja))
        .route(
            "/pekerja/{id}",
            get(get_pekerja).put(update_pekerja).delete(delete_pekerja),
        )
        .route("/pekerja/{id}/status", put(set_status))
}

async fn list_pekerja(
    State(state): State<AppState>,
    Query(query): Query<PekerjaQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state.config, query.page, query.limit);
    let filter = PekerjaFilter {
        status: query.status,
        search: query.search,
    };
    let (items, total) = state
        .services
        .pekerja
        .list(filter, page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page))
}

async fn get_pekerja(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pekerja = state
        .services
        .pekerja
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(pekerja))
}

async fn create_pekerja(
    State(state): State<AppState>,
    Json(payload): Json<PekerjaInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let pekerja = state
        .services
        .pekerja
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(pekerja))
}

async fn update_pekerja(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PekerjaInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let pekerja = state
        .services
        .pekerja
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(pekerja))
}

async fn delete_pekerja(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .pekerja
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response("Pekerja deleted"))
}

async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStatusInput>,
) -> Result<impl IntoResponse, ApiError> {
    let pekerja = state
        .services
        .pekerja
        .set_status(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(pekerja))
}
