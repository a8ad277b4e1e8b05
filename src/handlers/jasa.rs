use crate::{
    errors::ApiError,
    handlers::common::{
        created_response, empty_as_none, map_service_error, message_response, page_request,
        paginated_response, success_response,
    },
    handlers::multipart::{jasa_form, MultipartForm},
    services::jasa::{JasaFilter, JasaSort},
    AppState,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct JasaQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub kategori: Option<String>,
    #[serde(default)]
    pub sort: Option<JasaSort>,
}

impl JasaQuery {
    fn filter(&self) -> JasaFilter {
        JasaFilter {
            search: self.search.clone(),
            kategori: self.kategori.clone(),
            sort: self.sort.unwrap_or_default(),
        }
    }
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/jasa", get(list_jasa))
        .route("/jasa/kategori", get(list_kategori))
        .route("/jasa/{id}", get(get_jasa))
}

/// Mounted under `/admin`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/jasa", get(admin_list_jasa).post(create_jasa))
        .route(
            "/jasa/{id}",
            get(admin_get_jasa).put(update_jasa).delete(delete_jasa),
        )
        .route("/jasa/{id}/toggle-display", post(toggle_display))
        .route("/jasa/{id}/toggle-rekomendasi", post(toggle_rekomendasi))
}

async fn list_jasa(
    State(state): State<AppState>,
    Query(query): Query<JasaQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .jasa
        .storefront_list(query.filter(), page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page))
}

async fn list_kategori(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .services
        .jasa
        .categories()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(categories))
}

async fn get_jasa(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let jasa = state
        .services
        .jasa
        .get_displayed(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(jasa))
}

async fn admin_list_jasa(
    State(state): State<AppState>,
    Query(query): Query<JasaQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .jasa
        .admin_list(query.filter(), page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page))
}

async fn admin_get_jasa(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let jasa = state
        .services
        .jasa
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(jasa))
}

async fn create_jasa(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (input, foto) = jasa_form(MultipartForm::read(multipart).await?)?;
    let jasa = state
        .services
        .jasa
        .create(input, foto)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(jasa))
}

async fn update_jasa(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (input, foto) = jasa_form(MultipartForm::read(multipart).await?)?;
    let jasa = state
        .services
        .jasa
        .update(id, input, foto)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(jasa))
}

async fn delete_jasa(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .jasa
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response("Jasa deleted"))
}

async fn toggle_display(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let jasa = state
        .services
        .jasa
        .toggle_display(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(jasa))
}

async fn toggle_rekomendasi(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let jasa = state
        .services
        .jasa
        .toggle_rekomendasi(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(jasa))
}
