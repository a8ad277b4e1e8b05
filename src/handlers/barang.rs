use crate::{
    errors::ApiError,
    handlers::common::{
        created_response, empty_as_none, map_service_error, message_response, page_request,
        paginated_response, success_response,
    },
    handlers::multipart::{barang_form, MultipartForm},
    services::barang::{BarangFilter, BarangSort},
    AppState,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Storefront catalogue query
#[derive(Debug, Default, Deserialize)]
pub struct BarangQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub kategori: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_harga: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_harga: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub rekomendasi: Option<bool>,
    #[serde(default)]
    pub sort: Option<BarangSort>,
}

impl BarangQuery {
    fn filter(&self) -> BarangFilter {
        BarangFilter {
            search: self.search.clone(),
            kategori: self.kategori.clone(),
            min_harga: self.min_harga,
            max_harga: self.max_harga,
            rekomendasi: self.rekomendasi,
            sort: self.sort.unwrap_or_default(),
        }
    }
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/barang", get(list_barang))
        .route("/barang/kategori", get(list_kategori))
        .route("/barang/{id}", get(get_barang))
}

/// Mounted under `/admin`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/barang", get(admin_list_barang).post(create_barang))
        .route(
            "/barang/{id}",
            get(admin_get_barang).put(update_barang).delete(delete_barang),
        )
        .route("/barang/{id}/toggle-display", post(toggle_display))
        .route("/barang/{id}/toggle-rekomendasi", post(toggle_rekomendasi))
}

async fn list_barang(
    State(state): State<AppState>,
    Query(query): Query<BarangQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .barang
        .storefront_list(query.filter(), page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page))
}

async fn list_kategori(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .services
        .barang
        .categories()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(categories))
}

async fn get_barang(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let barang = state
        .services
        .barang
        .get_displayed(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(barang))
}

async fn admin_list_barang(
    State(state): State<AppState>,
    Query(query): Query<BarangQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .barang
        .admin_list(query.filter(), page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page))
}

async fn admin_get_barang(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let barang = state
        .services
        .barang
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(barang))
}

async fn create_barang(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (input, uploads) = barang_form(MultipartForm::read(multipart).await?)?;
    let barang = state
        .services
        .barang
        .create(input, uploads)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(barang))
}

async fn update_barang(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (input, uploads) = barang_form(MultipartForm::read(multipart).await?)?;
    let barang = state
        .services
        .barang
        .update(id, input, uploads)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(barang))
}

async fn delete_barang(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .barang
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(message_response("Barang deleted"))
}

async fn toggle_display(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let barang = state
        .services
        .barang
        .toggle_display(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(barang))
}

async fn toggle_rekomendasi(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let barang = state
        .services
        .barang
        .toggle_rekomendasi(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(barang))
}
