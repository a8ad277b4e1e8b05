use crate::{
    auth::{AuthRouterExt, AuthUser},
    entities::StatusTransaksi,
    errors::{ApiError, FieldErrors},
    handlers::common::{
        created_response, empty_as_none, map_service_error, page_request, paginated_response,
        success_response, validate_input,
    },
    handlers::multipart::MultipartForm,
    services::export::transaksi_csv_filename,
    services::transaksi::{CheckoutInput, TransaksiFilter, UpdateStatusInput},
    AppState,
};
use axum::{
    extract::{Json, Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<StatusTransaksi>,
}

/// Admin list and export query
#[derive(Debug, Default, Deserialize)]
pub struct AdminTransaksiQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<StatusTransaksi>,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub dari: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sampai: Option<NaiveDate>,
}

impl AdminTransaksiQuery {
    fn filter(&self) -> TransaksiFilter {
        TransaksiFilter {
            status: self.status,
            search: self.search.clone(),
            dari: self.dari,
            sampai: self.sampai,
        }
    }
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/transaksi/checkout", post(checkout))
        .route("/transaksi", get(history))
        .route("/transaksi/{id}", get(detail))
        .route("/transaksi/lacak/{kode}", get(track))
        .route("/transaksi/{id}/bukti-pembayaran", post(upload_bukti))
        .route("/transaksi/{id}/batal", post(cancel))
        .with_auth()
}

/// Mounted under `/admin`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/transaksi", get(admin_list))
        .route("/transaksi/export", get(export_csv))
        .route("/transaksi/{id}", get(admin_detail))
        .route("/transaksi/{id}/status", put(update_status))
}

async fn checkout(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CheckoutInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let transaksi = state
        .services
        .transaksi
        .checkout(user.user_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(transaksi))
}

async fn history(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .transaksi
        .history(user.user_id, query.status, page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page))
}

async fn detail(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transaksi = state
        .services
        .transaksi
        .detail_for_user(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(transaksi))
}

async fn track(
    user: AuthUser,
    State(state): State<AppState>,
    Path(kode): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let transaksi = state
        .services
        .transaksi
        .track(user.user_id, kode.trim())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(transaksi))
}

async fn upload_bukti(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = MultipartForm::read(multipart).await?;
    let bukti = form
        .take_file("bukti")
        .ok_or_else(|| FieldErrors::single("bukti", "The bukti field is required"))?;

    let transaksi = state
        .services
        .transaksi
        .upload_bukti(user.user_id, id, bukti)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(transaksi))
}

async fn cancel(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transaksi = state
        .services
        .transaksi
        .cancel_by_customer(user.user_id, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(transaksi))
}

async fn admin_list(
    State(state): State<AppState>,
    Query(query): Query<AdminTransaksiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(&state.config, query.page, query.limit);
    let (items, total) = state
        .services
        .transaksi
        .admin_list(query.filter(), page)
        .await
        .map_err(map_service_error)?;
    Ok(paginated_response(items, total, page))
}

async fn admin_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transaksi = state
        .services
        .transaksi
        .admin_detail(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(transaksi))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusInput>,
) -> Result<impl IntoResponse, ApiError> {
    let transaksi = state
        .services
        .transaksi
        .update_status(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(transaksi))
}

async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<AdminTransaksiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // overdue orders are cancelled before they are exported
    state
        .services
        .transaksi
        .expire_overdue()
        .await
        .map_err(map_service_error)?;
    let csv = state
        .services
        .export
        .transaksi_csv(query.filter())
        .await
        .map_err(map_service_error)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        transaksi_csv_filename(Utc::now())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
