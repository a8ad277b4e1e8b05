use crate::{
    errors::ApiError,
    handlers::common::{map_service_error, success_response},
    AppState,
};
use axum::{extract::State, response::IntoResponse, routing::get, Router};

/// Mounted under `/admin`
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(summary))
}

async fn summary(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .services
        .dashboard
        .summary()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(summary))
}
