use crate::{
    auth::{AuthRouterExt, AuthUser, LoginInput, RegisterInput, UserResponse},
    errors::ApiError,
    handlers::common::{created_response, map_service_error, success_response},
    AppState,
};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};

/// `/auth` routes: registration and login are open, `/me` needs a token.
pub fn auth_routes() -> Router<AppState> {
    let protected = Router::new().route("/me", get(me)).with_auth();

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let registered = state
        .services
        .auth
        .register(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(registered))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .services
        .auth
        .login(payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(session))
}

async fn me(user: AuthUser, State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .services
        .auth
        .current_user(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(UserResponse::from(account)))
}
