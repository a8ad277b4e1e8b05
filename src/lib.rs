//! HVAC store API library
//!
//! Catalogue, cart, checkout and back-office services for an HVAC sales and
//! service store, exposed over a versioned JSON API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod services;
pub mod storage;
pub mod tracing;
pub mod workers;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::HeaderValue,
    middleware::Next,
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::auth::{AuthRouterExt, AuthService, ROLE_ADMIN};
use crate::services::PageRequest;

/// Files accepted in one multipart request (main image plus gallery)
const MAX_FILES_PER_REQUEST: usize = 12;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        services: handlers::AppServices,
    ) -> Self {
        Self {
            db,
            config,
            services,
        }
    }

    pub fn auth_service(&self) -> Arc<AuthService> {
        self.services.auth.clone()
    }
}

// Common response wrappers
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: PageRequest) -> Self {
        Self {
            items,
            total,
            page: page.page,
            limit: page.limit,
            total_pages: total.div_ceil(page.limit),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

impl ApiResponse<()> {
    /// Successful envelope that carries only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}


#[derive(Debug, Error)]
pub enum RouterError {
    #[error("missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true")]
    MissingCors,
}

/// Routes mounted under `/admin`, all gated on the admin role.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::barang::admin_routes())
        .merge(handlers::jasa::admin_routes())
        .merge(handlers::transaksi::admin_routes())
        .merge(handlers::notifikasi::admin_routes())
        .merge(handlers::pekerja::admin_routes())
        .merge(handlers::dashboard::admin_routes())
        .with_role(ROLE_ADMIN)
}

/// Everything served under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Storefront
        .merge(handlers::barang::public_routes())
        .merge(handlers::jasa::public_routes())
        .merge(handlers::interaksi::public_routes())
        // Customer
        .merge(handlers::interaksi::customer_routes())
        .merge(handlers::keranjang::customer_routes())
        .merge(handlers::transaksi::customer_routes())
        .merge(handlers::notifikasi::customer_routes())
        .nest("/auth", handlers::auth::auth_routes())
        // Back office
        .nest("/admin", admin_routes())
}

/// Builds the CORS layer from configured origins, falling back to a
/// permissive policy only in development or when explicitly allowed.
pub fn cors_layer(cfg: &config::AppConfig) -> Result<CorsLayer, RouterError> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_credentials(cfg.cors_allow_credentials))
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Ok(CorsLayer::permissive())
    } else {
        ::tracing::error!("Missing CORS configuration detected");
        Err(RouterError::MissingCors)
    }
}

async fn inject_auth_service(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> axum::response::Response {
    request.extensions_mut().insert(auth);
    next.run(request).await
}

/// Full application router with every layer applied.
pub fn build_router(state: AppState) -> Result<Router, RouterError> {
    let cfg = &state.config;
    let cors = cors_layer(cfg)?;
    let body_limit = cfg
        .max_upload_bytes
        .saturating_mul(MAX_FILES_PER_REQUEST)
        .saturating_add(64 * 1024);

    let app = Router::<AppState>::new()
        .merge(health::health_routes())
        .nest("/api/v1", api_v1_routes())
        .nest_service(
            &cfg.storage_url_prefix,
            ServeDir::new(&cfg.storage_root),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Inject AuthService into request extensions for auth middleware
        .layer(axum::middleware::from_fn_with_state(
            state.auth_service(),
            inject_auth_service,
        ))
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state);

    Ok(app)
}
