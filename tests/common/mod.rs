#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use hvac_store_api::{
    auth::RegisterInput,
    build_router,
    config::AppConfig,
    db,
    entities::barang,
    handlers::AppServices,
    services::barang::{BarangInput, BarangUploads},
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_JWT_SECRET: &str =
    "integration_test_secret_key_that_is_comfortably_longer_than_sixty_four_chars";
const MULTIPART_BOUNDARY: &str = "hvac-test-boundary";

/// A file part for [`TestApp::multipart`]
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content: &'a [u8],
}

/// Application under test backed by a throwaway SQLite file and storage dir.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    admin_token: String,
    customer_token: String,
    pub customer_id: Uuid,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("hvac_test.db");
        let storage_root = dir.path().join("storage");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "development".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.storage_root = storage_root.display().to_string();
        cfg.expiry_sweep_interval_secs = 0;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let services = AppServices::new(db_arc.clone(), &cfg);
        let state = AppState::new(db_arc, cfg, services.clone());

        let admin = services
            .auth
            .create_admin("Admin Toko", "admin@hvac.test", "rahasia-admin")
            .await
            .expect("create admin");
        let admin_token = services
            .auth
            .generate_token(&admin)
            .expect("admin token")
            .access_token;

        let registered = services
            .auth
            .register(RegisterInput {
                name: "Sari Pelanggan".to_string(),
                email: "sari@hvac.test".to_string(),
                password: "rahasia-sari".to_string(),
                password_confirmation: "rahasia-sari".to_string(),
                no_hp: Some("081234567890".to_string()),
                alamat: Some("Jl. Merdeka 1, Bandung".to_string()),
            })
            .await
            .expect("register customer");

        let router = build_router(state.clone()).expect("router");

        Self {
            router,
            state,
            admin_token,
            customer_token: registered.token.access_token,
            customer_id: registered.user.id,
            _dir: dir,
        }
    }

    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    pub fn customer_token(&self) -> &str {
        &self.customer_token
    }

    pub fn storage_root(&self) -> PathBuf {
        PathBuf::from(&self.state.config.storage_root)
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn as_customer(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(self.customer_token()))
            .await
    }

    pub async fn as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(self.admin_token()))
            .await
    }

    /// Sends a `multipart/form-data` body built from text fields and files.
    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        fields: &[(&str, &str)],
        files: &[FilePart<'_>],
        token: Option<&str>,
    ) -> Response {
        let mut payload = Vec::new();
        for (name, value) in fields {
            payload.extend_from_slice(
                format!(
                    "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for file in files {
            payload.extend_from_slice(
                format!(
                    "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    file.field, file.file_name
                )
                .as_bytes(),
            );
            payload.extend_from_slice(file.content);
            payload.extend_from_slice(b"\r\n");
        }
        payload.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder().method(method).uri(uri).header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        );
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let request = builder
            .body(Body::from(payload))
            .expect("failed to build multipart request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Creates a displayed product straight through the service layer.
    pub async fn seed_barang(&self, kode: &str, harga_jual: Decimal, diskon: i32, stok: i32) -> Uuid {
        let created = self
            .state
            .services
            .barang
            .create(
                BarangInput {
                    kode_barang: kode.to_string(),
                    nama_barang: format!("AC {}", kode),
                    deskripsi: Some("Unit uji".to_string()),
                    merek: Some("Daikin".to_string()),
                    kategori: "AC Split".to_string(),
                    harga_beli: harga_jual / Decimal::TWO,
                    harga_jual,
                    diskon,
                    stok,
                    display: true,
                    status_rekomendasi: false,
                },
                BarangUploads::default(),
            )
            .await
            .expect("seed barang");
        created.id
    }

    pub async fn stok_of(&self, id: Uuid) -> i32 {
        barang::Entity::find_by_id(id)
            .one(&*self.state.db)
            .await
            .expect("query barang")
            .expect("barang exists")
            .stok
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
