//! Notification feeds, technicians and the admin dashboard.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{response_json, TestApp};
use hvac_store_api::{
    entities::StatusPekerja,
    services::pekerja::{PekerjaInput, SetStatusInput},
    workers::sweep_once,
};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn registration_lands_in_admin_feed() {
    let app = TestApp::new().await;

    let response = app
        .as_admin(Method::GET, "/api/v1/admin/notifikasi", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let items = body["data"]["items"].as_array().expect("items");
    assert!(items.iter().any(|n| n["tipe"] == "registrasi"));

    let response = app
        .as_admin(Method::GET, "/api/v1/admin/notifikasi/jumlah-belum-dibaca", None)
        .await;
    let body = response_json(response).await;
    assert!(body["data"]["jumlah"].as_u64().unwrap_or_default() >= 1);

    let response = app
        .as_admin(Method::PUT, "/api/v1/admin/notifikasi/baca-semua", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .as_admin(Method::GET, "/api/v1/admin/notifikasi/jumlah-belum-dibaca", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["jumlah"], 0);
}

#[tokio::test]
async fn broadcast_reaches_customers_but_not_admin_unread_count() {
    let app = TestApp::new().await;

    let response = app
        .as_admin(
            Method::POST,
            "/api/v1/admin/notifikasi/broadcast",
            Some(json!({"judul": "Promo Cuci AC", "pesan": "Diskon 20% minggu ini"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let broadcast_id = body["data"]["id"].as_str().expect("id").to_string();

    let response = app.as_customer(Method::GET, "/api/v1/notifikasi", None).await;
    let body = response_json(response).await;
    let items = body["data"]["items"].as_array().expect("items");
    assert!(items.iter().any(|n| n["judul"] == "Promo Cuci AC"));

    // shared rows cannot be marked read by one customer
    let response = app
        .as_customer(
            Method::PUT,
            &format!("/api/v1/notifikasi/{}/baca", broadcast_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .as_admin(
            Method::DELETE,
            &format!("/api/v1/admin/notifikasi/{}", broadcast_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.as_customer(Method::GET, "/api/v1/notifikasi", None).await;
    let body = response_json(response).await;
    let items = body["data"]["items"].as_array().expect("items");
    assert!(!items.iter().any(|n| n["judul"] == "Promo Cuci AC"));
}

#[tokio::test]
async fn broadcast_requires_title_and_message() {
    let app = TestApp::new().await;

    let response = app
        .as_admin(
            Method::POST,
            "/api/v1/admin/notifikasi/broadcast",
            Some(json!({"judul": "", "pesan": ""})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert!(body["errors"]["judul"].is_array());
    assert!(body["errors"]["pesan"].is_array());
}

#[tokio::test]
async fn customer_marks_own_notification_read() {
    let app = TestApp::new().await;
    let barang_id = app.seed_barang("AC-N01", dec!(3000000), 0, 3).await;
    app.as_customer(
        Method::POST,
        "/api/v1/keranjang",
        Some(json!({"barang_id": barang_id, "jumlah": 1})),
    )
    .await;
    let response = app
        .as_customer(
            Method::POST,
            "/api/v1/transaksi/checkout",
            Some(json!({"metode_pembayaran": "e_wallet"})),
        )
        .await;
    let trx = response_json(response).await;
    let trx_id = trx["data"]["id"].as_str().expect("id").to_string();

    app.as_admin(
        Method::PUT,
        &format!("/api/v1/admin/transaksi/{}/status", trx_id),
        Some(json!({"status": "dibatalkan", "alasan_batal": "Stok gudang kosong"})),
    )
    .await;

    let response = app
        .as_customer(Method::GET, "/api/v1/notifikasi?unread_only=true", None)
        .await;
    let body = response_json(response).await;
    let notif_id = body["data"]["items"][0]["id"]
        .as_str()
        .expect("notification id")
        .to_string();

    let response = app
        .as_customer(
            Method::PUT,
            &format!("/api/v1/notifikasi/{}/baca", notif_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["dibaca"], true);

    let response = app
        .as_customer(Method::GET, "/api/v1/notifikasi/jumlah-belum-dibaca", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["jumlah"], 0);
}

#[tokio::test]
async fn pekerja_lifecycle() {
    let app = TestApp::new().await;

    let response = app
        .as_admin(
            Method::POST,
            "/api/v1/admin/pekerja",
            Some(json!({"nama_pekerja": "Andi", "jabatan": "Teknisi", "no_hp": "0811"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "standby");
    let id = body["data"]["id"].as_str().expect("id").to_string();

    let response = app
        .as_admin(
            Method::POST,
            "/api/v1/admin/pekerja",
            Some(json!({"nama_pekerja": "", "jabatan": ""})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let mulai = Utc::now();
    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/v1/admin/pekerja/{}/status", id),
            Some(json!({
                "status": "busy",
                "busy_mulai": mulai,
                "busy_selesai": mulai - Duration::hours(1)
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/v1/admin/pekerja/{}/status", id),
            Some(json!({
                "status": "busy",
                "busy_mulai": mulai,
                "busy_selesai": mulai + Duration::hours(3)
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .as_admin(Method::GET, "/api/v1/admin/pekerja?status=busy", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 1);

    let response = app
        .as_admin(
            Method::PUT,
            &format!("/api/v1/admin/pekerja/{}", id),
            Some(json!({"nama_pekerja": "Andi S.", "jabatan": "Teknisi Senior"})),
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["jabatan"], "Teknisi Senior");

    let response = app
        .as_admin(Method::DELETE, &format!("/api/v1/admin/pekerja/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .as_admin(Method::GET, &format!("/api/v1/admin/pekerja/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_summarizes_store() {
    let app = TestApp::new().await;
    app.seed_barang("AC-D01", dec!(3000000), 0, 2).await;
    app.seed_barang("AC-D02", dec!(4000000), 0, 50).await;

    let response = app.as_admin(Method::GET, "/api/v1/admin/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let summary = &body["data"];
    assert_eq!(summary["total_barang"], 2);
    assert_eq!(summary["total_pelanggan"], 1);
    assert_eq!(summary["total_transaksi"], 0);
    assert_eq!(summary["pendapatan_bulanan"].as_array().map(Vec::len), Some(12));

    let low: Vec<&str> = summary["stok_menipis"]
        .as_array()
        .expect("stok_menipis")
        .iter()
        .filter_map(|b| b["kode_barang"].as_str())
        .collect();
    assert_eq!(low, vec!["AC-D01"]);
}

#[tokio::test]
async fn sweeper_puts_finished_pekerja_back_on_standby() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let pekerja = services
        .pekerja
        .create(PekerjaInput {
            nama_pekerja: "Bayu".to_string(),
            jabatan: "Teknisi".to_string(),
            no_hp: None,
        })
        .await
        .expect("create pekerja");

    let now = Utc::now();
    services
        .pekerja
        .set_status(
            pekerja.id,
            SetStatusInput {
                status: StatusPekerja::Busy,
                busy_mulai: Some(now - Duration::hours(4)),
                busy_selesai: Some(now - Duration::minutes(5)),
            },
        )
        .await
        .expect("set busy");

    let report = sweep_once(services).await;
    assert_eq!(report.released_pekerja, 1);

    let response = app
        .as_admin(Method::GET, &format!("/api/v1/admin/pekerja/{}", pekerja.id), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "standby");
    assert!(body["data"]["busy_selesai"].is_null());
}
