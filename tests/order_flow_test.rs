//! Cart, checkout and the order lifecycle end to end.

mod common;

use axum::http::{header, Method, StatusCode};
use chrono::{Duration, Utc};
use common::{response_json, response_text, FilePart, TestApp};
use hvac_store_api::entities::transaksi;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{json, Value};
use uuid::Uuid;

fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .map(|s| s.parse().expect("decimal string"))
        .expect("decimal value")
}

/// Puts `jumlah` of a fresh product in the customer's cart and checks out.
async fn checkout_one(app: &TestApp, kode: &str, stok: i32, jumlah: i32) -> (Uuid, Value) {
    let barang_id = app.seed_barang(kode, dec!(3200000), 10, stok).await;
    let response = app
        .as_customer(
            Method::POST,
            "/api/v1/keranjang",
            Some(json!({"barang_id": barang_id, "jumlah": jumlah})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .as_customer(
            Method::POST,
            "/api/v1/transaksi/checkout",
            Some(json!({"metode_pembayaran": "transfer_bank"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    (barang_id, body["data"].clone())
}

async fn upload_bukti(app: &TestApp, transaksi_id: &str) -> axum::response::Response {
    app.multipart(
        Method::POST,
        &format!("/api/v1/transaksi/{}/bukti-pembayaran", transaksi_id),
        &[],
        &[FilePart {
            field: "bukti",
            file_name: "transfer.pdf",
            content: b"%PDF-1.4 bukti",
        }],
        Some(app.customer_token()),
    )
    .await
}

async fn set_status(app: &TestApp, transaksi_id: &str, status: &str) -> axum::response::Response {
    app.as_admin(
        Method::PUT,
        &format!("/api/v1/admin/transaksi/{}/status", transaksi_id),
        Some(json!({"status": status})),
    )
    .await
}

#[tokio::test]
async fn cart_merges_lines_and_respects_stock() {
    let app = TestApp::new().await;
    let barang_id = app.seed_barang("AC-501", dec!(3200000), 10, 3).await;

    for _ in 0..2 {
        let response = app
            .as_customer(
                Method::POST,
                "/api/v1/keranjang",
                Some(json!({"barang_id": barang_id, "jumlah": 1})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.as_customer(Method::GET, "/api/v1/keranjang", None).await;
    let body = response_json(response).await;
    let items = body["data"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["jumlah"], 2);
    assert_eq!(decimal(&body["data"]["summary"]["total_harga"]), dec!(6400000));
    assert_eq!(decimal(&body["data"]["summary"]["total_diskon"]), dec!(640000));
    assert_eq!(decimal(&body["data"]["summary"]["total_bayar"]), dec!(5760000));

    let line_id = items[0]["id"].as_str().expect("line id").to_string();
    let response = app
        .as_customer(
            Method::PUT,
            &format!("/api/v1/keranjang/{}", line_id),
            Some(json!({"jumlah": 4})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .as_customer(Method::DELETE, &format!("/api/v1/keranjang/{}", line_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.as_customer(Method::GET, "/api/v1/keranjang", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["items"], json!([]));
}

#[tokio::test]
async fn checkout_snapshots_lines_and_takes_stock() {
    let app = TestApp::new().await;
    let (barang_id, trx) = checkout_one(&app, "AC-601", 5, 2).await;

    assert_eq!(trx["status"], "menunggu_pembayaran");
    assert_eq!(trx["items"][0]["jumlah"], 2);
    assert_eq!(decimal(&trx["total_harga"]), dec!(6400000));
    assert_eq!(decimal(&trx["diskon_total"]), dec!(640000));
    assert_eq!(
        decimal(&trx["total_bayar"]),
        decimal(&trx["total_harga"]) - decimal(&trx["diskon_total"])
    );
    assert_eq!(trx["alamat_pengiriman"], "Jl. Merdeka 1, Bandung");
    assert_eq!(app.stok_of(barang_id).await, 3);

    let response = app.as_customer(Method::GET, "/api/v1/keranjang", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["items"], json!([]));

    let kode = trx["kode_transaksi"].as_str().expect("kode");
    let response = app
        .as_customer(Method::GET, &format!("/api/v1/transaksi/lacak/{}", kode), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.as_customer(Method::GET, "/api/v1/transaksi", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn checkout_with_empty_cart_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .as_customer(
            Method::POST,
            "/api/v1/transaksi/checkout",
            Some(json!({"metode_pembayaran": "qris"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn payment_proof_then_admin_walks_status_forward() {
    let app = TestApp::new().await;
    let (_, trx) = checkout_one(&app, "AC-701", 5, 1).await;
    let id = trx["id"].as_str().expect("id").to_string();

    let response = upload_bukti(&app, &id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "dibayar");
    let bukti = body["data"]["bukti_pembayaran"].as_str().expect("bukti path");
    assert!(app.storage_root().join(bukti).exists());

    // second upload is refused once paid
    let response = upload_bukti(&app, &id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // skipping a step is refused and writes nothing for the customer
    let response = app
        .as_customer(Method::GET, "/api/v1/notifikasi/jumlah-belum-dibaca", None)
        .await;
    let before = response_json(response).await["data"]["jumlah"].clone();
    let response = set_status(&app, &id, "selesai").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = app
        .as_customer(Method::GET, "/api/v1/notifikasi/jumlah-belum-dibaca", None)
        .await;
    assert_eq!(response_json(response).await["data"]["jumlah"], before);

    let response = set_status(&app, &id, "diproses").await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = set_status(&app, &id, "selesai").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "selesai");
    assert!(body["data"]["selesai_at"].is_string());

    // terminal
    let response = set_status(&app, &id, "dibatalkan").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .as_customer(Method::GET, "/api/v1/notifikasi?unread_only=true", None)
        .await;
    let body = response_json(response).await;
    let tipe: Vec<&str> = body["data"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|n| n["tipe"].as_str())
        .collect();
    assert_eq!(tipe.iter().filter(|t| **t == "status_transaksi").count(), 2);
}

#[tokio::test]
async fn status_change_notification_carries_both_statuses() {
    let app = TestApp::new().await;
    let (_, trx) = checkout_one(&app, "AC-751", 5, 1).await;
    let id = trx["id"].as_str().expect("id").to_string();

    let response = set_status(&app, &id, "dibayar").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.as_customer(Method::GET, "/api/v1/notifikasi", None).await;
    let body = response_json(response).await;
    let notif = body["data"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .find(|n| n["tipe"] == "status_transaksi")
        .cloned()
        .expect("status notification");
    assert_eq!(notif["data"]["transaksi_id"], id.as_str());
    assert_eq!(notif["data"]["status_lama"], "menunggu_pembayaran");
    assert_eq!(notif["data"]["status_baru"], "dibayar");
}

#[tokio::test]
async fn customer_cancel_restores_stock() {
    let app = TestApp::new().await;
    let (barang_id, trx) = checkout_one(&app, "AC-801", 4, 3).await;
    assert_eq!(app.stok_of(barang_id).await, 1);

    let id = trx["id"].as_str().expect("id");
    let response = app
        .as_customer(Method::POST, &format!("/api/v1/transaksi/{}/batal", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "dibatalkan");
    assert_eq!(app.stok_of(barang_id).await, 4);
}

#[tokio::test]
async fn overdue_order_expires_on_next_read() {
    let app = TestApp::new().await;
    let (barang_id, trx) = checkout_one(&app, "AC-901", 5, 2).await;
    let id: Uuid = trx["id"].as_str().expect("id").parse().expect("uuid");

    let model = transaksi::Entity::find_by_id(id)
        .one(&*app.state.db)
        .await
        .expect("query")
        .expect("transaksi");
    let mut active: transaksi::ActiveModel = model.into();
    active.batas_pembayaran = Set(Utc::now() - Duration::hours(1));
    active.update(&*app.state.db).await.expect("backdate deadline");

    let response = app
        .as_customer(Method::GET, &format!("/api/v1/transaksi/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "dibatalkan");
    assert!(body["data"]["alasan_batal"].is_string());
    assert_eq!(app.stok_of(barang_id).await, 5);
}

#[tokio::test]
async fn sweeper_pass_expires_overdue_orders() {
    let app = TestApp::new().await;
    let (barang_id, trx) = checkout_one(&app, "AC-951", 5, 1).await;
    let id: Uuid = trx["id"].as_str().expect("id").parse().expect("uuid");

    let model = transaksi::Entity::find_by_id(id)
        .one(&*app.state.db)
        .await
        .expect("query")
        .expect("transaksi");
    let mut active: transaksi::ActiveModel = model.into();
    active.batas_pembayaran = Set(Utc::now() - Duration::minutes(5));
    active.update(&*app.state.db).await.expect("backdate deadline");

    let report = hvac_store_api::workers::sweep_once(&app.state.services).await;
    assert_eq!(report.expired_transaksi, 1);
    assert_eq!(app.stok_of(barang_id).await, 5);

    let report = hvac_store_api::workers::sweep_once(&app.state.services).await;
    assert_eq!(report.expired_transaksi, 0);
}

#[tokio::test]
async fn admin_export_is_csv_attachment() {
    let app = TestApp::new().await;
    checkout_one(&app, "AC-990", 5, 1).await;

    let response = app
        .as_admin(Method::GET, "/api/v1/admin/transaksi/export", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"transaksi-"));

    let csv = response_text(response).await;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Kode Transaksi,Nama Customer,Email Customer,Total Bayar,Status,Metode Pembayaran,Tanggal Transaksi,Tanggal Selesai")
    );
    let row = lines.next().expect("one data row");
    assert!(row.contains("Sari Pelanggan"));
    assert!(row.contains("sari@hvac.test"));
}

#[tokio::test]
async fn admin_lists_and_filters_transaksi() {
    let app = TestApp::new().await;
    checkout_one(&app, "AC-1001", 5, 1).await;

    let response = app
        .as_admin(Method::GET, "/api/v1/admin/transaksi?status=menunggu_pembayaran", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["customer"]["email"], "sari@hvac.test");

    let response = app
        .as_admin(Method::GET, "/api/v1/admin/transaksi?status=selesai", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 0);

    let response = app
        .as_admin(Method::GET, "/api/v1/admin/transaksi?search=sari", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 1);
}
