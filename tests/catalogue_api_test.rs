//! Storefront browsing, admin catalogue management and product interactions.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, FilePart, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .map(|s| s.parse().expect("decimal string"))
        .or_else(|| value.as_f64().map(|f| Decimal::try_from(f).expect("decimal number")))
        .expect("decimal value")
}

#[tokio::test]
async fn storefront_shows_discounted_price_and_hides_purchase_price() {
    let app = TestApp::new().await;
    let id = app.seed_barang("AC-001", dec!(3200000), 10, 5).await;

    let response = app
        .request(Method::GET, &format!("/api/v1/barang/{}", id), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let barang = &body["data"];
    assert_eq!(decimal(&barang["harga_setelah_diskon"]), dec!(2880000));
    assert!(barang.get("harga_beli").is_none());

    let response = app
        .as_admin(Method::GET, &format!("/api/v1/admin/barang/{}", id), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(decimal(&body["data"]["harga_beli"]), dec!(1600000));
}

#[tokio::test]
async fn storefront_list_filters_and_paginates() {
    let app = TestApp::new().await;
    app.seed_barang("AC-101", dec!(3000000), 0, 3).await;
    app.seed_barang("AC-102", dec!(5000000), 0, 3).await;
    app.seed_barang("AC-103", dec!(7000000), 0, 3).await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/barang?min_harga=4000000&sort=harga_tertinggi&kategori=",
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let items = body["data"]["items"].as_array().expect("items");
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(items[0]["kode_barang"], "AC-103");
    assert_eq!(items[1]["kode_barang"], "AC-102");

    let response = app
        .request(Method::GET, "/api/v1/barang?limit=1&page=2", None, None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["total_pages"], 3);

    let response = app
        .request(Method::GET, "/api/v1/barang/kategori", None, None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"], json!(["AC Split"]));
}

#[tokio::test]
async fn hidden_barang_is_not_found_on_storefront() {
    let app = TestApp::new().await;
    let id = app.seed_barang("AC-201", dec!(3000000), 0, 3).await;

    let response = app
        .as_admin(
            Method::POST,
            &format!("/api/v1/admin/barang/{}/toggle-display", id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["display"], false);

    let response = app
        .request(Method::GET, &format!("/api/v1/barang/{}", id), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.request(Method::GET, "/api/v1/barang", None, None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn admin_creates_barang_with_images_and_delete_removes_them() {
    let app = TestApp::new().await;

    let response = app
        .multipart(
            Method::POST,
            "/api/v1/admin/barang",
            &[
                ("kode_barang", "AC-DK-10"),
                ("nama_barang", "AC Split 1 PK Inverter"),
                ("merek", "Daikin"),
                ("kategori", "AC Split"),
                ("harga_beli", "4300000"),
                ("harga_jual", "5150000"),
                ("diskon", "5"),
                ("stok", "8"),
                ("caption[]", "Unit indoor"),
            ],
            &[
                FilePart {
                    field: "gambar",
                    file_name: "utama.jpg",
                    content: b"fake-jpeg-bytes",
                },
                FilePart {
                    field: "gambar_deskripsi[]",
                    file_name: "indoor.png",
                    content: b"fake-png-bytes",
                },
            ],
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let barang = &body["data"];
    let id = barang["id"].as_str().expect("id").to_string();
    let gambar = barang["gambar"].as_str().expect("gambar path").to_string();
    assert!(gambar.starts_with("gambar/produk/ac-split/"));
    assert_eq!(barang["gambar_deskripsi"][0]["caption"], "Unit indoor");
    let deskripsi = barang["gambar_deskripsi"][0]["path"]
        .as_str()
        .expect("description path")
        .to_string();

    let root = app.storage_root();
    assert!(root.join(&gambar).exists());
    assert!(root.join(&deskripsi).exists());

    let gambar_url = barang["gambar_url"].as_str().expect("gambar url").to_string();
    let response = app.request(Method::GET, &gambar_url, None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .as_admin(Method::DELETE, &format!("/api/v1/admin/barang/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!root.join(&gambar).exists());
    assert!(!root.join(&deskripsi).exists());
    assert!(!root.join("gambar/produk/ac-split").exists());
}

#[tokio::test]
async fn admin_create_reports_field_errors() {
    let app = TestApp::new().await;

    let response = app
        .multipart(
            Method::POST,
            "/api/v1/admin/barang",
            &[("nama_barang", "Tanpa kode"), ("harga_jual", "abc"), ("diskon", "150")],
            &[FilePart {
                field: "gambar",
                file_name: "virus.exe",
                content: b"MZ",
            }],
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert!(body["errors"]["kode_barang"].is_array());
    assert!(body["errors"]["harga_jual"].is_array());
}

#[tokio::test]
async fn jasa_crud_round() {
    let app = TestApp::new().await;

    let response = app
        .multipart(
            Method::POST,
            "/api/v1/admin/jasa",
            &[
                ("kode_jasa", "JS-CUCI"),
                ("nama_jasa", "Cuci AC Split"),
                ("kategori", "Perawatan"),
                ("harga", "75000"),
                ("snk", "Per unit"),
            ],
            &[],
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let id = body["data"]["id"].as_str().expect("id").to_string();

    let response = app.request(Method::GET, "/api/v1/jasa", None, None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 1);

    let response = app
        .request(Method::GET, "/api/v1/jasa/kategori", None, None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"], json!(["Perawatan"]));

    let response = app
        .as_admin(Method::DELETE, &format!("/api/v1/admin/jasa/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, &format!("/api/v1/jasa/{}", id), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn likes_toggle_and_feed_favorites() {
    let app = TestApp::new().await;
    let id = app.seed_barang("AC-301", dec!(3000000), 0, 3).await;
    let uri = format!("/api/v1/barang/{}/like", id);

    let response = app.as_customer(Method::POST, &uri, None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["liked"], true);
    assert_eq!(body["data"]["total_likes"], 1);

    let response = app.as_customer(Method::GET, "/api/v1/favorit", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let response = app.as_customer(Method::POST, &uri, None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["liked"], false);
    assert_eq!(body["data"]["total_likes"], 0);
}

#[tokio::test]
async fn feedback_is_public_to_read_and_private_to_write() {
    let app = TestApp::new().await;
    let id = app.seed_barang("AC-401", dec!(3000000), 0, 3).await;
    let uri = format!("/api/v1/barang/{}/feedback", id);

    let response = app
        .request(Method::POST, &uri, Some(json!({"rating": 5})), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .as_customer(Method::POST, &uri, Some(json!({"rating": 6})))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .as_customer(
            Method::POST,
            &uri,
            Some(json!({"rating": 4, "feedback": "Dingin dan senyap"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // a second rating replaces the first
    let response = app
        .as_customer(Method::POST, &uri, Some(json!({"rating": 2})))
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total_feedback"], 1);
    assert_eq!(body["data"]["average_rating"], 2.0);

    let response = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn huge_page_number_returns_empty_page() {
    let app = TestApp::new().await;
    app.seed_barang("AC-501", dec!(3000000), 0, 3).await;

    let response = app
        .request(Method::GET, "/api/v1/barang?page=18446744073709551615", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"], json!([]));

    let response = app
        .as_admin(Method::GET, "/api/v1/admin/barang?page=18446744073709551615", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["items"], json!([]));
}
