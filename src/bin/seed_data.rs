//! Seed data script - populates the database with a demo HVAC catalogue
//!
//! Run with: cargo run --bin seed-data -- --admin-email admin@example.com
//!
//! This creates:
//! - one admin account
//! - air conditioners and spare parts (Barang)
//! - installation and maintenance offerings (Jasa)
//! - a small crew of technicians (Pekerja)
//!
//! Existing codes, emails and technician names are left untouched, so the
//! script can be rerun safely.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::info;

use hvac_store_api::{
    config::{self, AppConfig},
    db,
    entities::{barang, jasa, pekerja, Barang, Jasa, Pekerja},
    handlers::AppServices,
    services::{
        barang::{BarangInput, BarangUploads},
        jasa::JasaInput,
        pekerja::PekerjaInput,
    },
};

#[derive(Debug, Parser)]
#[command(name = "seed-data", about = "Seed the HVAC store database with demo data")]
struct Args {
    /// Overrides the configured database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, default_value = "admin@hvac-store.local")]
    admin_email: String,

    #[arg(long, env = "SEED_ADMIN_PASSWORD", default_value = "admin12345")]
    admin_password: String,

    #[arg(long, default_value = "Administrator")]
    admin_name: String,

    /// Only create the admin account
    #[arg(long)]
    admin_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut cfg: AppConfig = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);
    if let Some(url) = args.database_url.clone() {
        cfg.database_url = url;
    }

    info!("=== HVAC Store Seed Data ===");
    let pool = db::establish_connection_from_app_config(&cfg).await?;
    db::run_migrations(&pool).await?;
    let db = Arc::new(pool);
    let services = AppServices::new(db.clone(), &cfg);

    info!("Creating admin account...");
    seed_admin(&services, &args).await?;

    if args.admin_only {
        info!("Skipping catalogue samples");
        return Ok(());
    }

    info!("Creating barang...");
    let barang_count = seed_barang(&db, &services).await?;
    info!("  Created {} barang", barang_count);

    info!("Creating jasa...");
    let jasa_count = seed_jasa(&db, &services).await?;
    info!("  Created {} jasa", jasa_count);

    info!("Creating pekerja...");
    let pekerja_count = seed_pekerja(&db, &services).await?;
    info!("  Created {} pekerja", pekerja_count);

    info!("=== Seed Data Complete ===");
    info!("Try: curl http://{}:{}/api/v1/barang", cfg.host, cfg.port);
    Ok(())
}

async fn seed_admin(services: &AppServices, args: &Args) -> anyhow::Result<()> {
    let email = args.admin_email.trim().to_lowercase();
    if services.auth.find_by_email(&email).await?.is_some() {
        info!("  Admin {} already exists", email);
        return Ok(());
    }

    let admin = services
        .auth
        .create_admin(&args.admin_name, &email, &args.admin_password)
        .await?;
    info!("  Created admin {}", admin.email);
    Ok(())
}

async fn seed_barang(db: &DatabaseConnection, services: &AppServices) -> anyhow::Result<usize> {
    let samples: Vec<(&str, &str, &str, &str, Decimal, Decimal, i32, i32, bool)> = vec![
        ("AC-DK-05", "AC Split 1/2 PK Standard", "Daikin", "AC Split", dec!(2650000), dec!(3200000), 10, 12, true),
        ("AC-DK-10", "AC Split 1 PK Inverter", "Daikin", "AC Split", dec!(4300000), dec!(5150000), 5, 8, true),
        ("AC-PN-15", "AC Split 1.5 PK Inverter", "Panasonic", "AC Split", dec!(5600000), dec!(6750000), 0, 6, false),
        ("AC-GR-20", "AC Standing Floor 2 PK", "Gree", "AC Standing", dec!(9100000), dec!(10900000), 0, 3, false),
        ("AC-LG-CS", "AC Cassette 3 PK", "LG", "AC Cassette", dec!(14800000), dec!(17500000), 5, 2, false),
        ("SP-FRE-R32", "Freon R32 (1 kg)", "Klea", "Sparepart", dec!(95000), dec!(135000), 0, 40, false),
        ("SP-PIPA-05", "Pipa AC 1/2 PK per meter", "Hoda", "Sparepart", dec!(55000), dec!(85000), 0, 120, false),
        ("SP-REM-UNI", "Remote AC Universal", "Chunghop", "Aksesoris", dec!(30000), dec!(55000), 10, 4, false),
    ];

    let mut created = 0;
    for (kode, nama, merek, kategori, beli, jual, diskon, stok, rekomendasi) in samples {
        let exists = Barang::find()
            .filter(barang::Column::KodeBarang.eq(kode))
            .count(db)
            .await?
            > 0;
        if exists {
            continue;
        }

        let input = BarangInput {
            kode_barang: kode.to_string(),
            nama_barang: nama.to_string(),
            deskripsi: Some(format!("{} {} bergaransi resmi.", nama, merek)),
            merek: Some(merek.to_string()),
            kategori: kategori.to_string(),
            harga_beli: beli,
            harga_jual: jual,
            diskon,
            stok,
            display: true,
            status_rekomendasi: rekomendasi,
        };
        services
            .barang
            .create(input, BarangUploads::default())
            .await
            .with_context(|| format!("failed to create barang {}", kode))?;
        created += 1;
    }
    Ok(created)
}

async fn seed_jasa(db: &DatabaseConnection, services: &AppServices) -> anyhow::Result<usize> {
    let samples = vec![
        ("JS-PSG-05", "Pasang AC 1/2 - 1 PK", "Instalasi", dec!(350000), true),
        ("JS-PSG-20", "Pasang AC 1.5 - 2 PK", "Instalasi", dec!(450000), false),
        ("JS-CUCI", "Cuci AC Split", "Perawatan", dec!(75000), true),
        ("JS-FREON", "Isi Freon R32", "Perawatan", dec!(200000), false),
        ("JS-BONGKAR", "Bongkar AC", "Instalasi", dec!(150000), false),
    ];

    let mut created = 0;
    for (kode, nama, kategori, harga, rekomendasi) in samples {
        let exists = Jasa::find()
            .filter(jasa::Column::KodeJasa.eq(kode))
            .count(db)
            .await?
            > 0;
        if exists {
            continue;
        }

        let input = JasaInput {
            kode_jasa: kode.to_string(),
            nama_jasa: nama.to_string(),
            deskripsi: Some(format!("Layanan {} oleh teknisi bersertifikat.", nama.to_lowercase())),
            kategori: kategori.to_string(),
            harga,
            display: true,
            status_rekomendasi: rekomendasi,
            snk: Some("Harga belum termasuk material tambahan.".to_string()),
        };
        services
            .jasa
            .create(input, None)
            .await
            .with_context(|| format!("failed to create jasa {}", kode))?;
        created += 1;
    }
    Ok(created)
}

async fn seed_pekerja(db: &DatabaseConnection, services: &AppServices) -> anyhow::Result<usize> {
    let samples = vec![
        ("Budi Santoso", "Teknisi Senior", "081200000001"),
        ("Agus Pratama", "Teknisi", "081200000002"),
        ("Rudi Hartono", "Teknisi", "081200000003"),
        ("Dewi Lestari", "Koordinator Lapangan", "081200000004"),
    ];

    let mut created = 0;
    for (nama, jabatan, no_hp) in samples {
        let exists = Pekerja::find()
            .filter(pekerja::Column::NamaPekerja.eq(nama))
            .count(db)
            .await?
            > 0;
        if exists {
            continue;
        }

        services
            .pekerja
            .create(PekerjaInput {
                nama_pekerja: nama.to_string(),
                jabatan: jabatan.to_string(),
                no_hp: Some(no_hp.to_string()),
            })
            .await
            .with_context(|| format!("failed to create pekerja {}", nama))?;
        created += 1;
    }
    Ok(created)
}
