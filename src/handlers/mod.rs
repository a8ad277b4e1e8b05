pub mod auth;
pub mod barang;
pub mod common;
pub mod dashboard;
pub mod interaksi;
pub mod jasa;
pub mod keranjang;
pub mod multipart;
pub mod notifikasi;
pub mod pekerja;
pub mod transaksi;

use crate::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db::DbPool,
    services::{
        BarangService, DashboardService, ExportService, InteraksiService, JasaService,
        KeranjangService, NotifikasiService, PekerjaService, TransaksiService,
    },
    storage::{FileStorage, LocalStorage},
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub barang: Arc<BarangService>,
    pub jasa: Arc<JasaService>,
    pub keranjang: Arc<KeranjangService>,
    pub transaksi: Arc<TransaksiService>,
    pub interaksi: Arc<InteraksiService>,
    pub notifikasi: Arc<NotifikasiService>,
    pub dashboard: Arc<DashboardService>,
    pub pekerja: Arc<PekerjaService>,
    pub export: Arc<ExportService>,
}

impl AppServices {
    /// Wires every service against one pool and the local disk storage.
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        let storage: Arc<dyn FileStorage> = Arc::new(LocalStorage::from_config(config));
        let max_upload = config.max_upload_bytes;

        let auth = Arc::new(AuthService::new(
            AuthConfig::from_app_config(config),
            db_pool.clone(),
        ));
        let barang = Arc::new(BarangService::new(
            db_pool.clone(),
            storage.clone(),
            max_upload,
        ));
        let jasa = Arc::new(JasaService::new(db_pool.clone(), storage.clone(), max_upload));
        let keranjang = Arc::new(KeranjangService::new(db_pool.clone(), storage.clone()));
        let transaksi = Arc::new(TransaksiService::new(
            db_pool.clone(),
            storage,
            config.payment_window(),
            max_upload,
        ));
        let interaksi = Arc::new(InteraksiService::new(db_pool.clone(), barang.clone()));
        let notifikasi = Arc::new(NotifikasiService::new(db_pool.clone()));
        let dashboard = Arc::new(DashboardService::new(
            db_pool.clone(),
            config.low_stock_threshold,
        ));
        let pekerja = Arc::new(PekerjaService::new(db_pool.clone()));
        let export = Arc::new(ExportService::new(db_pool));

        Self {
            auth,
            barang,
            jasa,
            keranjang,
            transaksi,
            interaksi,
            notifikasi,
            dashboard,
            pekerja,
            export,
        }
    }
}
