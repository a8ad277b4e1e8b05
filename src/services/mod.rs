// Catalogue
pub mod barang;
pub mod jasa;

// Customer flow
pub mod interaksi;
pub mod keranjang;
pub mod transaksi;

// Back office
pub mod dashboard;
pub mod export;
pub mod notifikasi;
pub mod pekerja;

pub use barang::BarangService;
pub use dashboard::DashboardService;
pub use export::ExportService;
pub use interaksi::InteraksiService;
pub use jasa::JasaService;
pub use keranjang::KeranjangService;
pub use notifikasi::{NewNotifikasi, NotifikasiService};
pub use pekerja::PekerjaService;
pub use transaksi::TransaksiService;

use crate::errors::ServiceError;
use std::future::Future;
use tracing::warn;

const MAX_OFFSET: u64 = i64::MAX as u64;

/// 1-based page window for list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Capped at `i64::MAX` so it always binds as a SQL bigint; an absurd
    /// page number yields an empty page.
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(MAX_OFFSET)
    }

    /// Cuts one page out of an already filtered and sorted collection.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// Case-insensitive substring match used by the in-memory filters
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Runs a read-then-insert write, retrying once when a concurrent request
/// claimed the same unique key in between. A second collision is a `Conflict`.
pub(crate) async fn retry_on_unique_violation<T, F, Fut>(
    what: &str,
    mut op: F,
) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    match op().await {
        Err(err) if err.is_unique_violation() => {
            warn!(what, "concurrent insert collided, retrying");
            op().await.map_err(|err| {
                if err.is_unique_violation() {
                    ServiceError::Conflict(format!("{} changed concurrently, please retry", what))
                } else {
                    err
                }
            })
        }
        other => other,
    }
}
