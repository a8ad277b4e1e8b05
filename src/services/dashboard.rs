use crate::{
    entities::{
        barang, user, Barang, Jasa, Pekerja, StatusPekerja, StatusTransaksi, Transaksi, User,
        UserRole,
    },
    errors::ServiceError,
    services::{
        barang::{BarangService, BarangStats},
        notifikasi::NotifikasiService,
        transaksi::{CustomerRef, TransaksiService},
    },
};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

const TOP_N: usize = 5;
const MONTHS: u32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendapatanBulanan {
    /// `YYYY-MM`
    pub bulan: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarangRanking {
    pub barang_id: Uuid,
    pub kode_barang: String,
    pub nama_barang: String,
    pub nilai: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StokMenipis {
    pub barang_id: Uuid,
    pub kode_barang: String,
    pub nama_barang: String,
    pub stok: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransaksiRingkas {
    pub id: Uuid,
    pub kode_transaksi: String,
    pub customer: Option<CustomerRef>,
    pub total_bayar: Decimal,
    pub status: StatusTransaksi,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_barang: u64,
    pub total_jasa: u64,
    pub total_pelanggan: u64,
    pub total_transaksi: u64,
    pub transaksi_per_status: BTreeMap<String, u64>,
    pub total_pendapatan: Decimal,
    pub pendapatan_bulanan: Vec<PendapatanBulanan>,
    pub barang_terlaris: Vec<BarangRanking>,
    pub barang_terpopuler: Vec<BarangRanking>,
    pub barang_rating_tertinggi: Vec<BarangRanking>,
    pub stok_menipis: Vec<StokMenipis>,
    pub transaksi_terbaru: Vec<TransaksiRingkas>,
    pub notifikasi_belum_dibaca: u64,
    pub status_pekerja: BTreeMap<String, u64>,
}

/// Last `count` calendar months ending at `now`, oldest first, as `YYYY-MM`.
pub fn month_keys(now: DateTime<Utc>, count: u32) -> Vec<String> {
    let mut year = now.year();
    let mut month = now.month();
    let mut keys = Vec::with_capacity(count as usize);
    for _ in 0..count {
        keys.push(format!("{:04}-{:02}", year, month));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    keys.reverse();
    keys
}

/// Highest score first; equal scores fall back to `kode_barang`.
fn ranking(
    barang: &HashMap<Uuid, barang::Model>,
    scored: Vec<(Uuid, Decimal)>,
) -> Vec<BarangRanking> {
    let mut ranked: Vec<BarangRanking> = scored
        .into_iter()
        .filter_map(|(id, nilai)| {
            barang.get(&id).map(|b| BarangRanking {
                barang_id: id,
                kode_barang: b.kode_barang.clone(),
                nama_barang: b.nama_barang.clone(),
                nilai,
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.nilai
            .cmp(&a.nilai)
            .then_with(|| a.kode_barang.cmp(&b.kode_barang))
    });
    ranked.truncate(TOP_N);
    ranked
}

/// Read-only back-office overview, aggregated in memory.
#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DatabaseConnection>,
    low_stock_threshold: i32,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseConnection>, low_stock_threshold: i32) -> Self {
        Self {
            db,
            low_stock_threshold,
        }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<DashboardSummary, ServiceError> {
        let db = &*self.db;
        let now = Utc::now();

        let barang: HashMap<Uuid, barang::Model> = Barang::find()
            .all(db)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();
        let total_jasa = Jasa::find().count(db).await?;
        let total_pelanggan = User::find()
            .filter(user::Column::Role.eq(UserRole::User))
            .count(db)
            .await?;
        let transaksi = Transaksi::find()
            .order_by_desc(crate::entities::transaksi::Column::CreatedAt)
            .all(db)
            .await?;

        let mut transaksi_per_status: BTreeMap<String, u64> = StatusTransaksi::ALL
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        let mut pendapatan: BTreeMap<String, Decimal> = month_keys(now, MONTHS)
            .into_iter()
            .map(|k| (k, Decimal::ZERO))
            .collect();
        let mut total_pendapatan = Decimal::ZERO;
        let mut terjual: HashMap<Uuid, Decimal> = HashMap::new();

        for trx in &transaksi {
            *transaksi_per_status.entry(trx.status.to_string()).or_default() += 1;

            if trx.status.is_revenue() {
                total_pendapatan += trx.total_bayar;
                let key = trx.created_at.format("%Y-%m").to_string();
                if let Some(bucket) = pendapatan.get_mut(&key) {
                    *bucket += trx.total_bayar;
                }
            }
            if trx.status != StatusTransaksi::Dibatalkan {
                for item in trx.item_snapshots() {
                    *terjual.entry(item.barang_id).or_default() += Decimal::from(item.jumlah);
                }
            }
        }

        let stats: HashMap<Uuid, BarangStats> = BarangService::load_stats(db, None).await?;
        let terpopuler = stats
            .iter()
            .filter(|(_, s)| s.total_likes > 0)
            .map(|(id, s)| (*id, Decimal::from(s.total_likes)))
            .collect();
        let rating = stats
            .iter()
            .filter(|(_, s)| s.total_feedback > 0)
            .map(|(id, s)| {
                (
                    *id,
                    Decimal::from_f64_retain(s.average_rating)
                        .unwrap_or_default()
                        .round_dp(2),
                )
            })
            .collect();

        let mut stok_menipis: Vec<StokMenipis> = barang
            .values()
            .filter(|b| b.display && b.stok <= self.low_stock_threshold)
            .map(|b| StokMenipis {
                barang_id: b.id,
                kode_barang: b.kode_barang.clone(),
                nama_barang: b.nama_barang.clone(),
                stok: b.stok,
            })
            .collect();
        stok_menipis.sort_by(|a, b| a.stok.cmp(&b.stok).then_with(|| a.kode_barang.cmp(&b.kode_barang)));

        let terbaru: Vec<_> = transaksi.iter().take(TOP_N).cloned().collect();
        let customers = TransaksiService::customers_for(db, &terbaru).await?;
        let transaksi_terbaru = terbaru
            .into_iter()
            .map(|t| TransaksiRingkas {
                customer: customers.get(&t.user_id).map(CustomerRef::from),
                id: t.id,
                kode_transaksi: t.kode_transaksi,
                total_bayar: t.total_bayar,
                status: t.status,
                created_at: t.created_at,
            })
            .collect();

        let mut status_pekerja: BTreeMap<String, u64> = StatusPekerja::ALL
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        for worker in Pekerja::find().all(db).await? {
            *status_pekerja.entry(worker.status.to_string()).or_default() += 1;
        }

        let notifikasi_belum_dibaca = NotifikasiService::new(self.db.clone())
            .admin_unread_count()
            .await?;

        Ok(DashboardSummary {
            total_barang: barang.len() as u64,
            total_jasa,
            total_pelanggan,
            total_transaksi: transaksi.len() as u64,
            transaksi_per_status,
            total_pendapatan,
            pendapatan_bulanan: pendapatan
                .into_iter()
                .map(|(bulan, total)| PendapatanBulanan { bulan, total })
                .collect(),
            barang_terlaris: ranking(&barang, terjual.into_iter().collect()),
            barang_terpopuler: ranking(&barang, terpopuler),
            barang_rating_tertinggi: ranking(&barang, rating),
            stok_menipis,
            transaksi_terbaru,
            notifikasi_belum_dibaca,
            status_pekerja,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::transaksi::{self, MetodePembayaran};
    use crate::services::test_support::{insert_barang, insert_user, test_db};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use sea_orm::{ActiveModelTrait, Set};
    use serde_json::json;

    #[test]
    fn month_keys_cross_year_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 8, 0, 0).unwrap();
        let keys = month_keys(now, 12);
        assert_eq!(keys.len(), 12);
        assert_eq!(keys.first().map(String::as_str), Some("2023-03"));
        assert_eq!(keys.last().map(String::as_str), Some("2024-02"));
    }

    #[tokio::test]
    async fn ranking_ties_fall_back_to_kode() {
        let db = test_db().await;
        let mut barang = HashMap::new();
        let mut scored = Vec::new();
        for kode in ["AC-006", "AC-004", "AC-002", "AC-005", "AC-003", "AC-001"] {
            let b = insert_barang(&db, kode, dec!(1000), 0, 5).await;
            let nilai = if kode == "AC-006" { dec!(3) } else { dec!(1) };
            scored.push((b.id, nilai));
            barang.insert(b.id, b);
        }

        let ranked: Vec<String> = ranking(&barang, scored.clone())
            .into_iter()
            .map(|r| r.kode_barang)
            .collect();
        assert_eq!(ranked, vec!["AC-006", "AC-001", "AC-002", "AC-003", "AC-004"]);

        scored.reverse();
        let again: Vec<String> = ranking(&barang, scored)
            .into_iter()
            .map(|r| r.kode_barang)
            .collect();
        assert_eq!(again, ranked);
    }

    async fn insert_trx(
        db: &DatabaseConnection,
        user_id: Uuid,
        barang_id: Uuid,
        status: StatusTransaksi,
        total: Decimal,
        jumlah: i32,
    ) {
        transaksi::ActiveModel {
            id: Set(Uuid::new_v4()),
            kode_transaksi: Set(format!("TRX-{}", Uuid::new_v4().simple())),
            user_id: Set(user_id),
            items: Set(json!([{
                "barang_id": barang_id,
                "kode_barang": "AC-001",
                "nama_barang": "AC",
                "kategori": "AC Split",
                "harga_jual": "1000",
                "diskon": 0,
                "harga_setelah_diskon": "1000",
                "jumlah": jumlah,
                "subtotal": "1000",
            }])),
            total_harga: Set(total),
            diskon_total: Set(Decimal::ZERO),
            total_bayar: Set(total),
            status: Set(status),
            metode_pembayaran: Set(MetodePembayaran::Qris),
            alamat_pengiriman: Set(None),
            catatan: Set(None),
            batas_pembayaran: Set(Utc::now()),
            bukti_pembayaran: Set(None),
            dibayar_at: Set(None),
            diproses_at: Set(None),
            selesai_at: Set(None),
            dibatalkan_at: Set(None),
            alasan_batal: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn summary_counts_revenue_statuses_only() {
        let db = test_db().await;
        let customer = insert_user(&db, "Budi", UserRole::User).await;
        insert_user(&db, "Admin", UserRole::Admin).await;
        let barang = insert_barang(&db, "AC-001", dec!(1000), 0, 2).await;

        insert_trx(&db, customer.id, barang.id, StatusTransaksi::Selesai, dec!(500000), 3).await;
        insert_trx(&db, customer.id, barang.id, StatusTransaksi::Dibayar, dec!(250000), 1).await;
        insert_trx(&db, customer.id, barang.id, StatusTransaksi::Dibatalkan, dec!(900000), 7).await;
        insert_trx(&db, customer.id, barang.id, StatusTransaksi::MenungguPembayaran, dec!(1), 1).await;

        let summary = DashboardService::new(db, 5).summary().await.unwrap();

        assert_eq!(summary.total_pelanggan, 1);
        assert_eq!(summary.total_transaksi, 4);
        assert_eq!(summary.total_pendapatan, dec!(750000));
        assert_eq!(summary.transaksi_per_status["diproses"], 0);
        assert_eq!(summary.transaksi_per_status["selesai"], 1);
        assert_eq!(summary.pendapatan_bulanan.len(), 12);
        assert_eq!(summary.pendapatan_bulanan[11].total, dec!(750000));
        assert_eq!(summary.barang_terlaris[0].nilai, dec!(5));
        assert_eq!(summary.stok_menipis.len(), 1);
        assert_eq!(summary.status_pekerja["standby"], 0);
        assert_eq!(summary.transaksi_terbaru.len(), 4);
    }
}
