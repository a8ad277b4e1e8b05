use crate::{
    errors::ServiceError,
    services::transaksi::{TransaksiFilter, TransaksiService},
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{info, instrument};

pub const TRANSAKSI_CSV_HEADER: [&str; 8] = [
    "Kode Transaksi",
    "Nama Customer",
    "Email Customer",
    "Total Bayar",
    "Status",
    "Metode Pembayaran",
    "Tanggal Transaksi",
    "Tanggal Selesai",
];

fn format_tanggal(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Attachment name for an export generated at `now`
pub fn transaksi_csv_filename(now: DateTime<Utc>) -> String {
    format!("transaksi-{}.csv", now.format("%Y%m%d"))
}

#[derive(Clone)]
pub struct ExportService {
    db: Arc<DatabaseConnection>,
}

impl ExportService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Orders matching `filter` as CSV, newest first.
    #[instrument(skip(self))]
    pub async fn transaksi_csv(&self, filter: TransaksiFilter) -> Result<Vec<u8>, ServiceError> {
        let rows = TransaksiService::filtered_query(&*self.db, &filter)
            .await?
            .all(&*self.db)
            .await?;
        let customers = TransaksiService::customers_for(&*self.db, &rows).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(TRANSAKSI_CSV_HEADER).map_err(csv_error)?;

        for trx in &rows {
            let customer = customers.get(&trx.user_id);
            writer
                .write_record([
                    trx.kode_transaksi.clone(),
                    customer.map(|c| c.name.clone()).unwrap_or_default(),
                    customer.map(|c| c.email.clone()).unwrap_or_default(),
                    trx.total_bayar.to_string(),
                    trx.status.label().to_string(),
                    trx.metode_pembayaran.label().to_string(),
                    format_tanggal(trx.created_at),
                    trx.selesai_at.map(format_tanggal).unwrap_or_default(),
                ])
                .map_err(csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ServiceError::InternalError(format!("csv flush: {}", e)))?;
        info!(rows = rows.len(), "exported transaksi csv");
        Ok(bytes)
    }
}

fn csv_error(e: csv::Error) -> ServiceError {
    ServiceError::InternalError(format!("csv write: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        transaksi::{self, MetodePembayaran, StatusTransaksi},
        UserRole,
    };
    use crate::services::test_support::{insert_user, test_db};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use sea_orm::{ActiveModelTrait, Set};
    use uuid::Uuid;

    #[test]
    fn filename_uses_compact_date() {
        let now = Utc.with_ymd_and_hms(2024, 7, 3, 23, 59, 0).unwrap();
        assert_eq!(transaksi_csv_filename(now), "transaksi-20240703.csv");
    }

    #[tokio::test]
    async fn csv_starts_with_fixed_header_and_leaves_missing_dates_empty() {
        let db = test_db().await;
        let customer = insert_user(&db, "Budi Santoso", UserRole::User).await;
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        transaksi::ActiveModel {
            id: Set(Uuid::new_v4()),
            kode_transaksi: Set("TRX-20240501-ABC123".into()),
            user_id: Set(customer.id),
            items: Set(serde_json::json!([])),
            total_harga: Set(dec!(2880000)),
            diskon_total: Set(dec!(0)),
            total_bayar: Set(dec!(2880000)),
            status: Set(StatusTransaksi::Dibayar),
            metode_pembayaran: Set(MetodePembayaran::TransferBank),
            alamat_pengiriman: Set(None),
            catatan: Set(None),
            batas_pembayaran: Set(created),
            bukti_pembayaran: Set(None),
            dibayar_at: Set(Some(created)),
            diproses_at: Set(None),
            selesai_at: Set(None),
            dibatalkan_at: Set(None),
            alasan_batal: Set(None),
            created_at: Set(created),
            ..Default::default()
        }
        .insert(&*db)
        .await
        .unwrap();

        let bytes = ExportService::new(db)
            .transaksi_csv(TransaksiFilter::default())
            .await
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("Kode Transaksi,Nama Customer,Email Customer,Total Bayar,Status,Metode Pembayaran,Tanggal Transaksi,Tanggal Selesai")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("TRX-20240501-ABC123,Budi Santoso,budi.santoso@example.com,2880000"));
        assert!(row.ends_with(",Dibayar,Transfer Bank,2024-05-01 09:30:00,"));
        assert_eq!(lines.next(), None);
    }
}
