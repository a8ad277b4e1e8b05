use crate::{
    entities::{
        barang,
        notifikasi::TipeNotifikasi,
        transaksi::{self, ItemSnapshot, MetodePembayaran, StatusTransaksi},
        user, Barang, Keranjang, Transaksi, User,
    },
    errors::ServiceError,
    services::{
        keranjang::KeranjangService,
        notifikasi::{NewNotifikasi, NotifikasiService},
        PageRequest,
    },
    storage::{validate_upload, FileStorage, UploadKind, UploadedFile, BUKTI_PEMBAYARAN_DIR},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::RngCore;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

pub const ALASAN_DIBATALKAN_PELANGGAN: &str = "dibatalkan oleh pelanggan";
pub const ALASAN_KEDALUWARSA: &str = "batas pembayaran terlewati";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutInput {
    pub metode_pembayaran: MetodePembayaran,
    #[validate(length(max = 500, message = "The alamat_pengiriman may not be greater than 500 characters"))]
    pub alamat_pengiriman: Option<String>,
    #[validate(length(max = 1000, message = "The catatan may not be greater than 1000 characters"))]
    pub catatan: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusInput {
    pub status: StatusTransaksi,
    pub alasan_batal: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TransaksiFilter {
    pub status: Option<StatusTransaksi>,
    /// Matches the order code or the customer's name or email
    pub search: Option<String>,
    pub dari: Option<NaiveDate>,
    pub sampai: Option<NaiveDate>,
}

/// Customer identity carried on order responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&user::Model> for CustomerRef {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransaksiResponse {
    pub id: Uuid,
    pub kode_transaksi: String,
    pub customer: Option<CustomerRef>,
    pub items: Vec<ItemSnapshot>,
    pub total_harga: Decimal,
    pub diskon_total: Decimal,
    pub total_bayar: Decimal,
    pub status: StatusTransaksi,
    pub status_label: String,
    pub metode_pembayaran: MetodePembayaran,
    pub alamat_pengiriman: Option<String>,
    pub catatan: Option<String>,
    pub batas_pembayaran: DateTime<Utc>,
    pub bukti_pembayaran: Option<String>,
    pub bukti_pembayaran_url: Option<String>,
    pub dibayar_at: Option<DateTime<Utc>>,
    pub diproses_at: Option<DateTime<Utc>>,
    pub selesai_at: Option<DateTime<Utc>>,
    pub dibatalkan_at: Option<DateTime<Utc>>,
    pub alasan_batal: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Totals over snapshot lines: `(total_harga, diskon_total, total_bayar)`
pub fn totals(items: &[ItemSnapshot]) -> (Decimal, Decimal, Decimal) {
    let mut total_harga = Decimal::ZERO;
    let mut diskon_total = Decimal::ZERO;
    for item in items {
        let qty = Decimal::from(item.jumlah);
        total_harga += item.harga_jual * qty;
        diskon_total += (item.harga_jual - item.harga_setelah_diskon) * qty;
    }
    (total_harga, diskon_total, total_harga - diskon_total)
}

fn generate_kode(now: DateTime<Utc>) -> String {
    let mut suffix = [0u8; 3];
    rand::thread_rng().fill_bytes(&mut suffix);
    format!("TRX-{}-{}", now.format("%Y%m%d"), hex::encode_upper(suffix))
}

fn status_data(trx: &transaksi::Model, old: StatusTransaksi) -> serde_json::Value {
    json!({
        "transaksi_id": trx.id,
        "kode_transaksi": trx.kode_transaksi,
        "status_lama": old,
        "status_baru": trx.status,
    })
}

/// Order lifecycle from checkout to completion or cancellation.
#[derive(Clone)]
pub struct TransaksiService {
    db: Arc<DatabaseConnection>,
    storage: Arc<dyn FileStorage>,
    payment_window: Duration,
    max_upload_bytes: usize,
}

impl TransaksiService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        storage: Arc<dyn FileStorage>,
        payment_window: Duration,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            db,
            storage,
            payment_window,
            max_upload_bytes,
        }
    }

    /// Turns the cart into an order. Stock is checked and decremented in the
    /// same transaction that snapshots the lines and empties the cart.
    #[instrument(skip(self, input))]
    pub async fn checkout(
        &self,
        user_id: Uuid,
        input: CheckoutInput,
    ) -> Result<TransaksiResponse, ServiceError> {
        input.validate()?;
        let now = Utc::now();

        let txn = self.db.begin().await?;
        let customer = User::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;
        let lines = KeranjangService::lines_with_barang(&txn, user_id).await?;

        let mut items = Vec::with_capacity(lines.len());
        for (line, barang) in &lines {
            if !barang.display {
                return Err(ServiceError::InvalidOperation(format!(
                    "{} is no longer available, remove it from your cart",
                    barang.nama_barang
                )));
            }
            if line.jumlah > barang.stok {
                return Err(ServiceError::InsufficientStock(format!(
                    "Only {} left for {}",
                    barang.stok, barang.nama_barang
                )));
            }

            let decremented = Barang::update_many()
                .col_expr(
                    barang::Column::Stok,
                    Expr::col(barang::Column::Stok).sub(line.jumlah),
                )
                .filter(barang::Column::Id.eq(barang.id))
                .filter(barang::Column::Stok.gte(line.jumlah))
                .exec(&txn)
                .await?;
            if decremented.rows_affected != 1 {
                return Err(ServiceError::InsufficientStock(format!(
                    "Stock for {} changed, please review your cart",
                    barang.nama_barang
                )));
            }

            let harga_setelah_diskon = barang.harga_setelah_diskon();
            items.push(ItemSnapshot {
                barang_id: barang.id,
                kode_barang: barang.kode_barang.clone(),
                nama_barang: barang.nama_barang.clone(),
                kategori: barang.kategori.clone(),
                harga_jual: barang.harga_jual,
                diskon: barang.diskon,
                harga_setelah_diskon,
                jumlah: line.jumlah,
                subtotal: harga_setelah_diskon * Decimal::from(line.jumlah),
            });
        }

        let (total_harga, diskon_total, total_bayar) = totals(&items);
        let items_json = serde_json::to_value(&items)
            .map_err(|e| ServiceError::InternalError(format!("item snapshot: {}", e)))?;

        let alamat = input
            .alamat_pengiriman
            .filter(|a| !a.trim().is_empty())
            .or_else(|| customer.alamat.clone());

        let trx = transaksi::ActiveModel {
            id: Set(Uuid::new_v4()),
            kode_transaksi: Set(generate_kode(now)),
            user_id: Set(user_id),
            items: Set(items_json),
            total_harga: Set(total_harga),
            diskon_total: Set(diskon_total),
            total_bayar: Set(total_bayar),
            status: Set(StatusTransaksi::MenungguPembayaran),
            metode_pembayaran: Set(input.metode_pembayaran),
            alamat_pengiriman: Set(alamat),
            catatan: Set(input.catatan),
            batas_pembayaran: Set(now + self.payment_window),
            bukti_pembayaran: Set(None),
            dibayar_at: Set(None),
            diproses_at: Set(None),
            selesai_at: Set(None),
            dibatalkan_at: Set(None),
            alasan_batal: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        Keranjang::delete_many()
            .filter(crate::entities::keranjang::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(
            transaksi_id = %trx.id,
            kode = %trx.kode_transaksi,
            total_bayar = %trx.total_bayar,
            "checkout completed"
        );
        Ok(self.to_response(trx, Some(&customer)))
    }

    /// Moves an order to `target` on `conn`: validates the step, stamps the
    /// matching timestamp and puts stock back when cancelling.
    async fn transition<C>(
        conn: &C,
        trx: transaksi::Model,
        target: StatusTransaksi,
        alasan_batal: Option<String>,
    ) -> Result<transaksi::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        if !trx.status.can_transition_to(target) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot change transaksi {} from {} to {}",
                trx.kode_transaksi, trx.status, target
            )));
        }

        let now = Utc::now();
        let snapshots = trx.item_snapshots();
        let mut active: transaksi::ActiveModel = trx.into();
        active.status = Set(target);
        match target {
            StatusTransaksi::Dibayar => active.dibayar_at = Set(Some(now)),
            StatusTransaksi::Diproses => active.diproses_at = Set(Some(now)),
            StatusTransaksi::Selesai => active.selesai_at = Set(Some(now)),
            StatusTransaksi::Dibatalkan => {
                active.dibatalkan_at = Set(Some(now));
                active.alasan_batal = Set(alasan_batal);
                for item in &snapshots {
                    // Products deleted since checkout simply match no row.
                    Barang::update_many()
                        .col_expr(
                            barang::Column::Stok,
                            Expr::col(barang::Column::Stok).add(item.jumlah),
                        )
                        .filter(barang::Column::Id.eq(item.barang_id))
                        .exec(conn)
                        .await?;
                }
            }
            StatusTransaksi::MenungguPembayaran => {}
        }

        Ok(active.update(conn).await?)
    }

    /// Applies a status change and tells the customer about it, atomically.
    async fn change_status(
        &self,
        id: Uuid,
        target: StatusTransaksi,
        alasan_batal: Option<String>,
    ) -> Result<transaksi::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let trx = Self::find_in(&txn, id).await?;
        let old = trx.status;
        let updated = Self::transition(&txn, trx, target, alasan_batal).await?;

        NotifikasiService::record(
            &txn,
            NewNotifikasi::for_user(
                updated.user_id,
                TipeNotifikasi::StatusTransaksi,
                "Status transaksi diperbarui",
                format!(
                    "Transaksi {} berubah dari {} menjadi {}",
                    updated.kode_transaksi,
                    old.label(),
                    updated.status.label()
                ),
            )
            .with_data(status_data(&updated, old)),
        )
        .await?;
        txn.commit().await?;

        info!(
            transaksi_id = %id,
            status_lama = %old,
            status_baru = %updated.status,
            "transaksi status changed"
        );
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        input: UpdateStatusInput,
    ) -> Result<TransaksiResponse, ServiceError> {
        self.expire_overdue().await?;
        let alasan = input
            .alasan_batal
            .filter(|a| !a.trim().is_empty())
            .or_else(|| {
                (input.status == StatusTransaksi::Dibatalkan)
                    .then(|| "dibatalkan oleh admin".to_string())
            });
        let updated = self.change_status(id, input.status, alasan).await?;
        self.single(updated).await
    }

    #[instrument(skip(self))]
    pub async fn cancel_by_customer(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<TransaksiResponse, ServiceError> {
        self.expire_overdue().await?;
        let trx = self.find_owned(user_id, id).await?;
        if trx.status != StatusTransaksi::MenungguPembayaran {
            return Err(ServiceError::InvalidStatus(format!(
                "Transaksi {} can no longer be cancelled",
                trx.kode_transaksi
            )));
        }

        let updated = self
            .change_status(
                id,
                StatusTransaksi::Dibatalkan,
                Some(ALASAN_DIBATALKAN_PELANGGAN.to_string()),
            )
            .await?;
        self.single(updated).await
    }

    /// Stores the payment proof and marks the order paid. Status change and
    /// the admin notification commit together.
    #[instrument(skip(self, file))]
    pub async fn upload_bukti(
        &self,
        user_id: Uuid,
        id: Uuid,
        file: UploadedFile,
    ) -> Result<TransaksiResponse, ServiceError> {
        validate_upload(&file, UploadKind::PaymentProof, self.max_upload_bytes).into_result()?;

        let trx = self.find_owned(user_id, id).await?;
        if trx.is_expired(Utc::now()) {
            self.change_status(
                id,
                StatusTransaksi::Dibatalkan,
                Some(ALASAN_KEDALUWARSA.to_string()),
            )
            .await?;
            return Err(ServiceError::InvalidStatus(format!(
                "Payment deadline for {} has passed",
                trx.kode_transaksi
            )));
        }
        if trx.status != StatusTransaksi::MenungguPembayaran {
            return Err(ServiceError::InvalidStatus(format!(
                "Transaksi {} is not awaiting payment",
                trx.kode_transaksi
            )));
        }

        let path = self
            .storage
            .save(BUKTI_PEMBAYARAN_DIR, &file.file_name, &file.content)
            .await?;

        match self.record_payment(id, &path).await {
            Ok(updated) => {
                info!(transaksi_id = %id, "payment proof uploaded");
                self.single(updated).await
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&path).await {
                    warn!(path = %path, error = %cleanup, "failed to remove payment proof");
                }
                Err(e)
            }
        }
    }

    async fn record_payment(&self, id: Uuid, path: &str) -> Result<transaksi::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let trx = Self::find_in(&txn, id).await?;
        let old = trx.status;

        let paid = Self::transition(&txn, trx, StatusTransaksi::Dibayar, None).await?;
        let mut active: transaksi::ActiveModel = paid.into();
        active.bukti_pembayaran = Set(Some(path.to_string()));
        let updated = active.update(&txn).await?;

        let customer = User::find_by_id(updated.user_id).one(&txn).await?;
        NotifikasiService::record(
            &txn,
            NewNotifikasi::admin(
                TipeNotifikasi::Pembayaran,
                "Bukti pembayaran diterima",
                format!(
                    "{} mengunggah bukti pembayaran untuk {}",
                    customer.map(|c| c.name).unwrap_or_else(|| "Pelanggan".to_string()),
                    updated.kode_transaksi
                ),
            )
            .with_data(status_data(&updated, old)),
        )
        .await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Cancels every unpaid order past its deadline and returns how many.
    /// Each cancellation commits on its own.
    #[instrument(skip(self))]
    pub async fn expire_overdue(&self) -> Result<u64, ServiceError> {
        let overdue = Transaksi::find()
            .filter(transaksi::Column::Status.eq(StatusTransaksi::MenungguPembayaran))
            .filter(transaksi::Column::BatasPembayaran.lt(Utc::now()))
            .all(&*self.db)
            .await?;

        let mut expired = 0;
        for trx in overdue {
            match self
                .change_status(
                    trx.id,
                    StatusTransaksi::Dibatalkan,
                    Some(ALASAN_KEDALUWARSA.to_string()),
                )
                .await
            {
                Ok(_) => expired += 1,
                // Paid or cancelled concurrently
                Err(ServiceError::InvalidStatus(_)) => {}
                Err(e) => {
                    error!(transaksi_id = %trx.id, error = %e, "failed to expire transaksi");
                    return Err(e);
                }
            }
        }

        if expired > 0 {
            info!(expired, "expired overdue transaksi");
        }
        Ok(expired)
    }

    async fn find_in<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<transaksi::Model, ServiceError> {
        Transaksi::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transaksi {} not found", id)))
    }

    async fn find_owned(&self, user_id: Uuid, id: Uuid) -> Result<transaksi::Model, ServiceError> {
        Transaksi::find_by_id(id)
            .filter(transaksi::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transaksi {} not found", id)))
    }

    fn to_response(&self, trx: transaksi::Model, customer: Option<&user::Model>) -> TransaksiResponse {
        let items = trx.item_snapshots();
        TransaksiResponse {
            id: trx.id,
            kode_transaksi: trx.kode_transaksi,
            customer: customer.map(CustomerRef::from),
            items,
            total_harga: trx.total_harga,
            diskon_total: trx.diskon_total,
            total_bayar: trx.total_bayar,
            status_label: trx.status.label().to_string(),
            status: trx.status,
            metode_pembayaran: trx.metode_pembayaran,
            alamat_pengiriman: trx.alamat_pengiriman,
            catatan: trx.catatan,
            batas_pembayaran: trx.batas_pembayaran,
            bukti_pembayaran_url: trx
                .bukti_pembayaran
                .as_deref()
                .map(|p| self.storage.public_url(p)),
            bukti_pembayaran: trx.bukti_pembayaran,
            dibayar_at: trx.dibayar_at,
            diproses_at: trx.diproses_at,
            selesai_at: trx.selesai_at,
            dibatalkan_at: trx.dibatalkan_at,
            alasan_batal: trx.alasan_batal,
            created_at: trx.created_at,
            updated_at: trx.updated_at,
        }
    }

    async fn to_responses(
        &self,
        models: Vec<transaksi::Model>,
    ) -> Result<Vec<TransaksiResponse>, ServiceError> {
        let users = Self::customers_for(&*self.db, &models).await?;
        Ok(models
            .into_iter()
            .map(|m| {
                let customer = users.get(&m.user_id);
                self.to_response(m, customer)
            })
            .collect())
    }

    async fn single(&self, model: transaksi::Model) -> Result<TransaksiResponse, ServiceError> {
        let customer = User::find_by_id(model.user_id).one(&*self.db).await?;
        Ok(self.to_response(model, customer.as_ref()))
    }

    pub(crate) async fn customers_for<C: ConnectionTrait>(
        conn: &C,
        models: &[transaksi::Model],
    ) -> Result<HashMap<Uuid, user::Model>, ServiceError> {
        let mut ids: Vec<Uuid> = models.iter().map(|m| m.user_id).collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(User::find()
            .filter(user::Column::Id.is_in(ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect())
    }

    /// Base query for admin listings and the CSV export.
    pub(crate) async fn filtered_query<C: ConnectionTrait>(
        conn: &C,
        filter: &TransaksiFilter,
    ) -> Result<Select<Transaksi>, ServiceError> {
        let mut query = Transaksi::find();
        if let Some(status) = filter.status {
            query = query.filter(transaksi::Column::Status.eq(status));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let user_ids: Vec<Uuid> = User::find()
                .select_only()
                .column(user::Column::Id)
                .filter(
                    Condition::any()
                        .add(user::Column::Name.contains(search))
                        .add(user::Column::Email.contains(search)),
                )
                .into_tuple::<Uuid>()
                .all(conn)
                .await?;
            let mut condition =
                Condition::any().add(transaksi::Column::KodeTransaksi.contains(search));
            if !user_ids.is_empty() {
                condition = condition.add(transaksi::Column::UserId.is_in(user_ids));
            }
            query = query.filter(condition);
        }
        if let Some(dari) = filter.dari.and_then(|d| d.and_hms_opt(0, 0, 0)) {
            query = query.filter(transaksi::Column::CreatedAt.gte(dari.and_utc()));
        }
        if let Some(sampai) = filter
            .sampai
            .and_then(|d| d.succ_opt())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            query = query.filter(transaksi::Column::CreatedAt.lt(sampai.and_utc()));
        }
        Ok(query.order_by_desc(transaksi::Column::CreatedAt))
    }

    #[instrument(skip(self))]
    pub async fn history(
        &self,
        user_id: Uuid,
        status: Option<StatusTransaksi>,
        page: PageRequest,
    ) -> Result<(Vec<TransaksiResponse>, u64), ServiceError> {
        self.expire_overdue().await?;
        let mut query = Transaksi::find().filter(transaksi::Column::UserId.eq(user_id));
        if let Some(status) = status {
            query = query.filter(transaksi::Column::Status.eq(status));
        }

        let total = query.clone().count(&*self.db).await?;
        let models = query
            .order_by_desc(transaksi::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit)
            .all(&*self.db)
            .await?;
        Ok((self.to_responses(models).await?, total))
    }

    #[instrument(skip(self))]
    pub async fn detail_for_user(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<TransaksiResponse, ServiceError> {
        self.expire_overdue().await?;
        let trx = self.find_owned(user_id, id).await?;
        self.single(trx).await
    }

    #[instrument(skip(self))]
    pub async fn track(
        &self,
        user_id: Uuid,
        kode_transaksi: &str,
    ) -> Result<TransaksiResponse, ServiceError> {
        self.expire_overdue().await?;
        let trx = Transaksi::find()
            .filter(transaksi::Column::KodeTransaksi.eq(kode_transaksi))
            .filter(transaksi::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Transaksi {} not found", kode_transaksi))
            })?;
        self.single(trx).await
    }

    #[instrument(skip(self))]
    pub async fn admin_list(
        &self,
        filter: TransaksiFilter,
        page: PageRequest,
    ) -> Result<(Vec<TransaksiResponse>, u64), ServiceError> {
        self.expire_overdue().await?;
        let query = Self::filtered_query(&*self.db, &filter).await?;
        let total = query.clone().count(&*self.db).await?;
        let models = query
            .offset(page.offset())
            .limit(page.limit)
            .all(&*self.db)
            .await?;
        Ok((self.to_responses(models).await?, total))
    }

    #[instrument(skip(self))]
    pub async fn admin_detail(&self, id: Uuid) -> Result<TransaksiResponse, ServiceError> {
        self.expire_overdue().await?;
        let trx = Self::find_in(&*self.db, id).await?;
        self.single(trx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{notifikasi, Notifikasi, UserRole};
    use crate::services::keranjang::AddToCartInput;
    use crate::services::test_support::{insert_barang, insert_user, test_db};
    use crate::storage::LocalStorage;
    use bytes::Bytes;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        db: Arc<DatabaseConnection>,
        cart: KeranjangService,
        service: TransaksiService,
    }

    async fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let db = test_db().await;
        let storage: Arc<dyn FileStorage> = Arc::new(LocalStorage::new(dir.path(), "/storage"));
        Fixture {
            cart: KeranjangService::new(db.clone(), storage.clone()),
            service: TransaksiService::new(db.clone(), storage, Duration::hours(24), 1024),
            db,
            dir,
        }
    }

    fn checkout_input() -> CheckoutInput {
        CheckoutInput {
            metode_pembayaran: MetodePembayaran::TransferBank,
            alamat_pengiriman: Some("Jl. Merdeka 1, Bandung".into()),
            catatan: None,
        }
    }

    async fn stok(db: &DatabaseConnection, id: Uuid) -> i32 {
        Barang::find_by_id(id).one(db).await.unwrap().unwrap().stok
    }

    async fn status_notifications(db: &DatabaseConnection) -> Vec<notifikasi::Model> {
        Notifikasi::find()
            .filter(notifikasi::Column::Tipe.eq(TipeNotifikasi::StatusTransaksi))
            .all(db)
            .await
            .unwrap()
    }

    async fn checked_out(f: &Fixture) -> (user::Model, barang::Model, TransaksiResponse) {
        let customer = insert_user(&f.db, "Budi", UserRole::User).await;
        let barang = insert_barang(&f.db, "AC-001", dec!(3200000), 10, 5).await;
        f.cart
            .add(customer.id, AddToCartInput { barang_id: barang.id, jumlah: 2 })
            .await
            .unwrap();
        let trx = f.service.checkout(customer.id, checkout_input()).await.unwrap();
        (customer, barang, trx)
    }

    #[tokio::test]
    async fn checkout_snapshots_lines_and_decrements_stock() {
        let f = fixture().await;
        let (customer, barang, trx) = checked_out(&f).await;

        assert_eq!(trx.status, StatusTransaksi::MenungguPembayaran);
        assert_eq!(trx.total_harga, dec!(6400000));
        assert_eq!(trx.diskon_total, dec!(640000));
        assert_eq!(trx.total_bayar, trx.total_harga - trx.diskon_total);
        assert_eq!(trx.items[0].subtotal, dec!(5760000));
        assert!(trx.kode_transaksi.starts_with("TRX-"));
        assert_eq!(stok(&f.db, barang.id).await, 3);
        assert!(f.cart.list(customer.id).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn empty_cart_cannot_check_out() {
        let f = fixture().await;
        let customer = insert_user(&f.db, "Budi", UserRole::User).await;
        let err = f.service.checkout(customer.id, checkout_input()).await.unwrap_err();
        assert!(matches!(err, ServiceError::FieldErrors(_)));
    }

    #[tokio::test]
    async fn checkout_fails_when_stock_dropped_below_cart() {
        let f = fixture().await;
        let customer = insert_user(&f.db, "Budi", UserRole::User).await;
        let barang = insert_barang(&f.db, "AC-001", dec!(1000), 0, 3).await;
        f.cart
            .add(customer.id, AddToCartInput { barang_id: barang.id, jumlah: 3 })
            .await
            .unwrap();

        let mut active: barang::ActiveModel = barang.clone().into();
        active.stok = Set(1);
        active.update(&*f.db).await.unwrap();

        let err = f.service.checkout(customer.id, checkout_input()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientStock(_)));
        assert_eq!(stok(&f.db, barang.id).await, 1);
        assert_eq!(Transaksi::find().count(&*f.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn checkout_refuses_product_hidden_after_adding() {
        let f = fixture().await;
        let customer = insert_user(&f.db, "Budi", UserRole::User).await;
        let barang = insert_barang(&f.db, "AC-001", dec!(1000), 0, 3).await;
        f.cart
            .add(customer.id, AddToCartInput { barang_id: barang.id, jumlah: 2 })
            .await
            .unwrap();

        let mut active: barang::ActiveModel = barang.clone().into();
        active.display = Set(false);
        active.update(&*f.db).await.unwrap();

        let err = f.service.checkout(customer.id, checkout_input()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(stok(&f.db, barang.id).await, 3);
        assert_eq!(Transaksi::find().count(&*f.db).await.unwrap(), 0);
        assert_eq!(Keranjang::find().count(&*f.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn status_change_writes_one_notification_with_both_statuses() {
        let f = fixture().await;
        let (customer, _barang, trx) = checked_out(&f).await;

        f.service
            .update_status(
                trx.id,
                UpdateStatusInput { status: StatusTransaksi::Dibayar, alasan_batal: None },
            )
            .await
            .unwrap();

        let notes = status_notifications(&f.db).await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].user_id, Some(customer.id));
        let data = notes[0].data.clone().unwrap();
        assert_eq!(data["transaksi_id"], json!(trx.id));
        assert_eq!(data["status_lama"], "menunggu_pembayaran");
        assert_eq!(data["status_baru"], "dibayar");
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected_without_side_effects() {
        let f = fixture().await;
        let (_customer, _barang, trx) = checked_out(&f).await;

        let err = f
            .service
            .update_status(
                trx.id,
                UpdateStatusInput { status: StatusTransaksi::Selesai, alasan_batal: None },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidStatus(_)));
        assert!(status_notifications(&f.db).await.is_empty());
        let reloaded = Transaksi::find_by_id(trx.id).one(&*f.db).await.unwrap().unwrap();
        assert_eq!(reloaded.status, StatusTransaksi::MenungguPembayaran);
    }

    #[tokio::test]
    async fn cancelling_restores_stock() {
        let f = fixture().await;
        let (customer, barang, trx) = checked_out(&f).await;

        let cancelled = f.service.cancel_by_customer(customer.id, trx.id).await.unwrap();

        assert_eq!(cancelled.status, StatusTransaksi::Dibatalkan);
        assert_eq!(cancelled.alasan_batal.as_deref(), Some(ALASAN_DIBATALKAN_PELANGGAN));
        assert!(cancelled.dibatalkan_at.is_some());
        assert_eq!(stok(&f.db, barang.id).await, 5);
    }

    #[tokio::test]
    async fn expired_order_is_cancelled_on_next_read() {
        let f = fixture().await;
        let (customer, barang, trx) = checked_out(&f).await;

        let model = Transaksi::find_by_id(trx.id).one(&*f.db).await.unwrap().unwrap();
        let mut active: transaksi::ActiveModel = model.into();
        active.batas_pembayaran = Set(Utc::now() - Duration::hours(1));
        active.update(&*f.db).await.unwrap();

        let read = f.service.detail_for_user(customer.id, trx.id).await.unwrap();
        assert_eq!(read.status, StatusTransaksi::Dibatalkan);
        assert_eq!(read.alasan_batal.as_deref(), Some(ALASAN_KEDALUWARSA));
        assert_eq!(stok(&f.db, barang.id).await, 5);
        assert_eq!(status_notifications(&f.db).await.len(), 1);
        assert_eq!(f.service.expire_overdue().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn payment_proof_marks_paid_and_notifies_admin_once() {
        let f = fixture().await;
        let (customer, _barang, trx) = checked_out(&f).await;
        let proof = UploadedFile::new("bukti", "transfer.pdf", Bytes::from_static(b"%PDF-1.4"));

        let paid = f.service.upload_bukti(customer.id, trx.id, proof).await.unwrap();

        assert_eq!(paid.status, StatusTransaksi::Dibayar);
        assert!(paid.dibayar_at.is_some());
        assert!(paid.bukti_pembayaran.unwrap().starts_with("bukti_pembayaran/"));
        let payments = Notifikasi::find()
            .filter(notifikasi::Column::Tipe.eq(TipeNotifikasi::Pembayaran))
            .all(&*f.db)
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
        assert!(payments[0].user_id.is_none());
    }

    #[tokio::test]
    async fn proof_for_expired_order_cancels_it_and_stores_nothing() {
        let f = fixture().await;
        let (customer, barang, trx) = checked_out(&f).await;

        let model = Transaksi::find_by_id(trx.id).one(&*f.db).await.unwrap().unwrap();
        let mut active: transaksi::ActiveModel = model.into();
        active.batas_pembayaran = Set(Utc::now() - Duration::minutes(5));
        active.update(&*f.db).await.unwrap();

        let proof = UploadedFile::new("bukti", "transfer.pdf", Bytes::from_static(b"%PDF-1.4"));
        let err = f
            .service
            .upload_bukti(customer.id, trx.id, proof)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidStatus(_)));

        let reloaded = Transaksi::find_by_id(trx.id).one(&*f.db).await.unwrap().unwrap();
        assert_eq!(reloaded.status, StatusTransaksi::Dibatalkan);
        assert!(reloaded.bukti_pembayaran.is_none());
        assert_eq!(stok(&f.db, barang.id).await, 5);
        assert_eq!(status_notifications(&f.db).await.len(), 1);

        let proofs = f.dir.path().join(BUKTI_PEMBAYARAN_DIR);
        let stored = std::fs::read_dir(&proofs).map(|d| d.count()).unwrap_or(0);
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn admin_search_matches_customer_email() {
        let f = fixture().await;
        checked_out(&f).await;

        let (found, total) = f
            .service
            .admin_list(
                TransaksiFilter { search: Some("budi@".into()), ..Default::default() },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].customer.as_ref().unwrap().name, "Budi");

        let (none, _) = f
            .service
            .admin_list(
                TransaksiFilter { search: Some("nobody".into()), ..Default::default() },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
