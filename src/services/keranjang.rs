use crate::{
    entities::{
        barang, keranjang, notifikasi::TipeNotifikasi, user, Barang, Keranjang, User,
    },
    errors::{FieldErrors, ServiceError},
    services::{
        notifikasi::{NewNotifikasi, NotifikasiService},
        retry_on_unique_violation,
    },
    storage::FileStorage,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddToCartInput {
    pub barang_id: Uuid,
    #[validate(range(min = 1, message = "The jumlah must be at least 1"))]
    pub jumlah: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCartInput {
    #[validate(range(min = 1, message = "The jumlah must be at least 1"))]
    pub jumlah: i32,
}

/// Product fields shown on a cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarangRingkas {
    pub id: Uuid,
    pub kode_barang: String,
    pub nama_barang: String,
    pub kategori: String,
    pub harga_jual: Decimal,
    pub diskon: i32,
    pub stok: i32,
    pub gambar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeranjangItem {
    pub id: Uuid,
    pub barang: BarangRingkas,
    pub harga_setelah_diskon: Decimal,
    pub jumlah: i32,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeranjangSummary {
    pub total_item: i64,
    pub total_harga: Decimal,
    pub total_diskon: Decimal,
    pub total_bayar: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeranjangView {
    pub items: Vec<KeranjangItem>,
    pub summary: KeranjangSummary,
}

/// Sums a set of lines the same way checkout does.
pub fn summarize(lines: &[(Decimal, Decimal, i32)]) -> KeranjangSummary {
    let mut summary = KeranjangSummary::default();
    for (harga_jual, harga_setelah_diskon, jumlah) in lines {
        let qty = Decimal::from(*jumlah);
        summary.total_item += i64::from(*jumlah);
        summary.total_harga += *harga_jual * qty;
        summary.total_diskon += (*harga_jual - *harga_setelah_diskon) * qty;
    }
    summary.total_bayar = summary.total_harga - summary.total_diskon;
    summary
}

/// Per-user cart. Quantities are clamped to stock on every write; nothing
/// is reserved until checkout.
#[derive(Clone)]
pub struct KeranjangService {
    db: Arc<DatabaseConnection>,
    storage: Arc<dyn FileStorage>,
}

impl KeranjangService {
    pub fn new(db: Arc<DatabaseConnection>, storage: Arc<dyn FileStorage>) -> Self {
        Self { db, storage }
    }

    fn line(&self, row: keranjang::Model, barang: barang::Model) -> KeranjangItem {
        let harga_setelah_diskon = barang.harga_setelah_diskon();
        KeranjangItem {
            id: row.id,
            subtotal: harga_setelah_diskon * Decimal::from(row.jumlah),
            harga_setelah_diskon,
            jumlah: row.jumlah,
            barang: BarangRingkas {
                id: barang.id,
                kode_barang: barang.kode_barang,
                nama_barang: barang.nama_barang,
                kategori: barang.kategori,
                harga_jual: barang.harga_jual,
                diskon: barang.diskon,
                stok: barang.stok,
                gambar_url: barang.gambar.as_deref().map(|p| self.storage.public_url(p)),
            },
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<KeranjangView, ServiceError> {
        let rows = Keranjang::find()
            .filter(keranjang::Column::UserId.eq(user_id))
            .order_by_asc(keranjang::Column::CreatedAt)
            .find_also_related(Barang)
            .all(&*self.db)
            .await?;

        let items: Vec<KeranjangItem> = rows
            .into_iter()
            .filter_map(|(row, barang)| barang.map(|b| self.line(row, b)))
            .collect();

        let summary = summarize(
            &items
                .iter()
                .map(|i| (i.barang.harga_jual, i.harga_setelah_diskon, i.jumlah))
                .collect::<Vec<_>>(),
        );

        Ok(KeranjangView { items, summary })
    }

    async fn displayed_barang(&self, barang_id: Uuid) -> Result<barang::Model, ServiceError> {
        Barang::find_by_id(barang_id)
            .filter(barang::Column::Display.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Barang {} not found", barang_id)))
    }

    async fn owned_line(&self, user_id: Uuid, item_id: Uuid) -> Result<keranjang::Model, ServiceError> {
        Keranjang::find_by_id(item_id)
            .filter(keranjang::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart item {} not found", item_id)))
    }

    /// Adds to the user's line for this product, merging quantities.
    #[instrument(skip(self, input), fields(barang_id = %input.barang_id))]
    pub async fn add(
        &self,
        user_id: Uuid,
        input: AddToCartInput,
    ) -> Result<KeranjangItem, ServiceError> {
        input.validate()?;
        let barang = self.displayed_barang(input.barang_id).await?;
        if barang.stok <= 0 {
            return Err(ServiceError::InsufficientStock(format!(
                "{} is out of stock",
                barang.nama_barang
            )));
        }

        let customer = User::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

        let row = retry_on_unique_violation("Cart line", || {
            self.save_line(&customer, &barang, input.jumlah)
        })
        .await?;

        info!(user_id = %user_id, jumlah = row.jumlah, "cart line saved");
        Ok(self.line(row, barang))
    }

    /// Merges into or creates the customer's line inside one transaction.
    async fn save_line(
        &self,
        customer: &user::Model,
        barang: &barang::Model,
        jumlah: i32,
    ) -> Result<keranjang::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let existing = Keranjang::find()
            .filter(keranjang::Column::UserId.eq(customer.id))
            .filter(keranjang::Column::BarangId.eq(barang.id))
            .one(&txn)
            .await?;

        let row = match existing {
            Some(line) => {
                let merged = line.jumlah.saturating_add(jumlah).min(barang.stok);
                let mut active: keranjang::ActiveModel = line.into();
                active.jumlah = Set(merged);
                active.update(&txn).await?
            }
            None => {
                keranjang::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(customer.id),
                    barang_id: Set(barang.id),
                    jumlah: Set(jumlah.min(barang.stok)),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        NotifikasiService::record(
            &txn,
            NewNotifikasi::admin(
                TipeNotifikasi::Keranjang,
                "Barang ditambahkan ke keranjang",
                format!(
                    "{} menambahkan {} ke keranjang",
                    customer.name, barang.nama_barang
                ),
            )
            .with_data(json!({
                "user_id": customer.id,
                "barang_id": barang.id,
                "jumlah": jumlah,
            })),
        )
        .await?;
        txn.commit().await?;

        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        jumlah: i32,
    ) -> Result<KeranjangItem, ServiceError> {
        UpdateCartInput { jumlah }.validate()?;
        let line = self.owned_line(user_id, item_id).await?;
        let barang = Barang::find_by_id(line.barang_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Barang {} not found", line.barang_id)))?;

        if barang.stok <= 0 {
            return Err(ServiceError::InsufficientStock(format!(
                "{} is out of stock",
                barang.nama_barang
            )));
        }

        let mut active: keranjang::ActiveModel = line.into();
        active.jumlah = Set(jumlah.min(barang.stok));
        let row = active.update(&*self.db).await?;
        Ok(self.line(row, barang))
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let line = self.owned_line(user_id, item_id).await?;
        Keranjang::delete_by_id(line.id).exec(&*self.db).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let result = Keranjang::delete_many()
            .filter(keranjang::Column::UserId.eq(user_id))
            .exec(&*self.db)
            .await?;
        info!(user_id = %user_id, removed = result.rows_affected, "cart cleared");
        Ok(result.rows_affected)
    }

    /// Cart lines with their current product rows, for checkout.
    pub(crate) async fn lines_with_barang<C>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<Vec<(keranjang::Model, barang::Model)>, ServiceError>
    where
        C: sea_orm::ConnectionTrait,
    {
        let rows = Keranjang::find()
            .filter(keranjang::Column::UserId.eq(user_id))
            .order_by_asc(keranjang::Column::CreatedAt)
            .all(conn)
            .await?;
        if rows.is_empty() {
            return Err(FieldErrors::single("keranjang", "The cart is empty").into());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.barang_id).collect();
        let mut barang: HashMap<Uuid, barang::Model> = Barang::find()
            .filter(barang::Column::Id.is_in(ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        rows.into_iter()
            .map(|row| {
                barang
                    .remove(&row.barang_id)
                    .map(|b| (row.clone(), b))
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Barang {} not found", row.barang_id))
                    })
            })
            .collect()
    }
}
