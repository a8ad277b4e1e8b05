use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Customer order, created from the cart at checkout
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaksi")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub kode_transaksi: String,
    pub user_id: Uuid,
    /// Line snapshot taken at checkout, see [`ItemSnapshot`]
    #[sea_orm(column_type = "Json")]
    pub items: Json,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_harga: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub diskon_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_bayar: Decimal,
    pub status: StatusTransaksi,
    pub metode_pembayaran: MetodePembayaran,
    #[sea_orm(column_type = "Text", nullable)]
    pub alamat_pengiriman: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub catatan: Option<String>,
    pub batas_pembayaran: DateTime<Utc>,
    #[sea_orm(nullable)]
    pub bukti_pembayaran: Option<String>,
    #[sea_orm(nullable)]
    pub dibayar_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub diproses_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub selesai_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub dibatalkan_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub alasan_batal: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            if let ActiveValue::NotSet = active_model.status {
                active_model.status = Set(StatusTransaksi::MenungguPembayaran);
            }
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }
        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusTransaksi {
    #[sea_orm(string_value = "menunggu_pembayaran")]
    MenungguPembayaran,
    #[sea_orm(string_value = "dibayar")]
    Dibayar,
    #[sea_orm(string_value = "diproses")]
    Diproses,
    #[sea_orm(string_value = "selesai")]
    Selesai,
    #[sea_orm(string_value = "dibatalkan")]
    Dibatalkan,
}

impl StatusTransaksi {
    pub const ALL: [StatusTransaksi; 5] = [
        StatusTransaksi::MenungguPembayaran,
        StatusTransaksi::Dibayar,
        StatusTransaksi::Diproses,
        StatusTransaksi::Selesai,
        StatusTransaksi::Dibatalkan,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusTransaksi::Selesai | StatusTransaksi::Dibatalkan)
    }

    /// Next status in the fulfilment sequence, `None` for terminal states.
    pub fn next(&self) -> Option<StatusTransaksi> {
        match self {
            StatusTransaksi::MenungguPembayaran => Some(StatusTransaksi::Dibayar),
            StatusTransaksi::Dibayar => Some(StatusTransaksi::Diproses),
            StatusTransaksi::Diproses => Some(StatusTransaksi::Selesai),
            StatusTransaksi::Selesai | StatusTransaksi::Dibatalkan => None,
        }
    }

    /// One step forward, or cancellation from any non-terminal status.
    pub fn can_transition_to(&self, target: StatusTransaksi) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == StatusTransaksi::Dibatalkan || self.next() == Some(target)
    }

    /// Statuses whose `total_bayar` counts as revenue
    pub fn is_revenue(&self) -> bool {
        matches!(
            self,
            StatusTransaksi::Dibayar | StatusTransaksi::Diproses | StatusTransaksi::Selesai
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTransaksi::MenungguPembayaran => "menunggu_pembayaran",
            StatusTransaksi::Dibayar => "dibayar",
            StatusTransaksi::Diproses => "diproses",
            StatusTransaksi::Selesai => "selesai",
            StatusTransaksi::Dibatalkan => "dibatalkan",
        }
    }

    /// Human label used in notifications and exports
    pub fn label(&self) -> &'static str {
        match self {
            StatusTransaksi::MenungguPembayaran => "Menunggu Pembayaran",
            StatusTransaksi::Dibayar => "Dibayar",
            StatusTransaksi::Diproses => "Diproses",
            StatusTransaksi::Selesai => "Selesai",
            StatusTransaksi::Dibatalkan => "Dibatalkan",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MetodePembayaran {
    #[sea_orm(string_value = "transfer_bank")]
    TransferBank,
    #[sea_orm(string_value = "e_wallet")]
    EWallet,
    #[sea_orm(string_value = "qris")]
    Qris,
}

impl MetodePembayaran {
    pub fn label(&self) -> &'static str {
        match self {
            MetodePembayaran::TransferBank => "Transfer Bank",
            MetodePembayaran::EWallet => "E-Wallet",
            MetodePembayaran::Qris => "QRIS",
        }
    }
}

/// Order line frozen at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub barang_id: Uuid,
    pub kode_barang: String,
    pub nama_barang: String,
    pub kategori: String,
    pub harga_jual: Decimal,
    pub diskon: i32,
    pub harga_setelah_diskon: Decimal,
    pub jumlah: i32,
    pub subtotal: Decimal,
}

impl Model {
    pub fn item_snapshots(&self) -> Vec<ItemSnapshot> {
        serde_json::from_value(self.items.clone()).unwrap_or_default()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == StatusTransaksi::MenungguPembayaran && now > self.batas_pembayaran
    }
}
