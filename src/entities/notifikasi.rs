use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Append-only event log entry. `user_id = None` targets the admin feed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifikasi")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(nullable)]
    pub user_id: Option<Uuid>,
    pub tipe: TipeNotifikasi,
    pub judul: String,
    #[sea_orm(column_type = "Text")]
    pub pesan: String,
    #[sea_orm(column_type = "Json", nullable)]
    pub data: Option<Json>,
    pub dibaca: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            if let ActiveValue::NotSet = active_model.dibaca {
                active_model.dibaca = Set(false);
            }
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(Utc::now());
            }
        }
        Ok(active_model)
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
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TipeNotifikasi {
    #[sea_orm(string_value = "registrasi")]
    Registrasi,
    #[sea_orm(string_value = "like")]
    Like,
    #[sea_orm(string_value = "keranjang")]
    Keranjang,
    #[sea_orm(string_value = "pembayaran")]
    Pembayaran,
    #[sea_orm(string_value = "status_transaksi")]
    StatusTransaksi,
    #[sea_orm(string_value = "feedback")]
    Feedback,
    #[sea_orm(string_value = "broadcast")]
    Broadcast,
}
