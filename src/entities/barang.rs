use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Product sold in the storefront
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "barang")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub kode_barang: String,
    pub nama_barang: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub deskripsi: Option<String>,
    #[sea_orm(nullable)]
    pub merek: Option<String>,
    pub kategori: String,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub harga_beli: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub harga_jual: Decimal,
    pub diskon: i32,
    pub stok: i32,
    pub display: bool,
    pub status_rekomendasi: bool,
    #[sea_orm(nullable)]
    pub gambar: Option<String>,
    /// JSON array of `{url, caption}` where `url` is a storage-relative path
    #[sea_orm(column_type = "Json")]
    pub gambar_deskripsi: Json,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::keranjang::Entity")]
    Keranjang,
    #[sea_orm(has_many = "super::user_feedback::Entity")]
    Feedback,
    #[sea_orm(has_many = "super::user_likes_barang::Entity")]
    Likes,
}

impl Related<super::keranjang::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Keranjang.def()
    }
}

impl Related<super::user_feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedback.def()
    }
}

impl Related<super::user_likes_barang::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
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
            if let ActiveValue::NotSet = active_model.gambar_deskripsi {
                active_model.gambar_deskripsi = Set(Json::Array(Vec::new()));
            }
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }

        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}

/// One description image attached to a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GambarDeskripsi {
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Price after applying a percentage discount, rounded to two decimals.
pub fn harga_setelah_diskon(harga_jual: Decimal, diskon: i32) -> Decimal {
    let diskon = Decimal::from(diskon.clamp(0, 100));
    (harga_jual * (Decimal::ONE_HUNDRED - diskon) / Decimal::ONE_HUNDRED).round_dp(2)
}

impl Model {
    pub fn harga_setelah_diskon(&self) -> Decimal {
        harga_setelah_diskon(self.harga_jual, self.diskon)
    }

    /// Parsed description images. Malformed entries are skipped.
    pub fn gambar_deskripsi_list(&self) -> Vec<GambarDeskripsi> {
        match &self.gambar_deskripsi {
            Json::Array(entries) => entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

pub fn gambar_deskripsi_json(entries: &[GambarDeskripsi]) -> Json {
    serde_json::to_value(entries).unwrap_or_else(|_| Json::Array(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(3200000), 10, dec!(2880000))]
    #[case(dec!(4500000), 0, dec!(4500000))]
    #[case(dec!(4500000), 100, dec!(0))]
    #[case(dec!(99999), 15, dec!(84999.15))]
    fn discounted_price(#[case] harga: Decimal, #[case] diskon: i32, #[case] expected: Decimal) {
        assert_eq!(harga_setelah_diskon(harga, diskon), expected);
    }

    #[test]
    fn malformed_description_images_are_skipped() {
        let now = Utc::now();
        let model = Model {
            id: Uuid::new_v4(),
            kode_barang: "AC-001".into(),
            nama_barang: "AC Split 1 PK".into(),
            deskripsi: None,
            merek: None,
            kategori: "AC Split".into(),
            harga_beli: dec!(2500000),
            harga_jual: dec!(3200000),
            diskon: 0,
            stok: 3,
            display: true,
            status_rekomendasi: false,
            gambar: None,
            gambar_deskripsi: serde_json::json!([
                {"url": "gambar/produk/ac-split/a.png", "caption": "depan"},
                {"caption": "no url"},
            ]),
            created_at: now,
            updated_at: now,
        };

        let images = model.gambar_deskripsi_list();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].caption.as_deref(), Some("depan"));
    }
}
