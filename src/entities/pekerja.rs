use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Field technician on the roster
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pekerja")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub nama_pekerja: String,
    pub jabatan: String,
    #[sea_orm(nullable)]
    pub no_hp: Option<String>,
    pub status: StatusPekerja,
    #[sea_orm(nullable)]
    pub busy_mulai: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub busy_selesai: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
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
        let now = Utc::now();
        if insert {
            if let ActiveValue::NotSet = active_model.status {
                active_model.status = Set(StatusPekerja::Standby);
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusPekerja {
    #[sea_orm(string_value = "standby")]
    Standby,
    #[sea_orm(string_value = "busy")]
    Busy,
    #[sea_orm(string_value = "off")]
    Off,
}

impl StatusPekerja {
    pub const ALL: [StatusPekerja; 3] =
        [StatusPekerja::Standby, StatusPekerja::Busy, StatusPekerja::Off];
}
