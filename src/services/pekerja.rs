use crate::{
    entities::{pekerja, Pekerja, StatusPekerja},
    errors::{FieldErrors, ServiceError},
    services::PageRequest,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PekerjaInput {
    #[validate(length(min = 1, max = 255, message = "The nama_pekerja field is required"))]
    pub nama_pekerja: String,
    #[validate(length(min = 1, max = 100, message = "The jabatan field is required"))]
    pub jabatan: String,
    #[validate(length(max = 20, message = "The no_hp may not be greater than 20 characters"))]
    pub no_hp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetStatusInput {
    pub status: StatusPekerja,
    pub busy_mulai: Option<DateTime<Utc>>,
    pub busy_selesai: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct PekerjaFilter {
    pub status: Option<StatusPekerja>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct PekerjaService {
    db: Arc<DatabaseConnection>,
}

impl PekerjaService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: PekerjaInput) -> Result<pekerja::Model, ServiceError> {
        input.validate()?;
        let model = pekerja::ActiveModel {
            id: Set(Uuid::new_v4()),
            nama_pekerja: Set(input.nama_pekerja.trim().to_string()),
            jabatan: Set(input.jabatan.trim().to_string()),
            no_hp: Set(input.no_hp.filter(|n| !n.trim().is_empty())),
            status: Set(StatusPekerja::Standby),
            busy_mulai: Set(None),
            busy_selesai: Set(None),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(pekerja_id = %model.id, "created pekerja");
        Ok(model)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: PekerjaInput) -> Result<pekerja::Model, ServiceError> {
        input.validate()?;
        let mut active: pekerja::ActiveModel = self.get(id).await?.into();
        active.nama_pekerja = Set(input.nama_pekerja.trim().to_string());
        active.jabatan = Set(input.jabatan.trim().to_string());
        active.no_hp = Set(input.no_hp.filter(|n| !n.trim().is_empty()));
        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = Pekerja::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Pekerja {} not found", id)));
        }
        info!(pekerja_id = %id, "deleted pekerja");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<pekerja::Model, ServiceError> {
        Pekerja::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Pekerja {} not found", id)))
    }

    pub async fn list(
        &self,
        filter: PekerjaFilter,
        page: PageRequest,
    ) -> Result<(Vec<pekerja::Model>, u64), ServiceError> {
        let mut query = Pekerja::find();
        if let Some(status) = filter.status {
            query = query.filter(pekerja::Column::Status.eq(status));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(pekerja::Column::NamaPekerja.contains(search))
                    .add(pekerja::Column::Jabatan.contains(search)),
            );
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_asc(pekerja::Column::NamaPekerja)
            .offset(page.offset())
            .limit(page.limit)
            .all(&*self.db)
            .await?;
        Ok((items, total))
    }

    /// `busy` stamps the window; `standby` and `off` clear it.
    #[instrument(skip(self, input), fields(status = %input.status))]
    pub async fn set_status(
        &self,
        id: Uuid,
        input: SetStatusInput,
    ) -> Result<pekerja::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active: pekerja::ActiveModel = existing.into();
        active.status = Set(input.status);

        match input.status {
            StatusPekerja::Busy => {
                let mulai = input.busy_mulai.unwrap_or_else(Utc::now);
                if let Some(selesai) = input.busy_selesai {
                    if selesai <= mulai {
                        return Err(FieldErrors::single(
                            "busy_selesai",
                            "The busy_selesai must be a date after busy_mulai",
                        )
                        .into());
                    }
                }
                active.busy_mulai = Set(Some(mulai));
                active.busy_selesai = Set(input.busy_selesai);
            }
            StatusPekerja::Standby | StatusPekerja::Off => {
                active.busy_mulai = Set(None);
                active.busy_selesai = Set(None);
            }
        }

        let model = active.update(&*self.db).await?;
        info!(pekerja_id = %id, "pekerja status changed");
        Ok(model)
    }

    /// Puts busy workers whose window has ended back on standby.
    #[instrument(skip(self))]
    pub async fn release_finished(&self) -> Result<u64, ServiceError> {
        let now = Utc::now();
        let result = Pekerja::update_many()
            .col_expr(pekerja::Column::Status, Expr::value(StatusPekerja::Standby))
            .col_expr(pekerja::Column::BusyMulai, Expr::value(Option::<DateTime<Utc>>::None))
            .col_expr(pekerja::Column::BusySelesai, Expr::value(Option::<DateTime<Utc>>::None))
            .col_expr(pekerja::Column::UpdatedAt, Expr::value(now))
            .filter(pekerja::Column::Status.eq(StatusPekerja::Busy))
            .filter(pekerja::Column::BusySelesai.is_not_null())
            .filter(pekerja::Column::BusySelesai.lte(now))
            .exec(&*self.db)
            .await?;

        if result.rows_affected > 0 {
            info!(released = result.rows_affected, "released finished pekerja");
        }
        Ok(result.rows_affected)
    }
}
