use crate::{
    entities::{
        notifikasi::{self, TipeNotifikasi},
        Notifikasi,
    },
    errors::ServiceError,
    services::PageRequest,
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::Value as Json;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// A notification about to be written.
#[derive(Debug, Clone)]
pub struct NewNotifikasi {
    pub user_id: Option<Uuid>,
    pub tipe: TipeNotifikasi,
    pub judul: String,
    pub pesan: String,
    pub data: Option<Json>,
}

impl NewNotifikasi {
    /// Entry for the admin feed
    pub fn admin(tipe: TipeNotifikasi, judul: impl Into<String>, pesan: impl Into<String>) -> Self {
        Self {
            user_id: None,
            tipe,
            judul: judul.into(),
            pesan: pesan.into(),
            data: None,
        }
    }

    /// Entry addressed to one customer
    pub fn for_user(
        user_id: Uuid,
        tipe: TipeNotifikasi,
        judul: impl Into<String>,
        pesan: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::admin(tipe, judul, pesan)
        }
    }

    pub fn with_data(mut self, data: Json) -> Self {
        self.data = Some(data);
        self
    }
}

/// Notification feed for admins (`user_id IS NULL`) and customers.
#[derive(Clone)]
pub struct NotifikasiService {
    db: Arc<DatabaseConnection>,
}

impl NotifikasiService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Appends a notification on the given connection, so callers can write
    /// it inside their own transaction.
    pub async fn record<C>(conn: &C, new: NewNotifikasi) -> Result<notifikasi::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        let model = notifikasi::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            tipe: Set(new.tipe),
            judul: Set(new.judul),
            pesan: Set(new.pesan),
            data: Set(new.data),
            dibaca: Set(false),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        Ok(model)
    }

    fn admin_feed() -> Condition {
        Condition::all()
            .add(notifikasi::Column::UserId.is_null())
            .add(notifikasi::Column::Tipe.ne(TipeNotifikasi::Broadcast))
    }

    fn user_feed(user_id: Uuid) -> Condition {
        Condition::any()
            .add(notifikasi::Column::UserId.eq(user_id))
            .add(
                Condition::all()
                    .add(notifikasi::Column::UserId.is_null())
                    .add(notifikasi::Column::Tipe.eq(TipeNotifikasi::Broadcast)),
            )
    }

    async fn list_where(
        &self,
        condition: Condition,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<(Vec<notifikasi::Model>, u64), ServiceError> {
        let mut query = Notifikasi::find().filter(condition);
        if unread_only {
            query = query.filter(notifikasi::Column::Dibaca.eq(false));
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(notifikasi::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit)
            .all(&*self.db)
            .await?;

        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn admin_list(
        &self,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<(Vec<notifikasi::Model>, u64), ServiceError> {
        self.list_where(Self::admin_feed(), unread_only, page).await
    }

    #[instrument(skip(self))]
    pub async fn admin_unread_count(&self) -> Result<u64, ServiceError> {
        let count = Notifikasi::find()
            .filter(Self::admin_feed())
            .filter(notifikasi::Column::Dibaca.eq(false))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: Uuid) -> Result<notifikasi::Model, ServiceError> {
        let notif = Notifikasi::find_by_id(id)
            .filter(Self::admin_feed())
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Notification {} not found", id)))?;

        self.set_read(notif).await
    }

    #[instrument(skip(self))]
    pub async fn mark_all_read(&self) -> Result<u64, ServiceError> {
        let result = Notifikasi::update_many()
            .col_expr(notifikasi::Column::Dibaca, Expr::value(true))
            .filter(Self::admin_feed())
            .filter(notifikasi::Column::Dibaca.eq(false))
            .exec(&*self.db)
            .await?;

        info!(updated = result.rows_affected, "marked admin notifications read");
        Ok(result.rows_affected)
    }

    /// Deletes an admin-feed or broadcast entry.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = Notifikasi::delete_many()
            .filter(notifikasi::Column::Id.eq(id))
            .filter(notifikasi::Column::UserId.is_null())
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Notification {} not found",
                id
            )));
        }

        info!(notifikasi_id = %id, "deleted notification");
        Ok(())
    }

    #[instrument(skip(self, pesan))]
    pub async fn broadcast(
        &self,
        judul: String,
        pesan: String,
    ) -> Result<notifikasi::Model, ServiceError> {
        let notif = Self::record(
            &*self.db,
            NewNotifikasi::admin(TipeNotifikasi::Broadcast, judul, pesan),
        )
        .await?;

        info!(notifikasi_id = %notif.id, "broadcast sent");
        Ok(notif)
    }

    /// Own notifications plus broadcasts, newest first.
    #[instrument(skip(self))]
    pub async fn user_list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<(Vec<notifikasi::Model>, u64), ServiceError> {
        self.list_where(Self::user_feed(user_id), unread_only, page)
            .await
    }

    /// Broadcast rows are shared, so only the user's own rows carry read state.
    #[instrument(skip(self))]
    pub async fn user_unread_count(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let count = Notifikasi::find()
            .filter(notifikasi::Column::UserId.eq(user_id))
            .filter(notifikasi::Column::Dibaca.eq(false))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    pub async fn user_mark_read(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<notifikasi::Model, ServiceError> {
        let notif = Notifikasi::find_by_id(id)
            .filter(notifikasi::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Notification {} not found", id)))?;

        self.set_read(notif).await
    }

    #[instrument(skip(self))]
    pub async fn user_mark_all_read(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let result = Notifikasi::update_many()
            .col_expr(notifikasi::Column::Dibaca, Expr::value(true))
            .filter(notifikasi::Column::UserId.eq(user_id))
            .filter(notifikasi::Column::Dibaca.eq(false))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn set_read(&self, notif: notifikasi::Model) -> Result<notifikasi::Model, ServiceError> {
        if notif.dibaca {
            return Ok(notif);
        }
        let mut active: notifikasi::ActiveModel = notif.into();
        active.dibaca = Set(true);
        Ok(active.update(&*self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::test_db;

    #[tokio::test]
    async fn admin_feed_excludes_customer_rows_and_broadcasts() {
        let db = test_db().await;
        let service = NotifikasiService::new(db.clone());
        let customer = Uuid::new_v4();

        NotifikasiService::record(
            &*db,
            NewNotifikasi::admin(TipeNotifikasi::Registrasi, "Pelanggan baru", "Budi mendaftar"),
        )
        .await
        .unwrap();
        NotifikasiService::record(
            &*db,
            NewNotifikasi::for_user(customer, TipeNotifikasi::StatusTransaksi, "Status", "Diproses"),
        )
        .await
        .unwrap();
        service
            .broadcast("Promo".into(), "Diskon 10%".into())
            .await
            .unwrap();

        let (admin_items, admin_total) = service
            .admin_list(false, PageRequest::new(1, 20))
            .await
            .unwrap();
        assert_eq!(admin_total, 1);
        assert_eq!(admin_items[0].tipe, TipeNotifikasi::Registrasi);

        let (user_items, user_total) = service
            .user_list(customer, false, PageRequest::new(1, 20))
            .await
            .unwrap();
        assert_eq!(user_total, 2);
        assert!(user_items
            .iter()
            .any(|n| n.tipe == TipeNotifikasi::Broadcast));
    }

    #[tokio::test]
    async fn user_cannot_mark_someone_elses_row() {
        let db = test_db().await;
        let service = NotifikasiService::new(db.clone());
        let owner = Uuid::new_v4();
        let notif = NotifikasiService::record(
            &*db,
            NewNotifikasi::for_user(owner, TipeNotifikasi::StatusTransaksi, "Status", "Selesai"),
        )
        .await
        .unwrap();

        let err = service
            .user_mark_read(Uuid::new_v4(), notif.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let updated = service.user_mark_read(owner, notif.id).await.unwrap();
        assert!(updated.dibaca);
        assert_eq!(service.user_unread_count(owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_all_read_clears_admin_unread_count() {
        let db = test_db().await;
        let service = NotifikasiService::new(db.clone());
        for judul in ["Like", "Keranjang"] {
            NotifikasiService::record(
                &*db,
                NewNotifikasi::admin(TipeNotifikasi::Like, judul, "pesan"),
            )
            .await
            .unwrap();
        }

        assert_eq!(service.admin_unread_count().await.unwrap(), 2);
        assert_eq!(service.mark_all_read().await.unwrap(), 2);
        assert_eq!(service.admin_unread_count().await.unwrap(), 0);
    }
}
