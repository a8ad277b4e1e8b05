use crate::{
    entities::{
        barang, notifikasi::TipeNotifikasi, user, user_feedback, user_likes_barang, Barang, User,
        UserFeedback, UserLikesBarang,
    },
    errors::ServiceError,
    services::{
        barang::{BarangResponse, BarangService, BarangStats},
        notifikasi::{NewNotifikasi, NotifikasiService},
        retry_on_unique_violation,
    },
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FeedbackInput {
    #[validate(range(min = 1, max = 5, message = "The rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 2000, message = "The feedback may not be greater than 2000 characters"))]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResult {
    pub liked: bool,
    pub total_likes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub feedback: user_feedback::Model,
    pub average_rating: f64,
    pub total_feedback: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub rating: i32,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Likes, ratings and the favourites list.
#[derive(Clone)]
pub struct InteraksiService {
    db: Arc<DatabaseConnection>,
    barang: Arc<BarangService>,
}

impl InteraksiService {
    pub fn new(db: Arc<DatabaseConnection>, barang: Arc<BarangService>) -> Self {
        Self { db, barang }
    }

    async fn displayed<C: ConnectionTrait>(
        conn: &C,
        barang_id: Uuid,
    ) -> Result<barang::Model, ServiceError> {
        Barang::find_by_id(barang_id)
            .filter(barang::Column::Display.eq(true))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Barang {} not found", barang_id)))
    }

    async fn customer<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<user::Model, ServiceError> {
        User::find_by_id(user_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }

    async fn stats_in<C: ConnectionTrait>(conn: &C, barang_id: Uuid) -> Result<BarangStats, ServiceError> {
        Ok(BarangService::load_stats(conn, Some(&[barang_id]))
            .await?
            .remove(&barang_id)
            .unwrap_or_default())
    }

    /// Flips the like. Only a fresh like is reported to the admin feed.
    #[instrument(skip(self))]
    pub async fn toggle_like(&self, user_id: Uuid, barang_id: Uuid) -> Result<LikeResult, ServiceError> {
        retry_on_unique_violation("Like", || self.flip_like(user_id, barang_id)).await
    }

    async fn flip_like(&self, user_id: Uuid, barang_id: Uuid) -> Result<LikeResult, ServiceError> {
        let txn = self.db.begin().await?;
        let barang = Self::displayed(&txn, barang_id).await?;
        let customer = Self::customer(&txn, user_id).await?;

        let existing = UserLikesBarang::find()
            .filter(user_likes_barang::Column::UserId.eq(user_id))
            .filter(user_likes_barang::Column::BarangId.eq(barang_id))
            .one(&txn)
            .await?;

        let liked = match existing {
            Some(row) => {
                let liked = !row.liked;
                let mut active: user_likes_barang::ActiveModel = row.into();
                active.liked = Set(liked);
                active.update(&txn).await?;
                liked
            }
            None => {
                user_likes_barang::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    barang_id: Set(barang_id),
                    liked: Set(true),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                true
            }
        };

        if liked {
            NotifikasiService::record(
                &txn,
                NewNotifikasi::admin(
                    TipeNotifikasi::Like,
                    "Barang disukai",
                    format!("{} menyukai {}", customer.name, barang.nama_barang),
                )
                .with_data(json!({ "user_id": user_id, "barang_id": barang_id })),
            )
            .await?;
        }

        let stats = Self::stats_in(&txn, barang_id).await?;
        txn.commit().await?;

        info!(barang_id = %barang_id, liked, "like toggled");
        Ok(LikeResult {
            liked,
            total_likes: stats.total_likes,
        })
    }

    /// One rating per customer and product; a second call overwrites it.
    #[instrument(skip(self, input))]
    pub async fn give_feedback(
        &self,
        user_id: Uuid,
        barang_id: Uuid,
        input: FeedbackInput,
    ) -> Result<FeedbackResult, ServiceError> {
        input.validate()?;
        let feedback_text = input.feedback.filter(|f| !f.trim().is_empty());
        retry_on_unique_violation("Feedback", || {
            self.save_feedback(user_id, barang_id, input.rating, feedback_text.clone())
        })
        .await
    }

    async fn save_feedback(
        &self,
        user_id: Uuid,
        barang_id: Uuid,
        rating: i32,
        feedback_text: Option<String>,
    ) -> Result<FeedbackResult, ServiceError> {
        let txn = self.db.begin().await?;
        let barang = Self::displayed(&txn, barang_id).await?;
        let customer = Self::customer(&txn, user_id).await?;

        let existing = UserFeedback::find()
            .filter(user_feedback::Column::UserId.eq(user_id))
            .filter(user_feedback::Column::BarangId.eq(barang_id))
            .one(&txn)
            .await?;

        let row = match existing {
            Some(row) => {
                let mut active: user_feedback::ActiveModel = row.into();
                active.rating = Set(rating);
                active.feedback = Set(feedback_text);
                active.update(&txn).await?
            }
            None => {
                user_feedback::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    barang_id: Set(barang_id),
                    rating: Set(rating),
                    feedback: Set(feedback_text),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        NotifikasiService::record(
            &txn,
            NewNotifikasi::admin(
                TipeNotifikasi::Feedback,
                "Ulasan baru",
                format!(
                    "{} memberi rating {} untuk {}",
                    customer.name, row.rating, barang.nama_barang
                ),
            )
            .with_data(json!({
                "user_id": user_id,
                "barang_id": barang_id,
                "rating": row.rating,
            })),
        )
        .await?;

        let stats = Self::stats_in(&txn, barang_id).await?;
        txn.commit().await?;

        Ok(FeedbackResult {
            feedback: row,
            average_rating: stats.average_rating,
            total_feedback: stats.total_feedback,
        })
    }

    pub async fn list_feedback(&self, barang_id: Uuid) -> Result<Vec<FeedbackEntry>, ServiceError> {
        Self::displayed(&*self.db, barang_id).await?;

        let rows = UserFeedback::find()
            .filter(user_feedback::Column::BarangId.eq(barang_id))
            .order_by_desc(user_feedback::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        let ids: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
        let names: HashMap<Uuid, String> = User::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| FeedbackEntry {
                id: row.id,
                user_id: row.user_id,
                user_name: names.get(&row.user_id).cloned().unwrap_or_default(),
                rating: row.rating,
                feedback: row.feedback,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Displayed products the customer currently likes, most recent first.
    #[instrument(skip(self))]
    pub async fn favorites(&self, user_id: Uuid) -> Result<Vec<BarangResponse>, ServiceError> {
        let likes = UserLikesBarang::find()
            .filter(user_likes_barang::Column::UserId.eq(user_id))
            .filter(user_likes_barang::Column::Liked.eq(true))
            .order_by_desc(user_likes_barang::Column::UpdatedAt)
            .all(&*self.db)
            .await?;
        let order: Vec<Uuid> = likes.iter().map(|l| l.barang_id).collect();

        let mut by_id: HashMap<Uuid, barang::Model> = Barang::find()
            .filter(barang::Column::Id.is_in(order.clone()))
            .filter(barang::Column::Display.eq(true))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();
        let models: Vec<barang::Model> = order.iter().filter_map(|id| by_id.remove(id)).collect();

        self.barang.with_stats(models, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{notifikasi, Notifikasi, UserRole};
    use crate::services::test_support::{insert_barang, insert_user, test_db};
    use crate::storage::LocalStorage;
    use rust_decimal_macros::dec;
    use sea_orm::PaginatorTrait;

    fn service(db: Arc<DatabaseConnection>) -> InteraksiService {
        let storage = Arc::new(LocalStorage::new("/tmp/unused", "/storage"));
        let barang = Arc::new(BarangService::new(db.clone(), storage, 1024));
        InteraksiService::new(db, barang)
    }

    #[tokio::test]
    async fn like_toggles_and_only_fresh_likes_notify() {
        let db = test_db().await;
        let customer = insert_user(&db, "Budi", UserRole::User).await;
        let barang = insert_barang(&db, "AC-001", dec!(1000), 0, 1).await;
        let service = service(db.clone());

        let first = service.toggle_like(customer.id, barang.id).await.unwrap();
        assert!(first.liked);
        assert_eq!(first.total_likes, 1);

        let second = service.toggle_like(customer.id, barang.id).await.unwrap();
        assert!(!second.liked);
        assert_eq!(second.total_likes, 0);
        assert!(service.favorites(customer.id).await.unwrap().is_empty());

        let likes = Notifikasi::find()
            .filter(notifikasi::Column::Tipe.eq(TipeNotifikasi::Like))
            .count(&*db)
            .await
            .unwrap();
        assert_eq!(likes, 1);
    }

    #[tokio::test]
    async fn feedback_upserts_per_user_and_averages() {
        let db = test_db().await;
        let budi = insert_user(&db, "Budi", UserRole::User).await;
        let sari = insert_user(&db, "Sari", UserRole::User).await;
        let barang = insert_barang(&db, "AC-001", dec!(1000), 0, 1).await;
        let service = service(db.clone());

        let rate = |rating| FeedbackInput { rating, feedback: Some("Dingin".into()) };
        service.give_feedback(budi.id, barang.id, rate(2)).await.unwrap();
        service.give_feedback(budi.id, barang.id, rate(4)).await.unwrap();
        let result = service.give_feedback(sari.id, barang.id, rate(5)).await.unwrap();

        assert_eq!(result.total_feedback, 2);
        assert_eq!(result.average_rating, 4.5);
        let listed = service.list_feedback(barang.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|f| f.user_name == "Sari"));
    }

    #[tokio::test]
    async fn rating_out_of_range_is_a_field_error() {
        let db = test_db().await;
        let customer = insert_user(&db, "Budi", UserRole::User).await;
        let barang = insert_barang(&db, "AC-001", dec!(1000), 0, 1).await;

        let err = service(db)
            .give_feedback(customer.id, barang.id, FeedbackInput { rating: 6, feedback: None })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::FieldErrors(ref bag) if bag.get("rating").is_some()));
    }
}
