use crate::{
    entities::{jasa, Jasa},
    errors::{FieldErrors, ServiceError},
    services::{barang::validate_non_negative, contains_ci, PageRequest},
    storage::{validate_upload, FileStorage, UploadKind, UploadedFile, JASA_DIR},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct JasaInput {
    #[validate(length(min = 1, max = 50, message = "The kode_jasa field is required"))]
    pub kode_jasa: String,
    #[validate(length(min = 1, max = 255, message = "The nama_jasa field is required"))]
    pub nama_jasa: String,
    pub deskripsi: Option<String>,
    #[validate(length(min = 1, max = 100, message = "The kategori field is required"))]
    pub kategori: String,
    #[validate(custom = "validate_non_negative")]
    pub harga: Decimal,
    pub display: bool,
    pub status_rekomendasi: bool,
    pub snk: Option<String>,
}

impl JasaInput {
    pub fn normalized(mut self) -> Self {
        self.kode_jasa = self.kode_jasa.trim().to_string();
        self.nama_jasa = self.nama_jasa.trim().to_string();
        self.kategori = self.kategori.trim().to_string();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JasaSort {
    #[default]
    Terbaru,
    HargaTerendah,
    HargaTertinggi,
}

#[derive(Debug, Clone, Default)]
pub struct JasaFilter {
    pub search: Option<String>,
    pub kategori: Option<String>,
    pub sort: JasaSort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JasaResponse {
    pub id: Uuid,
    pub kode_jasa: String,
    pub nama_jasa: String,
    pub deskripsi: Option<String>,
    pub kategori: String,
    pub harga: Decimal,
    pub display: bool,
    pub status_rekomendasi: bool,
    pub foto: Option<String>,
    pub foto_url: Option<String>,
    pub snk: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Service offerings (installation, cleaning, repair).
#[derive(Clone)]
pub struct JasaService {
    db: Arc<DatabaseConnection>,
    storage: Arc<dyn FileStorage>,
    max_upload_bytes: usize,
}

impl JasaService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        storage: Arc<dyn FileStorage>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            db,
            storage,
            max_upload_bytes,
        }
    }

    fn to_response(&self, model: jasa::Model) -> JasaResponse {
        JasaResponse {
            id: model.id,
            kode_jasa: model.kode_jasa,
            nama_jasa: model.nama_jasa,
            deskripsi: model.deskripsi,
            kategori: model.kategori,
            harga: model.harga,
            display: model.display,
            status_rekomendasi: model.status_rekomendasi,
            foto_url: model.foto.as_deref().map(|p| self.storage.public_url(p)),
            foto: model.foto,
            snk: model.snk,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    async fn validate_form(
        &self,
        input: &JasaInput,
        foto: Option<&UploadedFile>,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut errors: FieldErrors = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        let mut query = Jasa::find().filter(jasa::Column::KodeJasa.eq(input.kode_jasa.as_str()));
        if let Some(id) = exclude {
            query = query.filter(jasa::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            errors.add("kode_jasa", "The kode_jasa has already been taken");
        }
        if let Some(file) = foto {
            errors.merge(validate_upload(file, UploadKind::Image, self.max_upload_bytes));
        }

        errors.into_result()
    }

    async fn discard(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            warn!(path, error = %e, "failed to remove jasa photo");
        }
    }

    #[instrument(skip(self, input, foto), fields(kode_jasa = %input.kode_jasa))]
    pub async fn create(
        &self,
        input: JasaInput,
        foto: Option<UploadedFile>,
    ) -> Result<JasaResponse, ServiceError> {
        let input = input.normalized();
        self.validate_form(&input, foto.as_ref(), None).await?;

        let foto_path = match &foto {
            Some(file) => Some(
                self.storage
                    .save(JASA_DIR, &file.file_name, &file.content)
                    .await?,
            ),
            None => None,
        };

        let inserted = jasa::ActiveModel {
            id: Set(Uuid::new_v4()),
            kode_jasa: Set(input.kode_jasa),
            nama_jasa: Set(input.nama_jasa),
            deskripsi: Set(input.deskripsi),
            kategori: Set(input.kategori),
            harga: Set(input.harga),
            display: Set(input.display),
            status_rekomendasi: Set(input.status_rekomendasi),
            foto: Set(foto_path.clone()),
            snk: Set(input.snk),
            ..Default::default()
        }
        .insert(&*self.db)
        .await;

        match inserted {
            Ok(model) => {
                info!(jasa_id = %model.id, "created jasa");
                Ok(self.to_response(model))
            }
            Err(e) => {
                if let Some(path) = foto_path {
                    self.discard(&path).await;
                }
                Err(e.into())
            }
        }
    }

    /// Replaces the photo when a new one is sent; the old file is removed
    /// once the row points at the new one.
    #[instrument(skip(self, input, foto))]
    pub async fn update(
        &self,
        id: Uuid,
        input: JasaInput,
        foto: Option<UploadedFile>,
    ) -> Result<JasaResponse, ServiceError> {
        let input = input.normalized();
        let existing = self.find(id).await?;
        self.validate_form(&input, foto.as_ref(), Some(id)).await?;

        let new_foto = match &foto {
            Some(file) => Some(
                self.storage
                    .save(JASA_DIR, &file.file_name, &file.content)
                    .await?,
            ),
            None => None,
        };
        let old_foto = existing.foto.clone();

        let mut active: jasa::ActiveModel = existing.into();
        active.kode_jasa = Set(input.kode_jasa);
        active.nama_jasa = Set(input.nama_jasa);
        active.deskripsi = Set(input.deskripsi);
        active.kategori = Set(input.kategori);
        active.harga = Set(input.harga);
        active.display = Set(input.display);
        active.status_rekomendasi = Set(input.status_rekomendasi);
        active.snk = Set(input.snk);
        if let Some(path) = &new_foto {
            active.foto = Set(Some(path.clone()));
        }

        let model = match active.update(&*self.db).await {
            Ok(model) => model,
            Err(e) => {
                if let Some(path) = &new_foto {
                    self.discard(path).await;
                }
                return Err(e.into());
            }
        };

        if new_foto.is_some() {
            if let Some(old) = old_foto {
                self.discard(&old).await;
            }
        }

        info!(jasa_id = %id, "updated jasa");
        Ok(self.to_response(model))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find(id).await?;
        Jasa::delete_by_id(id).exec(&*self.db).await?;

        if let Some(path) = existing.foto {
            self.discard(&path).await;
        }
        info!(jasa_id = %id, "deleted jasa");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn toggle_display(&self, id: Uuid) -> Result<JasaResponse, ServiceError> {
        let existing = self.find(id).await?;
        let flipped = !existing.display;
        let mut active: jasa::ActiveModel = existing.into();
        active.display = Set(flipped);
        Ok(self.to_response(active.update(&*self.db).await?))
    }

    #[instrument(skip(self))]
    pub async fn toggle_rekomendasi(&self, id: Uuid) -> Result<JasaResponse, ServiceError> {
        let existing = self.find(id).await?;
        let flipped = !existing.status_rekomendasi;
        let mut active: jasa::ActiveModel = existing.into();
        active.status_rekomendasi = Set(flipped);
        Ok(self.to_response(active.update(&*self.db).await?))
    }

    async fn find(&self, id: Uuid) -> Result<jasa::Model, ServiceError> {
        Jasa::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Jasa {} not found", id)))
    }

    pub async fn get(&self, id: Uuid) -> Result<JasaResponse, ServiceError> {
        Ok(self.to_response(self.find(id).await?))
    }

    pub async fn get_displayed(&self, id: Uuid) -> Result<JasaResponse, ServiceError> {
        let model = self.find(id).await?;
        if !model.display {
            return Err(ServiceError::NotFound(format!("Jasa {} not found", id)));
        }
        Ok(self.to_response(model))
    }

    #[instrument(skip(self))]
    pub async fn admin_list(
        &self,
        filter: JasaFilter,
        page: PageRequest,
    ) -> Result<(Vec<JasaResponse>, u64), ServiceError> {
        let mut query = Jasa::find();
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(jasa::Column::NamaJasa.contains(search))
                    .add(jasa::Column::KodeJasa.contains(search)),
            );
        }
        if let Some(kategori) = filter.kategori.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(jasa::Column::Kategori.eq(kategori));
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(jasa::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|m| self.to_response(m))
            .collect();

        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn storefront_list(
        &self,
        filter: JasaFilter,
        page: PageRequest,
    ) -> Result<(Vec<JasaResponse>, u64), ServiceError> {
        let mut query = Jasa::find().filter(jasa::Column::Display.eq(true));
        if let Some(kategori) = filter.kategori.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(jasa::Column::Kategori.eq(kategori));
        }

        let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let mut models: Vec<jasa::Model> = query
            .all(&*self.db)
            .await?
            .into_iter()
            .filter(|m| match search {
                Some(term) => contains_ci(&m.nama_jasa, term) || contains_ci(&m.kode_jasa, term),
                None => true,
            })
            .collect();

        match filter.sort {
            JasaSort::Terbaru => models.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            JasaSort::HargaTerendah => models.sort_by(|a, b| a.harga.cmp(&b.harga)),
            JasaSort::HargaTertinggi => models.sort_by(|a, b| b.harga.cmp(&a.harga)),
        }

        let total = models.len() as u64;
        let items = page
            .slice(models)
            .into_iter()
            .map(|m| self.to_response(m))
            .collect();
        Ok((items, total))
    }

    pub async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        let categories = Jasa::find()
            .select_only()
            .column(jasa::Column::Kategori)
            .distinct()
            .filter(jasa::Column::Display.eq(true))
            .order_by_asc(jasa::Column::Kategori)
            .into_tuple::<String>()
            .all(&*self.db)
            .await?;
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::test_db;
    use crate::storage::LocalStorage;
    use bytes::Bytes;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn input(kode: &str, harga: Decimal) -> JasaInput {
        JasaInput {
            kode_jasa: kode.into(),
            nama_jasa: format!("Cuci AC {}", kode),
            deskripsi: None,
            kategori: "Perawatan".into(),
            harga,
            display: true,
            status_rekomendasi: false,
            snk: Some("Garansi 7 hari".into()),
        }
    }

    fn foto(name: &str) -> UploadedFile {
        UploadedFile::new("foto", name, Bytes::from_static(b"jpeg"))
    }

    #[tokio::test]
    async fn update_replaces_photo_and_removes_old_file() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path(), "/storage"));
        let service = JasaService::new(test_db().await, storage.clone(), 1024);

        let created = service
            .create(input("JS-01", dec!(150000)), Some(foto("a.jpg")))
            .await
            .unwrap();
        let old = created.foto.clone().unwrap();
        assert!(old.starts_with("gambar/jasa/"));

        let updated = service
            .update(created.id, input("JS-01", dec!(175000)), Some(foto("b.jpg")))
            .await
            .unwrap();
        let new = updated.foto.unwrap();

        assert_ne!(old, new);
        assert!(!storage.exists(&old).await.unwrap());
        assert!(storage.exists(&new).await.unwrap());

        service.delete(created.id).await.unwrap();
        assert!(!storage.exists(&new).await.unwrap());
    }

    #[tokio::test]
    async fn storefront_sorts_by_price_and_skips_hidden() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path(), "/storage"));
        let service = JasaService::new(test_db().await, storage, 1024);

        service.create(input("JS-01", dec!(300000)), None).await.unwrap();
        service.create(input("JS-02", dec!(100000)), None).await.unwrap();
        let hidden = service.create(input("JS-03", dec!(50000)), None).await.unwrap();
        service.toggle_display(hidden.id).await.unwrap();

        let (items, total) = service
            .storefront_list(
                JasaFilter {
                    sort: JasaSort::HargaTerendah,
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert_eq!(items[0].kode_jasa, "JS-02");
        assert_eq!(service.categories().await.unwrap(), vec!["Perawatan"]);
    }

    #[tokio::test]
    async fn duplicate_kode_jasa_is_a_field_error() {
        let dir = TempDir::new().unwrap();
        let service = JasaService::new(
            test_db().await,
            Arc::new(LocalStorage::new(dir.path(), "/storage")),
            1024,
        );
        service.create(input("JS-01", dec!(1)), None).await.unwrap();

        let err = service.create(input("JS-01", dec!(1)), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::FieldErrors(ref bag) if bag.get("kode_jasa").is_some()));
    }
}
