use crate::{
    entities::{
        barang::{self, gambar_deskripsi_json, GambarDeskripsi},
        keranjang, user_feedback, user_likes_barang, Barang, Keranjang, UserFeedback,
        UserLikesBarang,
    },
    errors::{FieldErrors, ServiceError},
    services::{contains_ci, PageRequest},
    storage::{self, validate_upload, FileStorage, UploadKind, UploadedFile},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut error = ValidationError::new("min");
        error.message = Some("The value must be at least 0".into());
        return Err(error);
    }
    Ok(())
}

/// Product fields accepted on create and update
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct BarangInput {
    #[validate(length(min = 1, max = 50, message = "The kode_barang field is required"))]
    pub kode_barang: String,
    #[validate(length(min = 1, max = 255, message = "The nama_barang field is required"))]
    pub nama_barang: String,
    pub deskripsi: Option<String>,
    #[validate(length(max = 100, message = "The merek may not be greater than 100 characters"))]
    pub merek: Option<String>,
    #[validate(length(min = 1, max = 100, message = "The kategori field is required"))]
    pub kategori: String,
    #[validate(custom = "validate_non_negative")]
    pub harga_beli: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub harga_jual: Decimal,
    #[validate(range(min = 0, max = 100, message = "The diskon must be between 0 and 100"))]
    pub diskon: i32,
    #[validate(range(min = 0, message = "The stok must be at least 0"))]
    pub stok: i32,
    #[serde(default = "default_true")]
    pub display: bool,
    #[serde(default)]
    pub status_rekomendasi: bool,
}

fn default_true() -> bool {
    true
}

impl BarangInput {
    /// Trims the identifying text fields so validation and the uniqueness
    /// check see exactly what gets stored.
    pub fn normalized(mut self) -> Self {
        self.kode_barang = self.kode_barang.trim().to_string();
        self.nama_barang = self.nama_barang.trim().to_string();
        self.kategori = self.kategori.trim().to_string();
        self.merek = self
            .merek
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        self
    }
}

/// Files sent along a product form
#[derive(Debug, Clone, Default)]
pub struct BarangUploads {
    pub gambar: Option<UploadedFile>,
    pub gambar_deskripsi: Vec<UploadedFile>,
    /// Captions paired with `gambar_deskripsi` by position
    pub captions: Vec<Option<String>>,
    /// Description images to drop, by stored path or public URL (update only)
    pub hapus_gambar_deskripsi: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarangSort {
    #[default]
    Terbaru,
    HargaTerendah,
    HargaTertinggi,
    Terpopuler,
    Rating,
}

#[derive(Debug, Clone, Default)]
pub struct BarangFilter {
    pub search: Option<String>,
    pub kategori: Option<String>,
    pub min_harga: Option<Decimal>,
    pub max_harga: Option<Decimal>,
    pub rekomendasi: Option<bool>,
    pub sort: BarangSort,
}

/// Like and rating aggregates for one product
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BarangStats {
    pub total_likes: u64,
    pub average_rating: f64,
    pub total_feedback: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GambarDeskripsiResponse {
    pub path: String,
    pub url: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarangResponse {
    pub id: Uuid,
    pub kode_barang: String,
    pub nama_barang: String,
    pub deskripsi: Option<String>,
    pub merek: Option<String>,
    pub kategori: String,
    /// Purchase price, only exposed to admins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harga_beli: Option<Decimal>,
    pub harga_jual: Decimal,
    pub diskon: i32,
    pub harga_setelah_diskon: Decimal,
    pub stok: i32,
    pub display: bool,
    pub status_rekomendasi: bool,
    pub gambar: Option<String>,
    pub gambar_url: Option<String>,
    pub gambar_deskripsi: Vec<GambarDeskripsiResponse>,
    pub total_likes: u64,
    pub average_rating: f64,
    pub total_feedback: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product catalogue: admin CRUD, storefront listing and image handling.
#[derive(Clone)]
pub struct BarangService {
    db: Arc<DatabaseConnection>,
    storage: Arc<dyn FileStorage>,
    max_upload_bytes: usize,
}

impl BarangService {
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

    /// Loads like and rating aggregates, for the given products or for all.
    pub async fn load_stats<C>(
        conn: &C,
        ids: Option<&[Uuid]>,
    ) -> Result<HashMap<Uuid, BarangStats>, ServiceError>
    where
        C: ConnectionTrait,
    {
        let mut likes_query =
            UserLikesBarang::find().filter(user_likes_barang::Column::Liked.eq(true));
        let mut feedback_query = UserFeedback::find();
        if let Some(ids) = ids {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }
            likes_query =
                likes_query.filter(user_likes_barang::Column::BarangId.is_in(ids.to_vec()));
            feedback_query =
                feedback_query.filter(user_feedback::Column::BarangId.is_in(ids.to_vec()));
        }

        let mut stats: HashMap<Uuid, BarangStats> = HashMap::new();
        for like in likes_query.all(conn).await? {
            stats.entry(like.barang_id).or_default().total_likes += 1;
        }

        let mut rating_sums: HashMap<Uuid, i64> = HashMap::new();
        for feedback in feedback_query.all(conn).await? {
            stats.entry(feedback.barang_id).or_default().total_feedback += 1;
            *rating_sums.entry(feedback.barang_id).or_default() += i64::from(feedback.rating);
        }

        for (barang_id, sum) in rating_sums {
            if let Some(entry) = stats.get_mut(&barang_id) {
                entry.average_rating = average(sum, entry.total_feedback);
            }
        }

        Ok(stats)
    }

    pub fn to_response(
        &self,
        model: barang::Model,
        stats: BarangStats,
        include_cost: bool,
    ) -> BarangResponse {
        let harga_setelah_diskon = model.harga_setelah_diskon();
        let gambar_deskripsi = model
            .gambar_deskripsi_list()
            .into_iter()
            .map(|entry| GambarDeskripsiResponse {
                url: self.storage.public_url(&entry.url),
                path: entry.url,
                caption: entry.caption,
            })
            .collect();

        BarangResponse {
            id: model.id,
            kode_barang: model.kode_barang,
            nama_barang: model.nama_barang,
            deskripsi: model.deskripsi,
            merek: model.merek,
            kategori: model.kategori,
            harga_beli: include_cost.then_some(model.harga_beli),
            harga_jual: model.harga_jual,
            diskon: model.diskon,
            harga_setelah_diskon,
            stok: model.stok,
            display: model.display,
            status_rekomendasi: model.status_rekomendasi,
            gambar_url: model.gambar.as_deref().map(|p| self.storage.public_url(p)),
            gambar: model.gambar,
            gambar_deskripsi,
            total_likes: stats.total_likes,
            average_rating: stats.average_rating,
            total_feedback: stats.total_feedback,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    /// Attaches aggregates to a batch of products
    pub async fn with_stats(
        &self,
        models: Vec<barang::Model>,
        include_cost: bool,
    ) -> Result<Vec<BarangResponse>, ServiceError> {
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let stats = Self::load_stats(&*self.db, Some(&ids)).await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let entry = stats.get(&model.id).copied().unwrap_or_default();
                self.to_response(model, entry, include_cost)
            })
            .collect())
    }

    async fn check_kode_unique(
        &self,
        kode_barang: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<String>, ServiceError> {
        let mut query = Barang::find().filter(barang::Column::KodeBarang.eq(kode_barang));
        if let Some(id) = exclude {
            query = query.filter(barang::Column::Id.ne(id));
        }
        Ok(query
            .one(&*self.db)
            .await?
            .map(|_| "The kode_barang has already been taken".to_string()))
    }

    async fn validate_form(
        &self,
        input: &BarangInput,
        uploads: &BarangUploads,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut errors: FieldErrors = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        if let Some(message) = self.check_kode_unique(&input.kode_barang, exclude).await? {
            errors.add("kode_barang", message);
        }
        if let Some(file) = &uploads.gambar {
            errors.merge(validate_upload(file, UploadKind::Image, self.max_upload_bytes));
        }
        for file in &uploads.gambar_deskripsi {
            errors.merge(validate_upload(file, UploadKind::Image, self.max_upload_bytes));
        }

        errors.into_result()
    }

    async fn store_description_images(
        &self,
        dir: &str,
        uploads: &BarangUploads,
        saved: &mut Vec<String>,
    ) -> Result<Vec<GambarDeskripsi>, ServiceError> {
        let mut entries = Vec::with_capacity(uploads.gambar_deskripsi.len());
        for (index, file) in uploads.gambar_deskripsi.iter().enumerate() {
            let path = self.storage.save(dir, &file.file_name, &file.content).await?;
            saved.push(path.clone());
            entries.push(GambarDeskripsi {
                url: path,
                caption: uploads
                    .captions
                    .get(index)
                    .cloned()
                    .flatten()
                    .filter(|c| !c.trim().is_empty()),
            });
        }
        Ok(entries)
    }

    async fn discard_files(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.storage.delete(path).await {
                warn!(path = %path, error = %e, "failed to remove stored file");
            }
        }
    }

    #[instrument(skip(self, input, uploads), fields(kode_barang = %input.kode_barang))]
    pub async fn create(
        &self,
        input: BarangInput,
        uploads: BarangUploads,
    ) -> Result<BarangResponse, ServiceError> {
        let input = input.normalized();
        self.validate_form(&input, &uploads, None).await?;

        let dir = storage::produk_dir(&input.kategori);
        let mut saved = Vec::new();

        let result = async {
            let gambar = match &uploads.gambar {
                Some(file) => {
                    let path = self.storage.save(&dir, &file.file_name, &file.content).await?;
                    saved.push(path.clone());
                    Some(path)
                }
                None => None,
            };
            let deskripsi = self
                .store_description_images(&dir, &uploads, &mut saved)
                .await?;

            let model = barang::ActiveModel {
                id: Set(Uuid::new_v4()),
                kode_barang: Set(input.kode_barang.clone()),
                nama_barang: Set(input.nama_barang.clone()),
                deskripsi: Set(input.deskripsi.clone()),
                merek: Set(input.merek.clone()),
                kategori: Set(input.kategori.clone()),
                harga_beli: Set(input.harga_beli),
                harga_jual: Set(input.harga_jual),
                diskon: Set(input.diskon),
                stok: Set(input.stok),
                display: Set(input.display),
                status_rekomendasi: Set(input.status_rekomendasi),
                gambar: Set(gambar),
                gambar_deskripsi: Set(gambar_deskripsi_json(&deskripsi)),
                ..Default::default()
            }
            .insert(&*self.db)
            .await?;

            Ok::<_, ServiceError>(model)
        }
        .await;

        match result {
            Ok(model) => {
                info!(barang_id = %model.id, "created barang");
                Ok(self.to_response(model, BarangStats::default(), true))
            }
            Err(e) => {
                self.discard_files(&saved).await;
                Err(e)
            }
        }
    }

    #[instrument(skip(self, input, uploads))]
    pub async fn update(
        &self,
        id: Uuid,
        input: BarangInput,
        uploads: BarangUploads,
    ) -> Result<BarangResponse, ServiceError> {
        let input = input.normalized();
        let existing = self.find(id).await?;
        self.validate_form(&input, &uploads, Some(id)).await?;

        let old_dir = storage::produk_dir(&existing.kategori);
        let new_dir = storage::produk_dir(&input.kategori);
        let moving = old_dir != new_dir;

        let mut saved = Vec::new();
        let mut moved: Vec<(String, String)> = Vec::new();
        let mut to_delete = Vec::new();

        // Description images: drop requested ones, keep (and maybe move) the rest.
        let mut deskripsi = Vec::new();
        for entry in existing.gambar_deskripsi_list() {
            let public = self.storage.public_url(&entry.url);
            let removed = uploads
                .hapus_gambar_deskripsi
                .iter()
                .any(|item| item == &entry.url || item == &public);
            if removed {
                to_delete.push(entry.url);
            } else {
                deskripsi.push(entry);
            }
        }

        let staged = async {
            let gambar = match (&uploads.gambar, existing.gambar.clone()) {
                (Some(file), old) => {
                    let path = self
                        .storage
                        .save(&new_dir, &file.file_name, &file.content)
                        .await?;
                    saved.push(path.clone());
                    to_delete.extend(old);
                    Some(path)
                }
                (None, Some(old)) if moving => Some(self.relocate(&old, &new_dir, &mut moved).await),
                (None, old) => old,
            };

            if moving {
                for entry in deskripsi.iter_mut() {
                    entry.url = self.relocate(&entry.url, &new_dir, &mut moved).await;
                }
            }
            let added = self
                .store_description_images(&new_dir, &uploads, &mut saved)
                .await?;
            deskripsi.extend(added);

            let mut active: barang::ActiveModel = existing.clone().into();
            active.kode_barang = Set(input.kode_barang.clone());
            active.nama_barang = Set(input.nama_barang.clone());
            active.deskripsi = Set(input.deskripsi.clone());
            active.merek = Set(input.merek.clone());
            active.kategori = Set(input.kategori.clone());
            active.harga_beli = Set(input.harga_beli);
            active.harga_jual = Set(input.harga_jual);
            active.diskon = Set(input.diskon);
            active.stok = Set(input.stok);
            active.display = Set(input.display);
            active.status_rekomendasi = Set(input.status_rekomendasi);
            active.gambar = Set(gambar);
            active.gambar_deskripsi = Set(gambar_deskripsi_json(&deskripsi));

            Ok::<_, ServiceError>(active.update(&*self.db).await?)
        }
        .await;

        let model = match staged {
            Ok(model) => model,
            Err(e) => {
                self.discard_files(&saved).await;
                for (original, current) in moved.iter().rev() {
                    if let Some(dir) = storage::parent_dir(original) {
                        if let Err(err) = self.storage.move_file(current, &dir).await {
                            warn!(path = %current, error = %err, "failed to restore moved file");
                        }
                    }
                }
                return Err(e);
            }
        };

        self.discard_files(&to_delete).await;
        if moving {
            self.remove_dir_quietly(&old_dir).await;
        }

        info!(barang_id = %model.id, "updated barang");
        let stats = Self::load_stats(&*self.db, Some(&[model.id]))
            .await?
            .remove(&model.id)
            .unwrap_or_default();
        Ok(self.to_response(model, stats, true))
    }

    /// Moves a stored file into `dir`. A failed move keeps the old path.
    async fn relocate(&self, path: &str, dir: &str, moved: &mut Vec<(String, String)>) -> String {
        match self.storage.move_file(path, dir).await {
            Ok(new_path) => {
                if new_path != path {
                    moved.push((path.to_string(), new_path.clone()));
                }
                new_path
            }
            Err(e) => {
                warn!(path, error = %e, "failed to move image to new category folder");
                path.to_string()
            }
        }
    }

    async fn remove_dir_quietly(&self, dir: &str) {
        if let Err(e) = self.storage.remove_dir_if_empty(dir).await {
            warn!(dir, error = %e, "failed to remove category folder");
        }
    }

    /// Removes the product with its likes, feedback and cart lines, then its images.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find(id).await?;

        let txn = self.db.begin().await?;
        UserLikesBarang::delete_many()
            .filter(user_likes_barang::Column::BarangId.eq(id))
            .exec(&txn)
            .await?;
        UserFeedback::delete_many()
            .filter(user_feedback::Column::BarangId.eq(id))
            .exec(&txn)
            .await?;
        Keranjang::delete_many()
            .filter(keranjang::Column::BarangId.eq(id))
            .exec(&txn)
            .await?;
        Barang::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        let mut files: Vec<String> = existing.gambar.clone().into_iter().collect();
        files.extend(existing.gambar_deskripsi_list().into_iter().map(|e| e.url));
        self.discard_files(&files).await;

        let mut dirs: BTreeSet<String> = files.iter().filter_map(|p| storage::parent_dir(p)).collect();
        dirs.insert(storage::produk_dir(&existing.kategori));
        for dir in dirs {
            self.remove_dir_quietly(&dir).await;
        }

        info!(barang_id = %id, "deleted barang");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn toggle_display(&self, id: Uuid) -> Result<BarangResponse, ServiceError> {
        let existing = self.find(id).await?;
        let flipped = !existing.display;
        let mut active: barang::ActiveModel = existing.into();
        active.display = Set(flipped);
        let model = active.update(&*self.db).await?;
        info!(barang_id = %id, display = flipped, "toggled barang display");
        self.single(model, true).await
    }

    #[instrument(skip(self))]
    pub async fn toggle_rekomendasi(&self, id: Uuid) -> Result<BarangResponse, ServiceError> {
        let existing = self.find(id).await?;
        let flipped = !existing.status_rekomendasi;
        let mut active: barang::ActiveModel = existing.into();
        active.status_rekomendasi = Set(flipped);
        let model = active.update(&*self.db).await?;
        info!(barang_id = %id, rekomendasi = flipped, "toggled barang recommendation");
        self.single(model, true).await
    }

    pub async fn find(&self, id: Uuid) -> Result<barang::Model, ServiceError> {
        Barang::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Barang {} not found", id)))
    }

    async fn single(
        &self,
        model: barang::Model,
        include_cost: bool,
    ) -> Result<BarangResponse, ServiceError> {
        let mut items = self.with_stats(vec![model], include_cost).await?;
        items
            .pop()
            .ok_or_else(|| ServiceError::InternalError("empty stats batch".to_string()))
    }

    /// Admin detail, hidden products included
    pub async fn get(&self, id: Uuid) -> Result<BarangResponse, ServiceError> {
        let model = self.find(id).await?;
        self.single(model, true).await
    }

    /// Storefront detail, hidden products are not found
    pub async fn get_displayed(&self, id: Uuid) -> Result<BarangResponse, ServiceError> {
        let model = self.find(id).await?;
        if !model.display {
            return Err(ServiceError::NotFound(format!("Barang {} not found", id)));
        }
        self.single(model, false).await
    }

    fn search_condition(search: &str) -> Condition {
        Condition::any()
            .add(barang::Column::NamaBarang.contains(search))
            .add(barang::Column::KodeBarang.contains(search))
            .add(barang::Column::Merek.contains(search))
    }

    #[instrument(skip(self))]
    pub async fn admin_list(
        &self,
        filter: BarangFilter,
        page: PageRequest,
    ) -> Result<(Vec<BarangResponse>, u64), ServiceError> {
        let mut query = Barang::find();
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.filter(Self::search_condition(search.trim()));
        }
        if let Some(kategori) = filter.kategori.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(barang::Column::Kategori.eq(kategori));
        }

        let total = query.clone().count(&*self.db).await?;
        let models = query
            .order_by_desc(barang::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit)
            .all(&*self.db)
            .await?;

        Ok((self.with_stats(models, true).await?, total))
    }

    /// Displayed products with price filters and popularity sorts, which need
    /// the aggregates and are applied in memory.
    #[instrument(skip(self))]
    pub async fn storefront_list(
        &self,
        filter: BarangFilter,
        page: PageRequest,
    ) -> Result<(Vec<BarangResponse>, u64), ServiceError> {
        let mut query = Barang::find().filter(barang::Column::Display.eq(true));
        if let Some(kategori) = filter.kategori.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(barang::Column::Kategori.eq(kategori));
        }
        if let Some(rekomendasi) = filter.rekomendasi {
            query = query.filter(barang::Column::StatusRekomendasi.eq(rekomendasi));
        }

        let models = query.all(&*self.db).await?;
        let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let mut items: Vec<BarangResponse> = self
            .with_stats(models, false)
            .await?
            .into_iter()
            .filter(|item| match search {
                Some(term) => {
                    contains_ci(&item.nama_barang, term)
                        || contains_ci(&item.kode_barang, term)
                        || item.merek.as_deref().is_some_and(|m| contains_ci(m, term))
                }
                None => true,
            })
            .filter(|item| {
                filter.min_harga.map_or(true, |min| item.harga_setelah_diskon >= min)
                    && filter.max_harga.map_or(true, |max| item.harga_setelah_diskon <= max)
            })
            .collect();

        sort_barang(&mut items, filter.sort);
        let total = items.len() as u64;
        Ok((page.slice(items), total))
    }

    /// Distinct categories of displayed products
    pub async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        let categories = Barang::find()
            .select_only()
            .column(barang::Column::Kategori)
            .distinct()
            .filter(barang::Column::Display.eq(true))
            .order_by_asc(barang::Column::Kategori)
            .into_tuple::<String>()
            .all(&*self.db)
            .await?;
        Ok(categories)
    }
}

fn average(sum: i64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    ((sum as f64 / count as f64) * 100.0).round() / 100.0
}

pub(crate) fn sort_barang(items: &mut [BarangResponse], sort: BarangSort) {
    match sort {
        BarangSort::Terbaru => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        BarangSort::HargaTerendah => {
            items.sort_by(|a, b| a.harga_setelah_diskon.cmp(&b.harga_setelah_diskon))
        }
        BarangSort::HargaTertinggi => {
            items.sort_by(|a, b| b.harga_setelah_diskon.cmp(&a.harga_setelah_diskon))
        }
        BarangSort::Terpopuler => items.sort_by(|a, b| {
            b.total_likes
                .cmp(&a.total_likes)
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
        BarangSort::Rating => items.sort_by(|a, b| {
            b.average_rating
                .total_cmp(&a.average_rating)
                .then_with(|| b.total_feedback.cmp(&a.total_feedback))
        }),
    }
}
