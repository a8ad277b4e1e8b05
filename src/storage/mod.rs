//! Disk-backed storage for uploaded images and payment proofs.
//!
//! Stored files are addressed by a path relative to the storage root, e.g.
//! `gambar/produk/ac-split/1718000000_a1b2c3d4e5.png`. That relative path is
//! what the database keeps; [`FileStorage::public_url`] turns it into the URL
//! the static file service answers on.

mod local;

pub use local::LocalStorage;

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::errors::FieldErrors;

/// Folder for service photos
pub const JASA_DIR: &str = "gambar/jasa";
/// Folder for payment proofs
pub const BUKTI_PEMBAYARAN_DIR: &str = "bukti_pembayaran";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const PROOF_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "pdf"];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("File not found: {0}")]
    NotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Writes `content` into `dir` under a generated name and returns the
    /// relative path of the new file.
    async fn save(&self, dir: &str, original_name: &str, content: &[u8]) -> StorageResult<String>;

    /// Removes a file. A file that is already gone is not an error.
    async fn delete(&self, path: &str) -> StorageResult<()>;

    /// Moves a file into `new_dir`, keeping its file name.
    async fn move_file(&self, path: &str, new_dir: &str) -> StorageResult<String>;

    /// Removes `dir` when it has no entries left. Returns whether it was removed.
    async fn remove_dir_if_empty(&self, dir: &str) -> StorageResult<bool>;

    async fn exists(&self, path: &str) -> StorageResult<bool>;

    fn public_url(&self, path: &str) -> String;
}

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file arrived under, used to key validation errors
    pub field: String,
    pub file_name: String,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, content: Bytes) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content,
        }
    }

    pub fn extension(&self) -> Option<String> {
        file_extension(&self.file_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    PaymentProof,
}

impl UploadKind {
    fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Image => IMAGE_EXTENSIONS,
            UploadKind::PaymentProof => PROOF_EXTENSIONS,
        }
    }
}

/// Checks extension and size of an upload, collecting problems under the
/// file's form field name.
pub fn validate_upload(file: &UploadedFile, kind: UploadKind, max_bytes: usize) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let allowed = kind.allowed_extensions();

    match file.extension() {
        Some(ext) if allowed.contains(&ext.as_str()) => {}
        _ => errors.add(
            file.field.clone(),
            format!("The {} must be a file of type: {}", file.field, allowed.join(", ")),
        ),
    }

    if file.content.is_empty() {
        errors.add(file.field.clone(), format!("The {} must not be empty", file.field));
    } else if file.content.len() > max_bytes {
        errors.add(
            file.field.clone(),
            format!(
                "The {} must not be greater than {} kilobytes",
                file.field,
                max_bytes / 1024
            ),
        );
    }

    errors
}

/// Folder slug for a category, "AC Split" becomes `ac-split`.
pub fn category_slug(kategori: &str) -> String {
    let slug = slug::slugify(kategori);
    if slug.is_empty() {
        "lainnya".to_string()
    } else {
        slug
    }
}

/// Folder holding a product's images for the given category
pub fn produk_dir(kategori: &str) -> String {
    format!("gambar/produk/{}", category_slug(kategori))
}

/// Directory part of a relative storage path
pub fn parent_dir(path: &str) -> Option<String> {
    Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .filter(|p| !p.is_empty())
}

fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AC Split", "ac-split")]
    #[case("  Cassette / Ceiling  ", "cassette-ceiling")]
    #[case("Sparepart", "sparepart")]
    #[case("***", "lainnya")]
    fn slugs_categories(#[case] kategori: &str, #[case] expected: &str) {
        assert_eq!(category_slug(kategori), expected);
    }

    #[test]
    fn produk_dir_uses_category_slug() {
        assert_eq!(produk_dir("AC Split"), "gambar/produk/ac-split");
    }

    #[test]
    fn image_upload_rejects_pdf_but_proof_accepts_it() {
        let file = UploadedFile::new("gambar", "brosur.PDF", Bytes::from_static(b"%PDF"));
        let errors = validate_upload(&file, UploadKind::Image, 1024);
        assert!(errors.get("gambar").is_some());

        let proof = UploadedFile::new("bukti", "transfer.pdf", Bytes::from_static(b"%PDF"));
        assert!(validate_upload(&proof, UploadKind::PaymentProof, 1024).is_empty());
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let file = UploadedFile::new("foto", "besar.jpg", Bytes::from(vec![0u8; 2048]));
        let errors = validate_upload(&file, UploadKind::Image, 1024);
        assert_eq!(errors.get("foto").map(|m| m.len()), Some(1));
    }

    #[test]
    fn parent_dir_of_relative_path() {
        assert_eq!(
            parent_dir("gambar/produk/ac-split/a.png").as_deref(),
            Some("gambar/produk/ac-split")
        );
        assert_eq!(parent_dir("a.png"), None);
    }
}
