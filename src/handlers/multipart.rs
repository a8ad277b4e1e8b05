//! Form parsing for the upload endpoints.
//!
//! Array fields arrive as `gambar_deskripsi[]` style names; the brackets are
//! stripped so repeated values collect under one key. Text that fails to
//! parse becomes a field error on the same key the validator would use.

use crate::{
    errors::{ApiError, FieldErrors},
    services::{barang::BarangInput, barang::BarangUploads, jasa::JasaInput},
    storage::UploadedFile,
};
use axum::extract::Multipart;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
        {
            let name = field
                .name()
                .map(|n| n.trim_end_matches("[]").to_string())
                .unwrap_or_default();
            if name.is_empty() {
                continue;
            }

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e)))?;
                    // browsers send an empty part for an untouched file input
                    if file_name.is_empty() && content.is_empty() {
                        continue;
                    }
                    form.files
                        .entry(name.clone())
                        .or_default()
                        .push(UploadedFile::new(name, file_name, content));
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Invalid form field: {}", e)))?;
                    form.fields.entry(name).or_default().push(text);
                }
            }
        }

        Ok(form)
    }

    /// First value of a text field, `None` when missing or blank
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Every value of a repeated text field, blanks kept so positions line up
    pub fn texts(&self, name: &str) -> Vec<String> {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.get_mut(name).and_then(|files| {
            if files.is_empty() {
                None
            } else {
                Some(files.remove(0))
            }
        })
    }

    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }

    fn required<T: FromStr>(&self, name: &str, kind: &str, errors: &mut FieldErrors) -> Option<T> {
        match self.text(name) {
            None => {
                errors.add(name, format!("The {} field is required", name));
                None
            }
            Some(raw) => match raw.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    errors.add(name, format!("The {} must be {}", name, kind));
                    None
                }
            },
        }
    }

    fn decimal(&self, name: &str, errors: &mut FieldErrors) -> Decimal {
        self.required(name, "a number", errors).unwrap_or_default()
    }

    fn integer(&self, name: &str, errors: &mut FieldErrors) -> i32 {
        self.required(name, "an integer", errors).unwrap_or_default()
    }

    fn optional_integer(&self, name: &str, errors: &mut FieldErrors) -> i32 {
        if self.text(name).is_none() {
            return 0;
        }
        self.integer(name, errors)
    }

    fn boolean(&self, name: &str, default: bool, errors: &mut FieldErrors) -> bool {
        match self.text(name).map(|v| v.to_ascii_lowercase()) {
            None => default,
            Some(v) => match v.as_str() {
                "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" => false,
                _ => {
                    errors.add(name, format!("The {} field must be true or false", name));
                    default
                }
            },
        }
    }
}

/// Parse errors are reported together with the validator's own messages.
/// Unparsed numbers default to zero, which the validator accepts, so a field
/// never carries both kinds of message.
fn finish<T: Validate>(input: T, mut errors: FieldErrors) -> Result<T, ApiError> {
    if errors.is_empty() {
        return Ok(input);
    }
    if let Err(validation) = input.validate() {
        errors.merge(validation.into());
    }
    Err(ApiError::FieldErrors(errors))
}

pub fn barang_form(mut form: MultipartForm) -> Result<(BarangInput, BarangUploads), ApiError> {
    let mut errors = FieldErrors::new();

    let input = BarangInput {
        kode_barang: form.text("kode_barang").unwrap_or_default(),
        nama_barang: form.text("nama_barang").unwrap_or_default(),
        deskripsi: form.text("deskripsi"),
        merek: form.text("merek"),
        kategori: form.text("kategori").unwrap_or_default(),
        harga_beli: form.decimal("harga_beli", &mut errors),
        harga_jual: form.decimal("harga_jual", &mut errors),
        diskon: form.optional_integer("diskon", &mut errors),
        stok: form.integer("stok", &mut errors),
        display: form.boolean("display", true, &mut errors),
        status_rekomendasi: form.boolean("status_rekomendasi", false, &mut errors),
    };

    let captions = form
        .texts("caption")
        .into_iter()
        .map(|c| Some(c.trim().to_string()).filter(|c| !c.is_empty()))
        .collect();
    let hapus_gambar_deskripsi = form
        .texts("hapus_gambar_deskripsi")
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    let uploads = BarangUploads {
        gambar: form.take_file("gambar"),
        gambar_deskripsi: form.take_files("gambar_deskripsi"),
        captions,
        hapus_gambar_deskripsi,
    };

    Ok((finish(input, errors)?, uploads))
}

pub fn jasa_form(mut form: MultipartForm) -> Result<(JasaInput, Option<UploadedFile>), ApiError> {
    let mut errors = FieldErrors::new();

    let input = JasaInput {
        kode_jasa: form.text("kode_jasa").unwrap_or_default(),
        nama_jasa: form.text("nama_jasa").unwrap_or_default(),
        deskripsi: form.text("deskripsi"),
        kategori: form.text("kategori").unwrap_or_default(),
        harga: form.decimal("harga", &mut errors),
        display: form.boolean("display", true, &mut errors),
        status_rekomendasi: form.boolean("status_rekomendasi", false, &mut errors),
        snk: form.text("snk"),
    };
    let foto = form.take_file("foto");

    Ok((finish(input, errors)?, foto))
}
