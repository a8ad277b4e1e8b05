use async_trait::async_trait;
use chrono::Utc;
use rand::RngCore;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use super::{file_extension, FileStorage, StorageError, StorageResult};
use crate::config::AppConfig;

/// Local file system storage rooted at `storage_root`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    url_prefix: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into().trim_end_matches('/').to_string();
        Self {
            base_path: base_path.into(),
            url_prefix,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.storage_root, config.storage_url_prefix.clone())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolves a relative path under the root. Anything other than plain
    /// path segments is refused.
    fn get_path(&self, relative: &str) -> StorageResult<PathBuf> {
        let relative_path = Path::new(relative);
        let only_normal = relative_path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if relative.trim().is_empty() || !only_normal {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }

        Ok(self.base_path.join(relative_path))
    }

    fn generate_name(original_name: &str) -> String {
        let mut random = [0u8; 5];
        rand::thread_rng().fill_bytes(&mut random);
        let ext = file_extension(original_name).unwrap_or_else(|| "bin".to_string());
        format!("{}_{}.{}", Utc::now().timestamp(), hex::encode(random), ext)
    }
}

fn join_relative(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn save(&self, dir: &str, original_name: &str, content: &[u8]) -> StorageResult<String> {
        let target_dir = self.get_path(dir)?;
        fs::create_dir_all(&target_dir).await?;

        let relative = join_relative(dir, &Self::generate_name(original_name));
        let path = self.get_path(&relative)?;
        fs::write(&path, content).await?;

        debug!(path = %relative, bytes = content.len(), "stored file");
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        let full_path = self.get_path(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(path, "deleted file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path, "file to delete was already missing");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn move_file(&self, path: &str, new_dir: &str) -> StorageResult<String> {
        let source = self.get_path(path)?;
        let file_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?
            .to_string();

        let relative = join_relative(new_dir, &file_name);
        if relative == path {
            return Ok(relative);
        }

        if !fs::try_exists(&source).await? {
            return Err(StorageError::NotFound(path.to_string()));
        }

        fs::create_dir_all(self.get_path(new_dir)?).await?;
        fs::rename(&source, self.get_path(&relative)?).await?;

        debug!(from = path, to = %relative, "moved file");
        Ok(relative)
    }

    async fn remove_dir_if_empty(&self, dir: &str) -> StorageResult<bool> {
        let full_path = self.get_path(dir)?;
        let mut entries = match fs::read_dir(&full_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        if entries.next_entry().await?.is_some() {
            return Ok(false);
        }

        fs::remove_dir(&full_path).await?;
        debug!(dir, "removed empty directory");
        Ok(true)
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let full_path = self.get_path(path)?;
        Ok(fs::try_exists(&full_path).await? && full_path.is_file())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.url_prefix, path.trim_start_matches('/'))
    }
}
