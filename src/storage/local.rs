//! Local filesystem storage backend.

use super::{StorageBackend, StorageError, StorageObject};
use actix_web::web::{self, Bytes};
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

/// Local filesystem storage backend.
pub struct LocalStorage {
    /// Base path for file storage
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend.
    ///
    /// The `base_path` directory will be created if it doesn't exist.
    pub fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path)?;
        log::info!("LocalStorage initialized at {:?}", base_path);
        Ok(Self { base_path })
    }

    /// Get the full path for a key, fanning out on the first characters of the filename.
    ///
    /// `recipes/images/abcdef.png` lands in `recipes/images/ab/cd/abcdef.png`.
    fn get_file_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty()
            || key.starts_with('/')
            || key.split('/').any(|part| part.is_empty() || part == "." || part == "..")
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-'))
        {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }

        let (dir, filename) = match key.rsplit_once('/') {
            Some((dir, filename)) => (self.base_path.join(dir), filename),
            None => (self.base_path.clone(), key),
        };

        if filename.len() < 4 {
            Ok(dir.join(filename))
        } else {
            Ok(dir.join(&filename[0..2]).join(&filename[2..4]).join(filename))
        }
    }

    /// Get MIME type from filename extension.
    fn get_mime_type(filename: &str) -> Option<String> {
        let ext = filename.rsplit('.').next()?;
        let mime = match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            "bmp" => "image/bmp",
            "avif" => "image/avif",
            _ => "application/octet-stream",
        };
        Some(mime.to_string())
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn put_object(&self, data: Vec<u8>, key: &str) -> Result<(), StorageError> {
        let path = self.get_file_path(key)?;
        log::info!("LocalStorage: put_object: {:?}", path);

        web::block(move || {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, data)
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;

        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<StorageObject, StorageError> {
        let path = self.get_file_path(key)?;
        log::debug!("LocalStorage: get_object: {:?}", path);

        let (buffer, metadata) = web::block(move || -> Result<_, StorageError> {
            let metadata = fs::metadata(&path)?;
            let buffer = fs::read(&path)?;
            Ok((buffer, metadata))
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;

        let e_tag = metadata.modified().ok().map(|t: std::time::SystemTime| {
            let duration = t.duration_since(std::time::UNIX_EPOCH).unwrap_or_default();
            format!("\"{}-{}\"", duration.as_secs(), metadata.len())
        });

        Ok(StorageObject {
            body: Bytes::from(buffer),
            content_type: Self::get_mime_type(key),
            e_tag,
        })
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.get_file_path(key)?;
        Ok(path.exists())
    }
}
