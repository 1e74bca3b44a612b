//! Base64 image payloads.
//!
//! Clients send images inline as `data:image/<ext>;base64,<payload>`.
//! Decoded bytes are stored under a content hash.

use crate::app_config;
use crate::error::ApiError;
use crate::storage::StorageBackend;
use base64::{engine::general_purpose::STANDARD, Engine as _};

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// A decoded image ready to be stored.
#[derive(Debug, PartialEq)]
pub struct DecodedImage {
    pub extension: String,
    pub data: Vec<u8>,
}

/// Parses a `data:image/...;base64,` URI.
pub fn decode_data_uri(field: &str, value: &str) -> Result<DecodedImage, ApiError> {
    let invalid = || ApiError::field(field, "Upload a valid image.");

    let rest = value.strip_prefix("data:image/").ok_or_else(invalid)?;
    let (format, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;
    let extension = format.to_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::field(
            field,
            format!("Unsupported image type '{}'.", extension),
        ));
    }

    let data = STANDARD.decode(payload.trim()).map_err(|e| {
        log::debug!("image decode failed: {}", e);
        invalid()
    })?;
    if data.is_empty() {
        return Err(invalid());
    }

    let max_bytes = app_config::limits().max_image_size_mb as usize * 1024 * 1024;
    if data.len() > max_bytes {
        return Err(ApiError::field(field, "Image is too large."));
    }

    Ok(DecodedImage { extension, data })
}

/// Storage key for an image: `{prefix}/{blake3}.{ext}`.
pub fn storage_key(prefix: &str, image: &DecodedImage) -> String {
    let hash = blake3::hash(&image.data);
    format!("{}/{}.{}", prefix, hash.to_hex(), image.extension)
}

/// Decodes a data URI and writes it to storage, returning the storage key.
pub async fn save_data_uri(
    storage: &dyn StorageBackend,
    field: &str,
    prefix: &str,
    value: &str,
) -> Result<String, ApiError> {
    let image = decode_data_uri(field, value)?;
    let key = storage_key(prefix, &image);

    if !storage.exists(&key).await? {
        storage.put_object(image.data, &key).await?;
    }

    Ok(key)
}

/// Absolute URL an image is served from.
pub fn media_url(key: &str) -> String {
    let config = app_config::get_config();
    format!(
        "{}/{}/{}",
        config.site.origin(),
        config.storage.media_url.trim_matches('/'),
        key
    )
}
