use crate::app_config;
use crate::error::ApiError;
use crate::storage::{SharedStorage, StorageError};
use actix_web::http::header;
use actix_web::{web, HttpResponse};

/// Mounted under the configured `storage.media_url`.
pub(super) fn configure(conf: &mut web::ServiceConfig) {
    let prefix = app_config::storage().media_url;
    conf.service(
        web::resource(format!("/{}/{{key:.*}}", prefix.trim_matches('/')))
            .route(web::get().to(view_media)),
    );
}

pub async fn view_media(
    storage: web::Data<SharedStorage>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let object = match storage.get_object(&path).await {
        Ok(object) => object,
        Err(StorageError::NotFound(_)) | Err(StorageError::InvalidKey(_)) => {
            return Err(ApiError::not_found("File"))
        }
        Err(e) => return Err(e.into()),
    };

    let mut response = HttpResponse::Ok();
    if let Some(content_type) = object.content_type {
        response.insert_header((header::CONTENT_TYPE, content_type));
    }
    if let Some(e_tag) = object.e_tag {
        response.insert_header((header::ETAG, e_tag));
    }
    response.insert_header((header::CACHE_CONTROL, "public, max-age=31536000, immutable"));

    Ok(response.body(object.body))
}
