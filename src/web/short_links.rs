use crate::error::ApiError;
use crate::short_link;
use actix_web::http::header;
use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(follow_short_link);
}

#[get("/s/{token}/")]
pub async fn follow_short_link(
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let url = short_link::resolve(db.get_ref(), &path)
        .await?
        .ok_or_else(|| ApiError::not_found("Short link"))?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, url))
        .finish())
}
