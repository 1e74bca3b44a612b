use crate::catalog;
use crate::error::ApiError;
use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(list_tags).service(view_tag);
}

#[get("/tags/")]
pub async fn list_tags(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(catalog::list_tags(db.get_ref()).await?))
}

#[get("/tags/{id}/")]
pub async fn view_tag(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(catalog::get_tag(db.get_ref(), path.into_inner()).await?))
}
