use crate::catalog;
use crate::error::ApiError;
use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(list_ingredients).service(view_ingredient);
}

#[derive(Deserialize)]
pub struct IngredientQuery {
    name: Option<String>,
}

#[get("/ingredients/")]
pub async fn list_ingredients(
    db: web::Data<DatabaseConnection>,
    query: web::Query<IngredientQuery>,
) -> Result<HttpResponse, ApiError> {
    let ingredients = catalog::list_ingredients(db.get_ref(), query.name.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ingredients))
}

#[get("/ingredients/{id}/")]
pub async fn view_ingredient(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(catalog::get_ingredient(db.get_ref(), path.into_inner()).await?))
}
