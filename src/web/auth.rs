use crate::auth::{check_credentials, issue_token, revoke_token};
use crate::error::ApiError;
use crate::middleware::ClientCtx;
use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(login).service(logout);
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

#[post("/auth/token/login/")]
pub async fn login(
    db: web::Data<DatabaseConnection>,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, ApiError> {
    let user = check_credentials(db.get_ref(), &form.email, &form.password)
        .await?
        .ok_or_else(|| ApiError::non_field("Unable to log in with provided credentials."))?;

    let token = issue_token(db.get_ref(), user.id).await?;
    log::info!("user_id={} logged in", user.id);
    Ok(HttpResponse::Ok().json(json!({ "auth_token": token })))
}

#[post("/auth/token/logout/")]
pub async fn logout(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let user_id = client.require_login()?;
    revoke_token(db.get_ref(), user_id).await?;
    log::info!("user_id={} logged out", user_id);
    Ok(HttpResponse::NoContent().finish())
}
