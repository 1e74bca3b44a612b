use crate::error::ApiError;
use crate::middleware::ClientCtx;
use crate::pagination::{LimitOffset, Page};
use crate::storage::SharedStorage;
use crate::subscriptions::{self, RecipesWindow};
use crate::user::{self, PasswordForm, Profile, RegisteredUser, RegistrationForm};
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    // Fixed paths before `/users/{id}/`.
    conf.service(view_me)
        .service(put_avatar)
        .service(delete_avatar)
        .service(set_password)
        .service(list_subscriptions)
        .service(list_users)
        .service(create_user)
        .service(view_user)
        .service(subscribe)
        .service(unsubscribe);
}

#[get("/users/")]
pub async fn list_users(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    req: HttpRequest,
    page: web::Query<LimitOffset>,
) -> Result<HttpResponse, ApiError> {
    let (limit, offset) = page.resolve();
    let (rows, count) = user::list_users(db.get_ref(), limit, offset).await?;

    let followed = match client.get_id() {
        Some(viewer_id) => subscriptions::subscribed_author_ids(db.get_ref(), viewer_id).await?,
        None => Default::default(),
    };
    let results: Vec<Profile> = rows
        .iter()
        .map(|u| Profile::from_model(u, followed.contains(&u.id)))
        .collect();

    Ok(HttpResponse::Ok().json(Page::new(&req, results, count, limit, offset)))
}

#[post("/users/")]
pub async fn create_user(
    db: web::Data<DatabaseConnection>,
    form: web::Json<RegistrationForm>,
) -> Result<HttpResponse, ApiError> {
    let user = user::register(db.get_ref(), form.into_inner()).await?;
    Ok(HttpResponse::Created().json(RegisteredUser::from(user)))
}

#[get("/users/me/")]
pub async fn view_me(client: ClientCtx) -> Result<HttpResponse, ApiError> {
    let me = client.require_user()?;
    Ok(HttpResponse::Ok().json(Profile::from_model(me, false)))
}

#[get("/users/{id:\\d+}/")]
pub async fn view_user(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let user = user::get_user(db.get_ref(), path.into_inner()).await?;
    let profile = Profile::load(db.get_ref(), &user, client.get_id()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[derive(Deserialize)]
pub struct AvatarForm {
    avatar: Option<String>,
}

#[put("/users/me/avatar/")]
pub async fn put_avatar(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    storage: web::Data<SharedStorage>,
    form: web::Json<AvatarForm>,
) -> Result<HttpResponse, ApiError> {
    let me = client.require_user()?;
    let data_uri = form
        .avatar
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::field("avatar", "This field is required."))?;

    let url = user::set_avatar(db.get_ref(), storage.get_ref().as_ref(), me, data_uri).await?;
    Ok(HttpResponse::Ok().json(json!({ "avatar": url })))
}

#[delete("/users/me/avatar/")]
pub async fn delete_avatar(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let me = client.require_user()?;
    user::clear_avatar(db.get_ref(), me).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/users/set_password/")]
pub async fn set_password(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Json<PasswordForm>,
) -> Result<HttpResponse, ApiError> {
    let me = client.require_user()?;
    user::set_password(db.get_ref(), me, form.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/users/subscriptions/")]
pub async fn list_subscriptions(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    req: HttpRequest,
    page: web::Query<LimitOffset>,
    window: web::Query<RecipesWindow>,
) -> Result<HttpResponse, ApiError> {
    let user_id = client.require_login()?;
    let (limit, offset) = page.resolve();
    let (authors, count) = subscriptions::list_authors(db.get_ref(), user_id, limit, offset).await?;

    let mut results = Vec::with_capacity(authors.len());
    for author in &authors {
        results.push(
            subscriptions::author_with_recipes(db.get_ref(), author, Some(user_id), *window)
                .await?,
        );
    }

    Ok(HttpResponse::Ok().json(Page::new(&req, results, count, limit, offset)))
}

#[post("/users/{id:\\d+}/subscribe/")]
pub async fn subscribe(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    window: web::Query<RecipesWindow>,
) -> Result<HttpResponse, ApiError> {
    let user_id = client.require_login()?;
    let author = subscriptions::subscribe(db.get_ref(), user_id, path.into_inner()).await?;
    let body = subscriptions::author_with_recipes(db.get_ref(), &author, Some(user_id), *window).await?;
    Ok(HttpResponse::Created().json(body))
}

#[delete("/users/{id:\\d+}/subscribe/")]
pub async fn unsubscribe(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let user_id = client.require_login()?;
    subscriptions::unsubscribe(db.get_ref(), user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
