use crate::constants::SHOPPING_LIST_FILENAME;
use crate::error::ApiError;
use crate::middleware::ClientCtx;
use crate::pagination::{LimitOffset, Page};
use crate::recipe::filter::{list_recipes as filter_recipes, RecipeFilter};
use crate::recipe::lists::RecipeList;
use crate::recipe::view::{load_view, load_views, RecipeView};
use crate::recipe::{self, RecipePayload};
use crate::shopping_cart;
use crate::short_link;
use crate::storage::SharedStorage;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{delete, get, post, route, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    // Fixed paths before `/recipes/{id}/`.
    conf.service(download_shopping_cart)
        .service(list_recipes)
        .service(create_recipe)
        .service(view_recipe)
        .service(update_recipe)
        .service(delete_recipe)
        .service(add_favorite)
        .service(remove_favorite)
        .service(add_to_cart)
        .service(remove_from_cart)
        .service(get_link);
}

/// Renders a freshly written recipe for its author.
async fn render_recipe(
    db: &DatabaseConnection,
    recipe: crate::orm::recipes::Model,
    viewer_id: Option<i32>,
) -> Result<RecipeView, ApiError> {
    load_view(db, recipe, viewer_id)
        .await?
        .ok_or_else(|| ApiError::Internal("recipe vanished after write".to_owned()))
}

#[get("/recipes/")]
pub async fn list_recipes(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    req: HttpRequest,
    page: web::Query<LimitOffset>,
) -> Result<HttpResponse, ApiError> {
    let (limit, offset) = page.resolve();
    let filter = RecipeFilter::from_query(req.query_string());
    let viewer_id = client.get_id();

    let (rows, count) = filter_recipes(db.get_ref(), &filter, viewer_id, limit, offset).await?;
    let results = load_views(db.get_ref(), rows, viewer_id).await?;

    Ok(HttpResponse::Ok().json(Page::new(&req, results, count, limit, offset)))
}

#[post("/recipes/")]
pub async fn create_recipe(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    storage: web::Data<SharedStorage>,
    payload: web::Json<RecipePayload>,
) -> Result<HttpResponse, ApiError> {
    let user_id = client.require_login()?;
    let recipe = recipe::create_recipe(
        db.get_ref(),
        storage.get_ref().as_ref(),
        user_id,
        payload.into_inner(),
    )
    .await?;

    let view = render_recipe(db.get_ref(), recipe, Some(user_id)).await?;
    Ok(HttpResponse::Created().json(view))
}

#[get("/recipes/{id:\\d+}/")]
pub async fn view_recipe(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let recipe = recipe::get_recipe(db.get_ref(), path.into_inner()).await?;
    let view = render_recipe(db.get_ref(), recipe, client.get_id()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[route("/recipes/{id:\\d+}/", method = "PATCH", method = "PUT")]
pub async fn update_recipe(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    storage: web::Data<SharedStorage>,
    path: web::Path<i32>,
    payload: web::Json<RecipePayload>,
) -> Result<HttpResponse, ApiError> {
    let user_id = client.require_login()?;
    let recipe = recipe::update_recipe(
        db.get_ref(),
        storage.get_ref().as_ref(),
        path.into_inner(),
        user_id,
        payload.into_inner(),
    )
    .await?;

    let view = render_recipe(db.get_ref(), recipe, Some(user_id)).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[delete("/recipes/{id:\\d+}/")]
pub async fn delete_recipe(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let user_id = client.require_login()?;
    recipe::delete_recipe(db.get_ref(), path.into_inner(), user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn add_to_list(
    list: RecipeList,
    client: &ClientCtx,
    db: &DatabaseConnection,
    recipe_id: i32,
) -> Result<HttpResponse, ApiError> {
    let user_id = client.require_login()?;
    let minified = list.add(db, user_id, recipe_id).await?;
    Ok(HttpResponse::Created().json(minified))
}

async fn remove_from_list(
    list: RecipeList,
    client: &ClientCtx,
    db: &DatabaseConnection,
    recipe_id: i32,
) -> Result<HttpResponse, ApiError> {
    let user_id = client.require_login()?;
    list.remove(db, user_id, recipe_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/recipes/{id:\\d+}/favorite/")]
pub async fn add_favorite(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    add_to_list(RecipeList::Favorites, &client, db.get_ref(), path.into_inner()).await
}

#[delete("/recipes/{id:\\d+}/favorite/")]
pub async fn remove_favorite(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    remove_from_list(RecipeList::Favorites, &client, db.get_ref(), path.into_inner()).await
}

#[post("/recipes/{id:\\d+}/shopping_cart/")]
pub async fn add_to_cart(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    add_to_list(RecipeList::ShoppingCart, &client, db.get_ref(), path.into_inner()).await
}

#[delete("/recipes/{id:\\d+}/shopping_cart/")]
pub async fn remove_from_cart(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    remove_from_list(RecipeList::ShoppingCart, &client, db.get_ref(), path.into_inner()).await
}

#[get("/recipes/download_shopping_cart/")]
pub async fn download_shopping_cart(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let user_id = client.require_login()?;
    let report = shopping_cart::export(db.get_ref(), user_id).await?;

    Ok(HttpResponse::Ok()
        .content_type(mime::TEXT_PLAIN_UTF_8)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(
                SHOPPING_LIST_FILENAME.to_owned(),
            )],
        })
        .body(report))
}

#[get("/recipes/{id:\\d+}/get-link/")]
pub async fn get_link(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let link = short_link::get_or_create(db.get_ref(), path.into_inner(), client.get_id()).await?;
    Ok(HttpResponse::Ok().json(json!({ "short-link": short_link::short_url(&link.token) })))
}
