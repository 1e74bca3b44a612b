//! Short links to recipe pages.
//!
//! Each canonical recipe URL maps to exactly one token. Requesting a link
//! for a URL that already has one returns the existing token.

use crate::app_config;
use crate::cache;
use crate::error::{is_unique_violation, ApiError};
use crate::orm::{recipes, short_links, users};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};

/// Canonical absolute URL of a recipe page.
pub fn recipe_url(recipe_id: i32) -> String {
    format!("{}/recipes/{}/", app_config::site().origin(), recipe_id)
}

/// Public URL that redirects to the token's target.
pub fn short_url(token: &str) -> String {
    format!("{}/s/{}/", app_config::site().origin(), token)
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(app_config::short_link().token_length)
        .map(char::from)
        .collect()
}

async fn find_by_url<C>(db: &C, url: &str) -> Result<Option<short_links::Model>, DbErr>
where
    C: ConnectionTrait,
{
    short_links::Entity::find()
        .filter(short_links::Column::Url.eq(url))
        .one(db)
        .await
}

/// Owner recorded for links minted by anonymous clients.
async fn fallback_owner<C>(db: &C) -> Result<Option<i32>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(users::Entity::find()
        .filter(users::Column::IsStaff.eq(true))
        .order_by_asc(users::Column::Id)
        .one(db)
        .await?
        .map(|u| u.id))
}

/// Returns the link for a recipe, minting one on first request.
pub async fn get_or_create<C>(
    db: &C,
    recipe_id: i32,
    requester_id: Option<i32>,
) -> Result<short_links::Model, ApiError>
where
    C: ConnectionTrait,
{
    if recipes::Entity::find_by_id(recipe_id).one(db).await?.is_none() {
        return Err(ApiError::not_found("Recipe"));
    }

    let url = recipe_url(recipe_id);
    if let Some(existing) = find_by_url(db, &url).await? {
        return Ok(existing);
    }

    let owner = match requester_id {
        Some(id) => Some(id),
        None => fallback_owner(db).await?,
    };

    let link = short_links::ActiveModel {
        token: Set(generate_token()),
        url: Set(url.to_owned()),
        user_id: Set(owner),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    match link.insert(db).await {
        Ok(link) => {
            log::info!("short link {} created for {}", link.token, link.url);
            cache::put_short_link(&link.token, &link.url);
            Ok(link)
        }
        // Another request minted the link for this URL first.
        Err(e) if is_unique_violation(&e) => match find_by_url(db, &url).await? {
            Some(existing) => Ok(existing),
            None => Err(e.into()),
        },
        Err(e) => Err(e.into()),
    }
}

/// Looks up the target URL of a token.
pub async fn resolve<C>(db: &C, token: &str) -> Result<Option<String>, DbErr>
where
    C: ConnectionTrait,
{
    if let Some(url) = cache::get_short_link(token) {
        return Ok(Some(url));
    }

    let link = short_links::Entity::find()
        .filter(short_links::Column::Token.eq(token))
        .one(db)
        .await?;

    Ok(link.map(|link| {
        cache::put_short_link(&link.token, &link.url);
        link.url
    }))
}
