//! User to author subscriptions.

use crate::app_config;
use crate::error::{is_unique_violation, ApiError};
use crate::orm::{recipes, subscriptions, users};
use crate::pagination::MAX_OFFSET;
use crate::recipe::view::RecipeMinified;
use crate::user::Profile;
use chrono::Utc;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub async fn is_subscribed<C>(db: &C, user_id: i32, author_id: i32) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    Ok(subscriptions::Entity::find()
        .filter(subscriptions::Column::UserId.eq(user_id))
        .filter(subscriptions::Column::AuthorId.eq(author_id))
        .one(db)
        .await?
        .is_some())
}

/// Ids of every author the user follows.
pub async fn subscribed_author_ids<C>(db: &C, user_id: i32) -> Result<HashSet<i32>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(subscriptions::Entity::find()
        .filter(subscriptions::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.author_id)
        .collect())
}

/// Follows an author and returns the author's record.
pub async fn subscribe<C>(db: &C, user_id: i32, author_id: i32) -> Result<users::Model, ApiError>
where
    C: ConnectionTrait,
{
    let author = users::Entity::find_by_id(author_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    if author.id == user_id {
        return Err(ApiError::non_field("You cannot subscribe to yourself."));
    }

    let already = || ApiError::non_field("You are already subscribed to this user.");
    if is_subscribed(db, user_id, author_id).await? {
        return Err(already());
    }

    let row = subscriptions::ActiveModel {
        user_id: Set(user_id),
        author_id: Set(author_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    match row.insert(db).await {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => return Err(already()),
        Err(e) => return Err(e.into()),
    }

    log::info!("user_id={} subscribed to user_id={}", user_id, author_id);
    Ok(author)
}

pub async fn unsubscribe<C>(db: &C, user_id: i32, author_id: i32) -> Result<(), ApiError>
where
    C: ConnectionTrait,
{
    if users::Entity::find_by_id(author_id).one(db).await?.is_none() {
        return Err(ApiError::not_found("User"));
    }

    let deleted = subscriptions::Entity::delete_many()
        .filter(subscriptions::Column::UserId.eq(user_id))
        .filter(subscriptions::Column::AuthorId.eq(author_id))
        .exec(db)
        .await?
        .rows_affected;

    if deleted == 0 {
        return Err(ApiError::non_field("You are not subscribed to this user."));
    }

    log::info!("user_id={} unsubscribed from user_id={}", user_id, author_id);
    Ok(())
}

/// One page of the authors a user follows, oldest subscription first.
pub async fn list_authors<C>(
    db: &C,
    user_id: i32,
    limit: u64,
    offset: u64,
) -> Result<(Vec<users::Model>, u64), DbErr>
where
    C: ConnectionTrait,
{
    let select = subscriptions::Entity::find().filter(subscriptions::Column::UserId.eq(user_id));
    let count = select.clone().count(db).await? as u64;

    let authors = select
        .order_by_asc(subscriptions::Column::Id)
        .offset(offset)
        .limit(limit)
        .find_also_related(users::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, author)| author)
        .collect();

    Ok((authors, count))
}

/// `?recipes_limit=&recipe_offset=` window over an author's recipes.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct RecipesWindow {
    #[serde(alias = "recipe_limit")]
    pub recipes_limit: Option<u64>,
    pub recipe_offset: Option<u64>,
}

impl RecipesWindow {
    pub fn resolve(&self) -> (u64, u64) {
        let limits = app_config::limits();
        let limit = self
            .recipes_limit
            .unwrap_or(limits.recipes_per_author)
            .min(limits.max_page_size);
        (limit, self.recipe_offset.unwrap_or(0).min(MAX_OFFSET))
    }
}

/// A followed author with a window of their recipes.
#[derive(Clone, Debug, Serialize)]
pub struct AuthorWithRecipes {
    #[serde(flatten)]
    pub profile: Profile,
    pub recipes: Vec<RecipeMinified>,
    pub recipes_count: u64,
}

pub async fn author_with_recipes<C>(
    db: &C,
    author: &users::Model,
    viewer_id: Option<i32>,
    window: RecipesWindow,
) -> Result<AuthorWithRecipes, DbErr>
where
    C: ConnectionTrait,
{
    let (limit, offset) = window.resolve();
    let select = recipes::Entity::find().filter(recipes::Column::AuthorId.eq(author.id));
    let recipes_count = select.clone().count(db).await? as u64;
    let recipes = select
        .order_by_desc(recipes::Column::PubDate)
        .order_by_desc(recipes::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?
        .iter()
        .map(RecipeMinified::from)
        .collect();

    Ok(AuthorWithRecipes {
        profile: Profile::load(db, author, viewer_id).await?,
        recipes,
        recipes_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_defaults_and_cap() {
        assert_eq!(RecipesWindow::default().resolve(), (2, 0));
        let window = RecipesWindow {
            recipes_limit: Some(500),
            recipe_offset: Some(4),
        };
        assert_eq!(window.resolve(), (100, 4));

        let window = RecipesWindow {
            recipes_limit: None,
            recipe_offset: Some(u64::MAX),
        };
        assert_eq!(window.resolve(), (2, MAX_OFFSET));
    }

    #[test]
    fn test_window_accepts_both_spellings() {
        let window: RecipesWindow = serde_json::from_str(r#"{"recipe_limit": 3}"#).unwrap();
        assert_eq!(window.recipes_limit, Some(3));
    }
}
