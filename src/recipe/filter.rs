//! Recipe list filtering.

use super::lists::RecipeList;
use crate::orm::{recipe_tags, recipes, tags};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use std::collections::HashSet;

/// Query-string filters for the recipe list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecipeFilter {
    pub author: Option<i32>,
    /// Tag slugs; a recipe matches when it has any of them.
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

fn truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true")
}

impl RecipeFilter {
    /// Parses a raw query string. `tags` may repeat; unknown keys are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut filter = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "author" => filter.author = value.trim().parse().ok(),
                "tags" => {
                    let slug = value.trim();
                    if !slug.is_empty() {
                        filter.tags.push(slug.to_owned());
                    }
                }
                "is_favorited" => filter.is_favorited = truthy(&value),
                "is_in_shopping_cart" => filter.is_in_shopping_cart = truthy(&value),
                _ => {}
            }
        }
        filter
    }
}

async fn tagged_recipe_ids<C>(db: &C, slugs: &[String]) -> Result<HashSet<i32>, DbErr>
where
    C: ConnectionTrait,
{
    let tag_ids: Vec<i32> = tags::Entity::find()
        .filter(tags::Column::Slug.is_in(slugs.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    if tag_ids.is_empty() {
        return Ok(HashSet::new());
    }

    Ok(recipe_tags::Entity::find()
        .filter(recipe_tags::Column::TagId.is_in(tag_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.recipe_id)
        .collect())
}

fn restrict(current: Option<HashSet<i32>>, ids: HashSet<i32>) -> Option<HashSet<i32>> {
    Some(match current {
        Some(current) => current.intersection(&ids).copied().collect(),
        None => ids,
    })
}

/// Returns one page of recipes, newest first, and the total match count.
///
/// The favorites and cart filters only apply to authenticated viewers.
pub async fn list_recipes<C>(
    db: &C,
    filter: &RecipeFilter,
    viewer_id: Option<i32>,
    limit: u64,
    offset: u64,
) -> Result<(Vec<recipes::Model>, u64), DbErr>
where
    C: ConnectionTrait,
{
    let mut allowed: Option<HashSet<i32>> = None;

    if !filter.tags.is_empty() {
        allowed = restrict(allowed, tagged_recipe_ids(db, &filter.tags).await?);
    }
    if let Some(viewer_id) = viewer_id {
        if filter.is_favorited {
            allowed = restrict(allowed, RecipeList::Favorites.recipe_ids(db, viewer_id).await?);
        }
        if filter.is_in_shopping_cart {
            allowed = restrict(
                allowed,
                RecipeList::ShoppingCart.recipe_ids(db, viewer_id).await?,
            );
        }
    }

    let mut select = recipes::Entity::find();
    if let Some(author) = filter.author {
        select = select.filter(recipes::Column::AuthorId.eq(author));
    }
    if let Some(ids) = allowed {
        if ids.is_empty() {
            return Ok((Vec::new(), 0));
        }
        select = select.filter(recipes::Column::Id.is_in(ids));
    }

    let count = select.clone().count(db).await? as u64;
    let rows = select
        .order_by_desc(recipes::Column::PubDate)
        .order_by_desc(recipes::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok((rows, count))
}
