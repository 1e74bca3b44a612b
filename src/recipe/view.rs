//! JSON representations of recipes.

use super::lists::RecipeList;
use crate::catalog::TagView;
use crate::image::media_url;
use crate::orm::{ingredients, recipe_ingredients, recipe_tags, recipes, tags, users};
use crate::subscriptions;
use crate::user::Profile;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// `{id, name, image, cooking_time}`, used inside other payloads.
#[derive(Clone, Debug, Serialize)]
pub struct RecipeMinified {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<&recipes::Model> for RecipeMinified {
    fn from(recipe: &recipes::Model) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.to_owned(),
            image: media_url(&recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RecipeIngredientView {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct RecipeView {
    pub id: i32,
    pub tags: Vec<TagView>,
    pub author: Profile,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Builds full representations for a batch of recipes, preserving order.
///
/// Associations, authors and viewer flags are fetched once per batch.
pub async fn load_views<C>(
    db: &C,
    recipes: Vec<recipes::Model>,
    viewer_id: Option<i32>,
) -> Result<Vec<RecipeView>, DbErr>
where
    C: ConnectionTrait,
{
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<i32> = recipes.iter().map(|r| r.author_id).collect();

    let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredientView>> = HashMap::new();
    for (row, ingredient) in recipe_ingredients::Entity::find()
        .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids.clone()))
        .order_by_asc(recipe_ingredients::Column::Id)
        .find_also_related(ingredients::Entity)
        .all(db)
        .await?
    {
        if let Some(ingredient) = ingredient {
            ingredients_by_recipe
                .entry(row.recipe_id)
                .or_default()
                .push(RecipeIngredientView {
                    id: ingredient.id,
                    name: ingredient.name,
                    measurement_unit: ingredient.measurement_unit,
                    amount: row.amount,
                });
        }
    }

    let mut tags_by_recipe: HashMap<i32, Vec<TagView>> = HashMap::new();
    for (row, tag) in recipe_tags::Entity::find()
        .filter(recipe_tags::Column::RecipeId.is_in(recipe_ids.clone()))
        .order_by_asc(recipe_tags::Column::Id)
        .find_also_related(tags::Entity)
        .all(db)
        .await?
    {
        if let Some(tag) = tag {
            tags_by_recipe
                .entry(row.recipe_id)
                .or_default()
                .push(TagView::from(tag));
        }
    }

    let authors: HashMap<i32, users::Model> = users::Entity::find()
        .filter(users::Column::Id.is_in(author_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let (favorited, in_cart, followed) = match viewer_id {
        Some(viewer_id) => (
            RecipeList::Favorites.recipe_ids(db, viewer_id).await?,
            RecipeList::ShoppingCart.recipe_ids(db, viewer_id).await?,
            subscriptions::subscribed_author_ids(db, viewer_id).await?,
        ),
        None => (HashSet::new(), HashSet::new(), HashSet::new()),
    };

    let mut views = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        let author = match authors.get(&recipe.author_id) {
            Some(author) => Profile::from_model(author, followed.contains(&author.id)),
            None => {
                log::error!(
                    "recipe {} references missing author {}",
                    recipe.id,
                    recipe.author_id
                );
                continue;
            }
        };

        views.push(RecipeView {
            id: recipe.id,
            tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
            author,
            ingredients: ingredients_by_recipe.remove(&recipe.id).unwrap_or_default(),
            is_favorited: favorited.contains(&recipe.id),
            is_in_shopping_cart: in_cart.contains(&recipe.id),
            image: media_url(&recipe.image),
            name: recipe.name,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        });
    }

    Ok(views)
}

/// Full representation of one recipe.
pub async fn load_view<C>(
    db: &C,
    recipe: recipes::Model,
    viewer_id: Option<i32>,
) -> Result<Option<RecipeView>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(load_views(db, vec![recipe], viewer_id).await?.pop())
}
