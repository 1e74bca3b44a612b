//! Per-user recipe lists: favorites and the shopping cart.

use super::view::RecipeMinified;
use crate::error::{is_unique_violation, ApiError};
use crate::orm::{favorites, recipes, shopping_carts};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

impl RecipeList {
    fn label(self) -> &'static str {
        match self {
            RecipeList::Favorites => "favorites",
            RecipeList::ShoppingCart => "shopping cart",
        }
    }

    /// Recipe ids on the user's list.
    pub async fn recipe_ids<C>(self, db: &C, user_id: i32) -> Result<HashSet<i32>, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(match self {
            RecipeList::Favorites => favorites::Entity::find()
                .filter(favorites::Column::UserId.eq(user_id))
                .all(db)
                .await?
                .into_iter()
                .map(|row| row.recipe_id)
                .collect(),
            RecipeList::ShoppingCart => shopping_carts::Entity::find()
                .filter(shopping_carts::Column::UserId.eq(user_id))
                .all(db)
                .await?
                .into_iter()
                .map(|row| row.recipe_id)
                .collect(),
        })
    }

    pub async fn contains<C>(self, db: &C, user_id: i32, recipe_id: i32) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let found = match self {
            RecipeList::Favorites => favorites::Entity::find()
                .filter(favorites::Column::UserId.eq(user_id))
                .filter(favorites::Column::RecipeId.eq(recipe_id))
                .one(db)
                .await?
                .is_some(),
            RecipeList::ShoppingCart => shopping_carts::Entity::find()
                .filter(shopping_carts::Column::UserId.eq(user_id))
                .filter(shopping_carts::Column::RecipeId.eq(recipe_id))
                .one(db)
                .await?
                .is_some(),
        };
        Ok(found)
    }

    /// Puts a recipe on the list and returns its short representation.
    pub async fn add<C>(self, db: &C, user_id: i32, recipe_id: i32) -> Result<RecipeMinified, ApiError>
    where
        C: ConnectionTrait,
    {
        let recipe = recipes::Entity::find_by_id(recipe_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Recipe"))?;

        let already = || ApiError::non_field(format!("Recipe is already in {}.", self.label()));

        if self.contains(db, user_id, recipe_id).await? {
            return Err(already());
        }

        let inserted = match self {
            RecipeList::Favorites => favorites::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
                ..Default::default()
            }
            .insert(db)
            .await
            .map(|_| ()),
            RecipeList::ShoppingCart => shopping_carts::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
                ..Default::default()
            }
            .insert(db)
            .await
            .map(|_| ()),
        };

        match inserted {
            Ok(()) => {}
            Err(e) if is_unique_violation(&e) => return Err(already()),
            Err(e) => return Err(e.into()),
        }

        log::debug!(
            "user_id={} added recipe {} to {}",
            user_id,
            recipe_id,
            self.label()
        );
        Ok(RecipeMinified::from(&recipe))
    }

    pub async fn remove<C>(self, db: &C, user_id: i32, recipe_id: i32) -> Result<(), ApiError>
    where
        C: ConnectionTrait,
    {
        if recipes::Entity::find_by_id(recipe_id).one(db).await?.is_none() {
            return Err(ApiError::not_found("Recipe"));
        }

        let deleted = match self {
            RecipeList::Favorites => {
                favorites::Entity::delete_many()
                    .filter(favorites::Column::UserId.eq(user_id))
                    .filter(favorites::Column::RecipeId.eq(recipe_id))
                    .exec(db)
                    .await?
                    .rows_affected
            }
            RecipeList::ShoppingCart => {
                shopping_carts::Entity::delete_many()
                    .filter(shopping_carts::Column::UserId.eq(user_id))
                    .filter(shopping_carts::Column::RecipeId.eq(recipe_id))
                    .exec(db)
                    .await?
                    .rows_affected
            }
        };

        if deleted == 0 {
            return Err(ApiError::non_field(format!(
                "Recipe is not in {}.",
                self.label()
            )));
        }
        Ok(())
    }
}
