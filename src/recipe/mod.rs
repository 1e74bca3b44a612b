//! Recipe write path.
//!
//! A recipe and its ingredient/tag associations are written in one
//! transaction. Updates delete every association and recreate them from the
//! payload, so the stored set always equals the last accepted payload.

pub mod filter;
pub mod lists;
pub mod view;

use crate::constants::{MAX_RECIPE_NAME_LENGTH, MIN_INGREDIENT_AMOUNT, RECIPE_IMAGE_PREFIX};
use crate::error::{is_unique_violation, ApiError};
use crate::image::save_data_uri;
use crate::orm::{favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_carts, tags};
use crate::storage::StorageBackend;
use chrono::Utc;
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i32,
}

fn validate_amounts(items: &[IngredientAmount]) -> Result<(), ValidationError> {
    if items.iter().any(|i| i.amount < MIN_INGREDIENT_AMOUNT) {
        let mut err = ValidationError::new("amount");
        err.message = Some(Cow::from(format!(
            "Amount must be at least {}.",
            MIN_INGREDIENT_AMOUNT
        )));
        return Err(err);
    }
    Ok(())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::from("This field may not be blank."));
        return Err(err);
    }
    Ok(())
}

/// Body of recipe create and update requests.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct RecipePayload {
    #[validate(
        length(min = 1, max = "MAX_RECIPE_NAME_LENGTH"),
        custom = "validate_not_blank"
    )]
    pub name: String,
    #[validate(length(min = 1), custom = "validate_not_blank")]
    pub text: String,
    #[validate(range(min = 1, max = 1440))]
    pub cooking_time: i32,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "At least one ingredient is required."),
        custom = "validate_amounts"
    )]
    pub ingredients: Vec<IngredientAmount>,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one tag is required."))]
    pub tags: Vec<i32>,
    /// Base64 data URI. Required on create, optional on update.
    pub image: Option<String>,
}

impl RecipePayload {
    fn image(&self) -> Option<&str> {
        self.image.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Replaces every ingredient and tag association of a recipe.
///
/// Unknown ids and duplicate ids become validation errors. Meant to run
/// inside the caller's transaction.
pub async fn replace_associations<C>(
    db: &C,
    recipe_id: i32,
    ingredient_amounts: &[IngredientAmount],
    tag_ids: &[i32],
) -> Result<(), ApiError>
where
    C: ConnectionTrait,
{
    recipe_ingredients::Entity::delete_many()
        .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    recipe_tags::Entity::delete_many()
        .filter(recipe_tags::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;

    for item in ingredient_amounts {
        if ingredients::Entity::find_by_id(item.id).one(db).await?.is_none() {
            return Err(ApiError::field(
                "ingredients",
                format!("Ingredient with id {} does not exist.", item.id),
            ));
        }

        recipe_ingredients::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(item.id),
            amount: Set(item.amount),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| used_twice(e, "ingredients", "Ingredient", item.id))?;
    }

    for tag_id in tag_ids {
        if tags::Entity::find_by_id(*tag_id).one(db).await?.is_none() {
            return Err(ApiError::field(
                "tags",
                format!("Tag with id {} does not exist.", tag_id),
            ));
        }

        recipe_tags::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(*tag_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| used_twice(e, "tags", "Tag", *tag_id))?;
    }

    Ok(())
}

fn used_twice(err: DbErr, field: &str, what: &str, id: i32) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::field(field, format!("{} with id {} is used twice.", what, id))
    } else {
        err.into()
    }
}

pub async fn get_recipe<C>(db: &C, recipe_id: i32) -> Result<recipes::Model, ApiError>
where
    C: ConnectionTrait,
{
    recipes::Entity::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe"))
}

/// Loads a recipe that `editor_id` is allowed to modify.
async fn get_owned_recipe<C>(db: &C, recipe_id: i32, editor_id: i32) -> Result<recipes::Model, ApiError>
where
    C: ConnectionTrait,
{
    let recipe = get_recipe(db, recipe_id).await?;
    if recipe.author_id != editor_id {
        return Err(ApiError::forbidden());
    }
    Ok(recipe)
}

pub async fn create_recipe(
    db: &DatabaseConnection,
    storage: &dyn StorageBackend,
    author_id: i32,
    payload: RecipePayload,
) -> Result<recipes::Model, ApiError> {
    payload.validate()?;
    let image = payload
        .image()
        .ok_or_else(|| ApiError::field("image", "This field is required."))?;
    let image = save_data_uri(storage, "image", RECIPE_IMAGE_PREFIX, image).await?;

    let txn = db.begin().await?;
    let result = async {
        let recipe = recipes::ActiveModel {
            author_id: Set(author_id),
            name: Set(payload.name.trim().to_owned()),
            text: Set(payload.text.to_owned()),
            image: Set(image),
            cooking_time: Set(payload.cooking_time),
            pub_date: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        replace_associations(&txn, recipe.id, &payload.ingredients, &payload.tags).await?;
        Ok::<_, ApiError>(recipe)
    }
    .await;

    match result {
        Ok(recipe) => {
            txn.commit().await?;
            log::info!("recipe {} created by user_id={}", recipe.id, author_id);
            Ok(recipe)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}

/// Overwrites a recipe and fully replaces its associations.
pub async fn update_recipe(
    db: &DatabaseConnection,
    storage: &dyn StorageBackend,
    recipe_id: i32,
    editor_id: i32,
    payload: RecipePayload,
) -> Result<recipes::Model, ApiError> {
    let recipe = get_owned_recipe(db, recipe_id, editor_id).await?;
    payload.validate()?;

    let image = match payload.image() {
        Some(data_uri) => Some(save_data_uri(storage, "image", RECIPE_IMAGE_PREFIX, data_uri).await?),
        None => None,
    };

    let txn = db.begin().await?;
    let result = async {
        let mut active: recipes::ActiveModel = recipe.into();
        active.name = Set(payload.name.trim().to_owned());
        active.text = Set(payload.text.to_owned());
        active.cooking_time = Set(payload.cooking_time);
        if let Some(image) = image {
            active.image = Set(image);
        }
        let recipe = active.update(&txn).await?;

        replace_associations(&txn, recipe.id, &payload.ingredients, &payload.tags).await?;
        Ok::<_, ApiError>(recipe)
    }
    .await;

    match result {
        Ok(recipe) => {
            txn.commit().await?;
            log::info!("recipe {} updated by user_id={}", recipe.id, editor_id);
            Ok(recipe)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}

/// Deletes a recipe with its associations and list entries.
pub async fn delete_recipe(
    db: &DatabaseConnection,
    recipe_id: i32,
    editor_id: i32,
) -> Result<(), ApiError> {
    let recipe = get_owned_recipe(db, recipe_id, editor_id).await?;

    let txn = db.begin().await?;
    recipe_ingredients::Entity::delete_many()
        .filter(recipe_ingredients::Column::RecipeId.eq(recipe.id))
        .exec(&txn)
        .await?;
    recipe_tags::Entity::delete_many()
        .filter(recipe_tags::Column::RecipeId.eq(recipe.id))
        .exec(&txn)
        .await?;
    favorites::Entity::delete_many()
        .filter(favorites::Column::RecipeId.eq(recipe.id))
        .exec(&txn)
        .await?;
    shopping_carts::Entity::delete_many()
        .filter(shopping_carts::Column::RecipeId.eq(recipe.id))
        .exec(&txn)
        .await?;
    recipes::Entity::delete_by_id(recipe.id).exec(&txn).await?;
    txn.commit().await?;

    log::info!("recipe {} deleted by user_id={}", recipe_id, editor_id);
    Ok(())
}
