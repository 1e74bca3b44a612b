//! Read-only tag and ingredient catalogue.

use crate::error::ApiError;
use crate::orm::{ingredients, tags};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TagView {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<tags::Model> for TagView {
    fn from(tag: tags::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IngredientView {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<ingredients::Model> for IngredientView {
    fn from(ingredient: ingredients::Model) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

pub async fn list_tags<C>(db: &C) -> Result<Vec<TagView>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(tags::Entity::find()
        .order_by_asc(tags::Column::Slug)
        .all(db)
        .await?
        .into_iter()
        .map(TagView::from)
        .collect())
}

pub async fn get_tag<C>(db: &C, id: i32) -> Result<TagView, ApiError>
where
    C: ConnectionTrait,
{
    tags::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(TagView::from)
        .ok_or_else(|| ApiError::not_found("Tag"))
}

/// Ingredients ordered by name, optionally restricted to a case-insensitive
/// name prefix.
///
/// The prefix is matched in Rust so that non-ASCII names fold case the same
/// way on every database backend.
pub async fn list_ingredients<C>(db: &C, prefix: Option<&str>) -> Result<Vec<IngredientView>, DbErr>
where
    C: ConnectionTrait,
{
    let prefix = prefix
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty());

    Ok(ingredients::Entity::find()
        .order_by_asc(ingredients::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .filter(|i| match &prefix {
            Some(prefix) => i.name.to_lowercase().starts_with(prefix.as_str()),
            None => true,
        })
        .map(IngredientView::from)
        .collect())
}

pub async fn get_ingredient<C>(db: &C, id: i32) -> Result<IngredientView, ApiError>
where
    C: ConnectionTrait,
{
    ingredients::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(IngredientView::from)
        .ok_or_else(|| ApiError::not_found("Ingredient"))
}
