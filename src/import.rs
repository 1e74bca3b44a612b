//! Seed data import for the ingredient and tag catalogue.

use crate::orm::{ingredients, tags};
use sea_orm::{entity::*, ConnectionTrait, DbErr};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Clone, Debug, Deserialize)]
pub struct IngredientRecord {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TagRecord {
    pub name: String,
    pub slug: String,
}

/// Inserts ingredients whose names are not present yet. Returns the number inserted.
pub async fn import_ingredients<C>(db: &C, records: Vec<IngredientRecord>) -> Result<usize, DbErr>
where
    C: ConnectionTrait,
{
    let mut seen: HashSet<String> = ingredients::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|i| i.name)
        .collect();

    let mut inserted = 0;
    for record in records {
        let name = record.name.trim().to_owned();
        if name.is_empty() || !seen.insert(name.to_owned()) {
            continue;
        }

        ingredients::ActiveModel {
            name: Set(name),
            measurement_unit: Set(record.measurement_unit.trim().to_owned()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    log::info!("imported {} ingredients", inserted);
    Ok(inserted)
}

/// Inserts tags whose names and slugs are not present yet. Returns the number inserted.
pub async fn import_tags<C>(db: &C, records: Vec<TagRecord>) -> Result<usize, DbErr>
where
    C: ConnectionTrait,
{
    let existing = tags::Entity::find().all(db).await?;
    let mut names: HashSet<String> = existing.iter().map(|t| t.name.to_owned()).collect();
    let mut slugs: HashSet<String> = existing.into_iter().map(|t| t.slug).collect();

    let mut inserted = 0;
    for record in records {
        let name = record.name.trim().to_owned();
        let slug = record.slug.trim().to_owned();
        if name.is_empty() || slug.is_empty() || names.contains(&name) || slugs.contains(&slug) {
            continue;
        }
        names.insert(name.to_owned());
        slugs.insert(slug.to_owned());

        tags::ActiveModel {
            name: Set(name),
            slug: Set(slug),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    log::info!("imported {} tags", inserted);
    Ok(inserted)
}
