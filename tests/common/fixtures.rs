//! Test fixtures for creating test data
#![allow(dead_code)]
#![allow(clippy::needless_update)]

use chrono::Utc;
use foodgram::orm::{ingredients, recipe_ingredients, recipe_tags, recipes, tags, users};
use foodgram::storage::local::LocalStorage;
use foodgram::storage::SharedStorage;
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};
use std::sync::Arc;

/// 1x1 transparent PNG as a data URI.
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Test user fixture
pub struct TestUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: String, // Plain text password for testing
}

/// Create a test user with known credentials
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<TestUser, DbErr> {
    let password_hash = foodgram::auth::hash_password(password)
        .map_err(|e| DbErr::Custom(format!("Password hashing failed: {}", e)))?;
    let email = format!("{}@test.com", username);

    let user = users::ActiveModel {
        email: Set(email.to_owned()),
        username: Set(username.to_owned()),
        first_name: Set("Test".to_owned()),
        last_name: Set("User".to_owned()),
        password: Set(password_hash),
        avatar: Set(None),
        is_staff: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(TestUser {
        id: user.id,
        username: username.to_owned(),
        email,
        password: password.to_owned(),
    })
}

/// Promote a user to staff.
pub async fn make_staff(db: &DatabaseConnection, user_id: i32) -> Result<(), DbErr> {
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("user {}", user_id)))?;
    let mut active: users::ActiveModel = user.into();
    active.is_staff = Set(true);
    active.update(db).await?;
    Ok(())
}

pub async fn create_test_ingredient(
    db: &DatabaseConnection,
    name: &str,
    unit: &str,
) -> Result<ingredients::Model, DbErr> {
    ingredients::ActiveModel {
        name: Set(name.to_owned()),
        measurement_unit: Set(unit.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_test_tag(
    db: &DatabaseConnection,
    name: &str,
    slug: &str,
) -> Result<tags::Model, DbErr> {
    tags::ActiveModel {
        name: Set(name.to_owned()),
        slug: Set(slug.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Insert a recipe with associations directly, bypassing validation.
pub async fn create_test_recipe(
    db: &DatabaseConnection,
    author_id: i32,
    name: &str,
    ingredient_amounts: &[(i32, i32)],
    tag_ids: &[i32],
) -> Result<recipes::Model, DbErr> {
    let recipe = recipes::ActiveModel {
        author_id: Set(author_id),
        name: Set(name.to_owned()),
        text: Set(format!("How to cook {}", name)),
        image: Set("recipes/images/test.png".to_owned()),
        cooking_time: Set(30),
        pub_date: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for (ingredient_id, amount) in ingredient_amounts {
        recipe_ingredients::ActiveModel {
            recipe_id: Set(recipe.id),
            ingredient_id: Set(*ingredient_id),
            amount: Set(*amount),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    for tag_id in tag_ids {
        recipe_tags::ActiveModel {
            recipe_id: Set(recipe.id),
            tag_id: Set(*tag_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(recipe)
}

/// Storage rooted in a temporary directory. Keep the guard alive for the test.
pub fn create_test_storage() -> (SharedStorage, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let storage = LocalStorage::new(dir.path().to_path_buf()).expect("Failed to create storage");
    (Arc::new(storage), dir)
}
