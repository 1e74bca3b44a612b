//! Database connection and schema bootstrap.
//!
//! The schema is built from sea-query statements so the same definitions run
//! on Postgres in production and on in-memory SQLite in tests.

use crate::constants::{
    AUTH_TOKEN_LENGTH, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, MAX_RECIPE_NAME_LENGTH, MAX_SLUG_LENGTH,
};
use crate::orm::{
    auth_tokens, favorites, ingredients, recipe_ingredients, recipe_tags, recipes,
    shopping_carts, short_links, subscriptions, tags, users,
};
use sea_orm::sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, ForeignKeyCreateStatement, Iden, Index, Table,
    TableCreateStatement,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// Opens a connection pool.
///
/// In-memory SQLite databases live inside a single connection, so the pool is
/// pinned to one connection for them.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    if database_url.starts_with("sqlite") && database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    log::info!("Connected to database ({:?})", db.get_database_backend());
    Ok(db)
}

/// Creates every table that does not exist yet.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    for statement in schema_statements() {
        db.execute(backend.build(&statement)).await?;
    }
    Ok(())
}

fn id_column<C: Iden + 'static>(col: C) -> ColumnDef {
    let mut def = ColumnDef::new(col);
    def.integer().not_null().auto_increment().primary_key();
    def
}

/// Foreign key that removes the row together with its parent.
fn cascade_to<T, C, P, K>(name: &str, from: (T, C), parent: P, key: K) -> ForeignKeyCreateStatement
where
    T: Iden + 'static,
    C: Iden + 'static,
    P: Iden + 'static,
    K: Iden + 'static,
{
    let mut fk = ForeignKey::create();
    fk.name(name)
        .from(from.0, from.1)
        .to(parent, key)
        .on_delete(ForeignKeyAction::Cascade)
        .on_update(ForeignKeyAction::NoAction);
    fk
}

/// Table definitions in dependency order.
pub fn schema_statements() -> Vec<TableCreateStatement> {
    vec![
        Table::create()
            .table(users::Entity)
            .if_not_exists()
            .col(&mut id_column(users::Column::Id))
            .col(
                ColumnDef::new(users::Column::Email)
                    .string_len(MAX_EMAIL_LENGTH as u32)
                    .not_null()
                    .unique_key(),
            )
            .col(
                ColumnDef::new(users::Column::Username)
                    .string_len(MAX_NAME_LENGTH as u32)
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(users::Column::FirstName).string_len(MAX_NAME_LENGTH as u32).not_null())
            .col(ColumnDef::new(users::Column::LastName).string_len(MAX_NAME_LENGTH as u32).not_null())
            .col(ColumnDef::new(users::Column::Password).text().not_null())
            .col(ColumnDef::new(users::Column::Avatar).string())
            .col(
                ColumnDef::new(users::Column::IsStaff)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(ColumnDef::new(users::Column::CreatedAt).date_time().not_null())
            .to_owned(),
        Table::create()
            .table(auth_tokens::Entity)
            .if_not_exists()
            .col(
                ColumnDef::new(auth_tokens::Column::Key)
                    .string_len(AUTH_TOKEN_LENGTH as u32)
                    .not_null()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(auth_tokens::Column::UserId)
                    .integer()
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(auth_tokens::Column::CreatedAt).date_time().not_null())
            .foreign_key(&mut cascade_to(
                "fk_auth_tokens_user",
                (auth_tokens::Entity, auth_tokens::Column::UserId),
                users::Entity,
                users::Column::Id,
            ))
            .to_owned(),
        Table::create()
            .table(ingredients::Entity)
            .if_not_exists()
            .col(&mut id_column(ingredients::Column::Id))
            .col(
                ColumnDef::new(ingredients::Column::Name)
                    .string_len(MAX_NAME_LENGTH as u32)
                    .not_null()
                    .unique_key(),
            )
            .col(
                ColumnDef::new(ingredients::Column::MeasurementUnit)
                    .string_len(MAX_SLUG_LENGTH as u32)
                    .not_null(),
            )
            .to_owned(),
        Table::create()
            .table(tags::Entity)
            .if_not_exists()
            .col(&mut id_column(tags::Column::Id))
            .col(
                ColumnDef::new(tags::Column::Name)
                    .string_len(MAX_NAME_LENGTH as u32)
                    .not_null()
                    .unique_key(),
            )
            .col(
                ColumnDef::new(tags::Column::Slug)
                    .string_len(MAX_SLUG_LENGTH as u32)
                    .not_null()
                    .unique_key(),
            )
            .to_owned(),
        Table::create()
            .table(recipes::Entity)
            .if_not_exists()
            .col(&mut id_column(recipes::Column::Id))
            .col(ColumnDef::new(recipes::Column::AuthorId).integer().not_null())
            .col(ColumnDef::new(recipes::Column::Name).string_len(MAX_RECIPE_NAME_LENGTH as u32).not_null())
            .col(ColumnDef::new(recipes::Column::Text).text().not_null())
            .col(ColumnDef::new(recipes::Column::Image).string().not_null())
            .col(ColumnDef::new(recipes::Column::CookingTime).integer().not_null())
            .col(ColumnDef::new(recipes::Column::PubDate).date_time().not_null())
            .foreign_key(&mut cascade_to(
                "fk_recipes_author",
                (recipes::Entity, recipes::Column::AuthorId),
                users::Entity,
                users::Column::Id,
            ))
            .to_owned(),
        Table::create()
            .table(recipe_ingredients::Entity)
            .if_not_exists()
            .col(&mut id_column(recipe_ingredients::Column::Id))
            .col(
                ColumnDef::new(recipe_ingredients::Column::RecipeId)
                    .integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(recipe_ingredients::Column::IngredientId)
                    .integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(recipe_ingredients::Column::Amount)
                    .integer()
                    .not_null(),
            )
            .index(
                Index::create()
                    .unique()
                    .name("recipe_ingr_unique")
                    .col(recipe_ingredients::Column::RecipeId)
                    .col(recipe_ingredients::Column::IngredientId),
            )
            .foreign_key(&mut cascade_to(
                "fk_recipe_ingredients_recipe",
                (recipe_ingredients::Entity, recipe_ingredients::Column::RecipeId),
                recipes::Entity,
                recipes::Column::Id,
            ))
            .foreign_key(&mut cascade_to(
                "fk_recipe_ingredients_ingredient",
                (
                    recipe_ingredients::Entity,
                    recipe_ingredients::Column::IngredientId,
                ),
                ingredients::Entity,
                ingredients::Column::Id,
            ))
            .to_owned(),
        Table::create()
            .table(recipe_tags::Entity)
            .if_not_exists()
            .col(&mut id_column(recipe_tags::Column::Id))
            .col(ColumnDef::new(recipe_tags::Column::RecipeId).integer().not_null())
            .col(ColumnDef::new(recipe_tags::Column::TagId).integer().not_null())
            .index(
                Index::create()
                    .unique()
                    .name("recipe_tag_unique")
                    .col(recipe_tags::Column::RecipeId)
                    .col(recipe_tags::Column::TagId),
            )
            .foreign_key(&mut cascade_to(
                "fk_recipe_tags_recipe",
                (recipe_tags::Entity, recipe_tags::Column::RecipeId),
                recipes::Entity,
                recipes::Column::Id,
            ))
            .foreign_key(&mut cascade_to(
                "fk_recipe_tags_tag",
                (recipe_tags::Entity, recipe_tags::Column::TagId),
                tags::Entity,
                tags::Column::Id,
            ))
            .to_owned(),
        Table::create()
            .table(favorites::Entity)
            .if_not_exists()
            .col(&mut id_column(favorites::Column::Id))
            .col(ColumnDef::new(favorites::Column::UserId).integer().not_null())
            .col(ColumnDef::new(favorites::Column::RecipeId).integer().not_null())
            .index(
                Index::create()
                    .unique()
                    .name("unique_user_favorite")
                    .col(favorites::Column::UserId)
                    .col(favorites::Column::RecipeId),
            )
            .foreign_key(&mut cascade_to(
                "fk_favorites_user",
                (favorites::Entity, favorites::Column::UserId),
                users::Entity,
                users::Column::Id,
            ))
            .foreign_key(&mut cascade_to(
                "fk_favorites_recipe",
                (favorites::Entity, favorites::Column::RecipeId),
                recipes::Entity,
                recipes::Column::Id,
            ))
            .to_owned(),
        Table::create()
            .table(shopping_carts::Entity)
            .if_not_exists()
            .col(&mut id_column(shopping_carts::Column::Id))
            .col(ColumnDef::new(shopping_carts::Column::UserId).integer().not_null())
            .col(ColumnDef::new(shopping_carts::Column::RecipeId).integer().not_null())
            .index(
                Index::create()
                    .unique()
                    .name("unique_user_purchase")
                    .col(shopping_carts::Column::UserId)
                    .col(shopping_carts::Column::RecipeId),
            )
            .foreign_key(&mut cascade_to(
                "fk_shopping_carts_user",
                (shopping_carts::Entity, shopping_carts::Column::UserId),
                users::Entity,
                users::Column::Id,
            ))
            .foreign_key(&mut cascade_to(
                "fk_shopping_carts_recipe",
                (shopping_carts::Entity, shopping_carts::Column::RecipeId),
                recipes::Entity,
                recipes::Column::Id,
            ))
            .to_owned(),
        Table::create()
            .table(subscriptions::Entity)
            .if_not_exists()
            .col(&mut id_column(subscriptions::Column::Id))
            .col(ColumnDef::new(subscriptions::Column::UserId).integer().not_null())
            .col(ColumnDef::new(subscriptions::Column::AuthorId).integer().not_null())
            .col(ColumnDef::new(subscriptions::Column::CreatedAt).date_time().not_null())
            .index(
                Index::create()
                    .unique()
                    .name("unique_user_subscribing")
                    .col(subscriptions::Column::UserId)
                    .col(subscriptions::Column::AuthorId),
            )
            .foreign_key(&mut cascade_to(
                "fk_subscriptions_user",
                (subscriptions::Entity, subscriptions::Column::UserId),
                users::Entity,
                users::Column::Id,
            ))
            .foreign_key(&mut cascade_to(
                "fk_subscriptions_author",
                (subscriptions::Entity, subscriptions::Column::AuthorId),
                users::Entity,
                users::Column::Id,
            ))
            .to_owned(),
        Table::create()
            .table(short_links::Entity)
            .if_not_exists()
            .col(&mut id_column(short_links::Column::Id))
            .col(
                ColumnDef::new(short_links::Column::Token)
                    .string_len(32)
                    .not_null()
                    .unique_key(),
            )
            .col(
                ColumnDef::new(short_links::Column::Url)
                    .string_len(512)
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(short_links::Column::UserId).integer())
            .col(ColumnDef::new(short_links::Column::CreatedAt).date_time().not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_short_links_owner")
                    .from(short_links::Entity, short_links::Column::UserId)
                    .to(users::Entity, users::Column::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .on_update(ForeignKeyAction::NoAction),
            )
            .to_owned(),
    ]
}
