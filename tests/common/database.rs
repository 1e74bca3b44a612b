//! Test database setup and management
#![allow(dead_code)]

use sea_orm::{DatabaseConnection, DbErr};

/// Fresh in-memory SQLite database with the full schema.
///
/// Every call returns an isolated database, so tests may run in parallel.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    let db = foodgram::db::connect("sqlite::memory:").await?;
    foodgram::db::create_schema(&db).await?;
    Ok(db)
}
