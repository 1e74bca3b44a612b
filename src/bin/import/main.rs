//! Loads the ingredient and tag catalogue from JSON files.
//!
//! Usage: `foodgram-import <ingredients.json> [tags.json]`

use anyhow::{bail, Context, Result};
use env_logger::Env;
use foodgram::db::{connect, create_schema};
use foodgram::import::{import_ingredients, import_tags, IngredientRecord, TagRecord};
use std::fs::File;
use std::io::BufReader;

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| format!("cannot parse {}", path))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.len() > 2 {
        bail!("usage: foodgram-import <ingredients.json> [tags.json]");
    }

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = connect(&database_url).await?;
    create_schema(&db).await?;

    let ingredients: Vec<IngredientRecord> = read_json(&args[0])?;
    let count = import_ingredients(&db, ingredients).await?;
    println!("Ingredients imported: {}", count);

    if let Some(path) = args.get(1) {
        let tags: Vec<TagRecord> = read_json(path)?;
        let count = import_tags(&db, tags).await?;
        println!("Tags imported: {}", count);
    }

    Ok(())
}
