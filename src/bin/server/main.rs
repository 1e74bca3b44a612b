use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use foodgram::db::{connect, create_schema};
use foodgram::middleware::ClientCtx;
use foodgram::storage::local::LocalStorage;
use foodgram::storage::SharedStorage;
use std::path::PathBuf;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();
    init_our_mods();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set.");
    let db = connect(&database_url)
        .await
        .expect("Failed to connect to the database.");
    create_schema(&db)
        .await
        .expect("Failed to create the database schema.");

    let storage_config = foodgram::app_config::storage();
    let storage: SharedStorage = Arc::new(
        LocalStorage::new(PathBuf::from(&storage_config.local_path))
            .expect("Failed to initialize media storage."),
    );

    let bind = foodgram::app_config::server().bind;
    log::info!("Listening on {}", bind);

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(Data::new(db.clone()))
            .app_data(Data::new(storage.clone()))
            .app_data(foodgram::web::json_config())
            .app_data(foodgram::web::query_config())
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(ClientCtx::default())
            .wrap(Logger::new("%a %r %s %Dms"))
            .configure(foodgram::web::configure)
    })
    .bind(bind)?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    // A missing .env is fine; the environment may already be populated.
    if let Err(e) = dotenv::dotenv() {
        eprintln!("No .env loaded: {}", e);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Initialize all local mods.
pub fn init_our_mods() {
    foodgram::app_config::init();
}
