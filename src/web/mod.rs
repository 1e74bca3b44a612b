pub mod auth;
pub mod ingredients;
pub mod media;
pub mod recipes;
pub mod short_links;
pub mod tags;
pub mod users;

use crate::error::ApiError;
use actix_web::web;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut web::ServiceConfig) {
    // Order is important within a scope.
    // Route resolution will stop at the first match.
    conf.service(
        web::scope("/api")
            .configure(auth::configure)
            .configure(tags::configure)
            .configure(ingredients::configure)
            .configure(recipes::configure)
            .configure(users::configure),
    );

    short_links::configure(conf);
    media::configure(conf);
}

/// JSON extractor settings. Malformed bodies become 400 validation errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024 * 1024)
        .error_handler(|err, _req| {
            log::debug!("rejected JSON body: {}", err);
            ApiError::non_field(err.to_string()).into()
        })
}

/// Query string extractor settings. Unparseable parameters become 400
/// validation errors.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        log::debug!("rejected query string: {}", err);
        ApiError::non_field(err.to_string()).into()
    })
}
