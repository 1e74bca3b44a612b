//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with FOODGRAM_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! The database URL is read from `DATABASE_URL` and is not part of this file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    /// Public origin used for absolute URLs (images, short links, pagination).
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Foodgram".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl SiteConfig {
    /// Base URL without a trailing slash.
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Listing limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Page size when `limit` is not supplied
    pub page_size: u64,
    /// Upper bound for `limit`
    pub max_page_size: u64,
    /// Recipes embedded per author in subscription listings
    pub recipes_per_author: u64,
    /// Maximum decoded image size in MB
    pub max_image_size_mb: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            page_size: 6,
            max_page_size: 100,
            recipes_per_author: 2,
            max_image_size_mb: 10,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Local storage path
    pub local_path: String,
    /// URL path images are served under
    pub media_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_path: "./media".to_string(),
            media_url: "/media".to_string(),
        }
    }
}

/// Short link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortLinkConfig {
    /// Number of characters in a minted token
    pub token_length: usize,
    /// Seconds a resolved token stays in the in-memory cache
    pub cache_ttl_seconds: u64,
}

impl Default for ShortLinkConfig {
    fn default() -> Self {
        Self {
            token_length: 6,
            cache_ttl_seconds: 600,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    pub storage: StorageConfig,
    pub short_link: ShortLinkConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // e.g. FOODGRAM_SITE__BASE_URL, FOODGRAM_LIMITS__PAGE_SIZE
            .add_source(
                Environment::with_prefix("FOODGRAM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reload configuration from file
    pub fn reload() -> Result<(), ConfigError> {
        let new_config = Self::load()?;
        if let Ok(mut config) = APP_CONFIG.write() {
            *config = new_config;
            log::info!("Configuration reloaded");
        }
        Ok(())
    }
}

/// Initialize application configuration
///
/// Triggers the lazy load and logs the result. Call early in start-up.
pub fn init() {
    let config = get_config();
    log::info!(
        "Configuration loaded: site.name = {}, site.base_url = {}",
        config.site.name,
        config.site.base_url
    );
}

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

pub fn site() -> SiteConfig {
    get_config().site
}

pub fn server() -> ServerConfig {
    get_config().server
}

pub fn limits() -> LimitsConfig {
    get_config().limits
}

pub fn storage() -> StorageConfig {
    get_config().storage
}

pub fn short_link() -> ShortLinkConfig {
    get_config().short_link
}
