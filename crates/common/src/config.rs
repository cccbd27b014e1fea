//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Emote storage and submission settings.
    #[serde(default)]
    pub emotes: EmoteConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body in bytes (uploads included).
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit: default_body_limit(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Emote storage and submission settings.
///
/// Passed explicitly into the services that need it; business logic never
/// reads process-wide state.
#[derive(Debug, Clone, Deserialize)]
pub struct EmoteConfig {
    /// Directory that holds `emoticons/uploaded/...`.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
    /// Directory where multipart uploads are spooled before placement.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Prefix prepended to a canonical name to build its image URL.
    /// Can point to a CDN if images are hosted elsewhere.
    #[serde(default = "default_image_url_prefix")]
    pub image_url_prefix: String,
    /// Image formats accepted for upload, compared case-insensitively.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Canonical name prefixes that regular members may submit under.
    #[serde(default = "default_whitelist_emote_subdirs")]
    pub default_whitelist_emote_subdirs: Vec<String>,
    /// Host prefix used in the legacy export's `background-image` field.
    #[serde(default = "default_legacy_export_prefix")]
    pub legacy_export_prefix: String,
}

impl Default for EmoteConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            upload_dir: default_upload_dir(),
            image_url_prefix: default_image_url_prefix(),
            allowed_extensions: default_allowed_extensions(),
            default_whitelist_emote_subdirs: default_whitelist_emote_subdirs(),
            legacy_export_prefix: default_legacy_export_prefix(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    1337
}

const fn default_body_limit() -> usize {
    16 * 1024 * 1024
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("./content")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./.tmp/uploads")
}

fn default_image_url_prefix() -> String {
    "/emote/img/uploaded/".to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    ["gif", "jpg", "jpeg", "png", "tiff", "webp", "svg"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_whitelist_emote_subdirs() -> Vec<String> {
    vec!["mls/volatile/".to_string()]
}

fn default_legacy_export_prefix() -> String {
    "http://localhost:1337/".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `EMOTES_ENV`)
    /// 4. Environment variables with `EMOTES__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("EMOTES_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("EMOTES")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("emotes.allowed_extensions")
                    .with_list_parse_key("emotes.default_whitelist_emote_subdirs")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("EMOTES")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
