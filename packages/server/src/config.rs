use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Front-end origins allowed to call the API.
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

/// Database connection settings.
///
/// `url` wins when set; otherwise the URL is assembled from the individual
/// fields, which map onto the `MIRROR__DATABASE__HOST`-style variables used
/// by container deployments.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub sqlx_logging: bool,
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.name
            ),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Root of the judge API, e.g. `https://judgeapi.u-aizu.ac.jp`.
    pub base_url: String,
    pub timeout_secs: u64,
    /// Offset east of UTC in which submission times are stored and displayed.
    pub display_utc_offset_secs: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Largest `pageSize` a client may request.
    pub max_page_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("MIRROR_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", vec!["http://localhost:3000"])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.user", "postgres")?
            .set_default("database.password", "")?
            .set_default("database.name", "aoj_mirror")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout_secs", 8)?
            .set_default("database.sqlx_logging", false)?
            .set_default("upstream.base_url", "https://judgeapi.u-aizu.ac.jp")?
            .set_default("upstream.timeout_secs", 10)?
            // Asia/Tokyo, which observes no daylight saving time.
            .set_default("upstream.display_utc_offset_secs", 9 * 3600)?
            .set_default("search.max_page_size", 1000)?
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., MIRROR__DATABASE__URL)
            .add_source(
                Environment::with_prefix("MIRROR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
