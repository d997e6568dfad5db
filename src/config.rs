use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Google Custom Search API key (only the ingest tool needs this)
    #[serde(default)]
    pub google_api_key: String,

    /// Google Custom Search engine ID (only the ingest tool needs this)
    #[serde(default)]
    pub google_search_engine_id: String,

    /// Google Custom Search API base URL
    #[serde(default = "default_google_api_url")]
    pub google_api_url: String,

    /// Botanical reference site that link searches are restricted to
    #[serde(default = "default_reference_site_url")]
    pub reference_site_url: String,

    /// Directory where downloaded plant images are stored
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_database_url() -> String {
    "sqlite://house_plants.db".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_google_api_url() -> String {
    "https://customsearch.googleapis.com".to_string()
}

fn default_reference_site_url() -> String {
    "https://www.missouribotanicalgarden.org".to_string()
}

fn default_image_dir() -> String {
    "images".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
