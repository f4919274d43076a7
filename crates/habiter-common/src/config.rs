//! Client configuration loaded from environment variables and config files.
//!
//! Precedence: env vars > .env file > habiter.toml > defaults.
//! Environment keys use a double-underscore separator, e.g. `HABITER__HTTP__TOKEN`.

use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Load configuration from the default sources.
pub fn load() -> Result<ClientConfig, config::ConfigError> {
    let _ = dotenvy::dotenv();
    load_from(config::Environment::with_prefix("HABITER").separator("__").try_parsing(true))
}

/// Load configuration with an explicit environment source. Split out so tests
/// can feed a fixed map instead of the process environment.
pub fn load_from(env: config::Environment) -> Result<ClientConfig, config::ConfigError> {
    config::Config::builder()
        .set_default("http.token", "")?
        .set_default("http.base_url", DEFAULT_API_BASE)?
        .set_default("http.timeout_secs", 30)?
        .set_default("cache.max_private_channels", 128)?
        .add_source(config::File::with_name("habiter").required(false))
        .add_source(env)
        .build()?
        .try_deserialize()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub http: HttpConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Bot token; the `Bot ` prefix is added when missing.
    pub token: String,
    /// REST API root without a trailing slash.
    pub base_url: String,
    /// Per-request timeout applied by the HTTP client.
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// How many private channels the session keeps before evicting the oldest.
    pub max_private_channels: usize,
}
