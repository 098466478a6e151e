//! Configuration management for the Farm Ledger server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with FM__ prefix
//!
//! `DATABASE_URL` and `SUPABASE_JWT_SECRET` are honoured as fallbacks so the
//! server can run against an existing Supabase project without renaming them.

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Verification of the bearer tokens issued by the auth provider
    pub jwt: JwtConfig,

    pub cache: CacheConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// HMAC secret the tokens are signed with
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// How long a farm's master data is served from memory
    pub master_data_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = first_env(&["FM__ENVIRONMENT", "FM_ENVIRONMENT"])
            .unwrap_or_else(|| "development".into());

        let mut builder = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("cache.master_data_ttl_secs", 300)?
            .set_default("logging.json", false)?;

        // Supabase-style variable names sit below the FM__ overrides
        if let Some(url) = first_env(&["DATABASE_URL"]) {
            builder = builder.set_default("database.url", url)?;
        }
        if let Some(secret) = first_env(&["SUPABASE_JWT_SECRET"]) {
            builder = builder.set_default("jwt.secret", secret)?;
        }

        let config = builder
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FM__ prefix)
            .add_source(
                Environment::with_prefix("FM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// First non-empty value among the named environment variables
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_env_skips_blank_values() {
        std::env::set_var("FM_TEST_BLANK", "  ");
        std::env::set_var("FM_TEST_SET", "postgres://localhost/farm");
        assert_eq!(
            first_env(&["FM_TEST_MISSING", "FM_TEST_BLANK", "FM_TEST_SET"]).as_deref(),
            Some("postgres://localhost/farm")
        );
        assert_eq!(first_env(&["FM_TEST_MISSING"]), None);
    }
}
