use std::env;

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

/// One year.
pub const MAX_EXPIRATION_HOURS: u64 = 24 * 365;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub blob: BlobConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_hours: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BlobConfig {
    pub dir: String,
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy variables (DATABASE_URL, JWT_SECRET, PORT, FRONTEND_URL)
    /// 2. Environment variables (EVENTHUB__DATABASE__URL, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.frontend_url", "http://localhost:5173")?
            .set_default("database.url", "sqlite:eventhub.db")?
            .set_default("database.max_connections", 5)?
            .set_default("jwt.secret", "")?
            .set_default("jwt.issuer", "eventhub")?
            .set_default("jwt.audience", "eventhub-web")?
            .set_default("jwt.expiration_hours", 24)?
            .set_default("blob.dir", "media")?
            .set_default("blob.public_base_url", "http://localhost:3000/media")?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // optional file
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("EVENTHUB")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }
        if let Ok(jwt_secret) = env::var("JWT_SECRET") {
            builder = builder.set_override("jwt.secret", jwt_secret)?;
        }
        if let Ok(port) = env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(frontend_url) = env::var("FRONTEND_URL") {
            builder = builder.set_override("server.frontend_url", frontend_url)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt.secret.len() < 32 {
            return Err("JWT secret must be at least 32 characters long".to_string());
        }
        if self.jwt.expiration_hours == 0 {
            return Err("JWT expiration_hours must be greater than 0".to_string());
        }
        if self.jwt.expiration_hours > MAX_EXPIRATION_HOURS {
            return Err(format!(
                "JWT expiration_hours must be at most {MAX_EXPIRATION_HOURS}"
            ));
        }
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_string());
        }
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        Ok(())
    }
}
