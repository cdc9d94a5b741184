//! API configuration

use serde::Deserialize;

/// Which storage backend the server runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// PostgreSQL through `infra_db`
    Postgres,
    /// In-process maps; data is lost on restart
    Memory,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Storage backend
    pub store: StoreKind,
    /// Database URL, used when `store` is `postgres`
    pub database_url: String,
    /// Apply the embedded migrations on startup
    pub run_migrations: bool,
    /// Log level
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            store: StoreKind::Postgres,
            database_url: "postgres://localhost/party".to_string(),
            run_migrations: true,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables over the defaults
    ///
    /// `DATABASE_URL` is honoured when `API_DATABASE_URL` is not set.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiration_secs", defaults.jwt_expiration_secs)?
            .set_default("store", "postgres")?
            .set_default("database_url", defaults.database_url)?
            .set_default("run_migrations", defaults.run_migrations)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "text")?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_default("database_url", url)?;
        }

        builder
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.store, StoreKind::Postgres);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_store_kind_names() {
        let memory: StoreKind = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(memory, StoreKind::Memory);
        assert!(serde_json::from_str::<StoreKind>("\"sqlite\"").is_err());
    }
}
