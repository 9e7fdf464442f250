/**
 * Server Configuration
 *
 * This module loads the server configuration and opens the store it
 * describes.
 *
 * # Configuration Sources
 *
 * Later sources override earlier ones:
 *
 * 1. Built-in defaults suitable for local development
 * 2. An optional TOML file whose path is given by `GOGO_CONFIG`
 * 3. Environment variables (a `.env` file is loaded by the binaries)
 *
 * | Variable           | Default                  |
 * |--------------------|--------------------------|
 * | `SERVER_PORT`      | `8000`                   |
 * | `DATABASE_URL`     | unset (in-memory store)  |
 * | `JWT_SECRET`       | development secret       |
 * | `TOKEN_TTL_HOURS`  | `24`                     |
 * | `BCRYPT_COST`      | bcrypt default           |
 * | `UPLOAD_DIR`       | `uploads`                |
 * | `PUBLIC_BASE_URL`  | `http://localhost:8000`  |
 * | `CORS_ORIGIN`      | `http://localhost:5173`  |
 * | `MAX_UPLOAD_BYTES` | 5 MiB                    |
 * | `ADMIN_USERNAME`   | `admin`                  |
 * | `ADMIN_EMAIL`      | `admin@gogo.com`         |
 * | `ADMIN_PASSWORD`   | unset                    |
 *
 * # Store Selection
 *
 * With `DATABASE_URL` set, `load_store` connects to PostgreSQL and runs the
 * embedded migrations. Without it the server runs on the in-memory store and
 * says so in the log.
 */

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::backend::store::{Store, StoreError};

/// Secret used when `JWT_SECRET` is missing. Development only.
pub const DEV_JWT_SECRET: &str = "gogo-development-secret-change-me";

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Credentials for the one-off admin bootstrap
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
}

impl Default for AdminBootstrap {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@gogo.com".to_string(),
            password: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: u64,
    pub bcrypt_cost: u32,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
    pub admin: AdminBootstrap,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            database_url: None,
            jwt_secret: None,
            token_ttl_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            upload_dir: PathBuf::from("uploads"),
            public_base_url: "http://localhost:8000".to_string(),
            cors_origin: "http://localhost:5173".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            admin: AdminBootstrap::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

impl ServerConfig {
    /// Load defaults, then the `GOGO_CONFIG` file if set, then the process
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var("GOGO_CONFIG") {
            Ok(path) => {
                let path = PathBuf::from(path);
                tracing::info!("Loading configuration from {}", path.display());
                let contents = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Io { path, source })?;
                Some(contents)
            }
            Err(_) => None,
        };

        let config = Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())?;
        if config.jwt_secret.is_none() {
            tracing::warn!("JWT_SECRET not set. Using the development secret.");
        }
        Ok(config)
    }

    /// Build a config from optional TOML text and an environment lookup.
    pub fn from_sources(
        file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(contents) => toml::from_str(contents)?,
            None => Self::default(),
        };

        if let Some(value) = env("SERVER_PORT") {
            config.port = parse_env("SERVER_PORT", value)?;
        }
        if let Some(value) = env("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            config.database_url = Some(value);
        }
        if let Some(value) = env("JWT_SECRET").filter(|v| !v.is_empty()) {
            config.jwt_secret = Some(value);
        }
        if let Some(value) = env("TOKEN_TTL_HOURS") {
            config.token_ttl_hours = parse_env("TOKEN_TTL_HOURS", value)?;
        }
        if let Some(value) = env("BCRYPT_COST") {
            config.bcrypt_cost = parse_env("BCRYPT_COST", value)?;
        }
        if let Some(value) = env("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(value);
        }
        if let Some(value) = env("PUBLIC_BASE_URL") {
            config.public_base_url = value;
        }
        if let Some(value) = env("CORS_ORIGIN") {
            config.cors_origin = value;
        }
        if let Some(value) = env("MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", value)?;
        }
        if let Some(value) = env("ADMIN_USERNAME") {
            config.admin.username = value;
        }
        if let Some(value) = env("ADMIN_EMAIL") {
            config.admin.email = value;
        }
        if let Some(value) = env("ADMIN_PASSWORD").filter(|v| !v.is_empty()) {
            config.admin.password = Some(value);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                value: self.bcrypt_cost.to_string(),
            });
        }
        if self.token_ttl_hours == 0 {
            return Err(ConfigError::InvalidValue {
                key: "TOKEN_TTL_HOURS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or(DEV_JWT_SECRET)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_hours * 60 * 60)
    }
}

/// Open the store described by `config`.
///
/// PostgreSQL when `database_url` is set (migrations are applied before
/// returning), otherwise the in-memory store.
pub async fn load_store(config: &ServerConfig) -> Result<Store, StoreError> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory store; data will not survive a restart.");
        return Ok(Store::memory());
    };

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            StoreError::from(e)
        })?;
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {:?}", e);
        StoreError::from(e)
    })?;
    tracing::info!("Database migrations completed successfully");

    Ok(Store::postgres(pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_sources(None, env(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.database_url, None);
        assert_eq!(config.jwt_secret(), DEV_JWT_SECRET);
        assert_eq!(config.token_ttl(), Duration::from_secs(24 * 3600));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.admin.email, "admin@gogo.com");
        assert_eq!(config.admin.password, None);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = r#"
            port = 9000
            public_base_url = "https://gogo.example"

            [admin]
            username = "root"
        "#;
        let config = ServerConfig::from_sources(
            Some(file),
            env(&[("SERVER_PORT", "9100"), ("JWT_SECRET", "s3cret"), ("ADMIN_PASSWORD", "pw123456")]),
        )
        .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.public_base_url, "https://gogo.example");
        assert_eq!(config.jwt_secret(), "s3cret");
        assert_eq!(config.admin.username, "root");
        assert_eq!(config.admin.email, "admin@gogo.com");
        assert_eq!(config.admin.password.as_deref(), Some("pw123456"));
    }

    #[test]
    fn test_empty_database_url_means_memory() {
        let config = ServerConfig::from_sources(None, env(&[("DATABASE_URL", "  ")])).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_invalid_values() {
        assert_matches!(
            ServerConfig::from_sources(None, env(&[("SERVER_PORT", "eighty")])),
            Err(ConfigError::InvalidValue { key: "SERVER_PORT", .. })
        );
        assert_matches!(
            ServerConfig::from_sources(None, env(&[("BCRYPT_COST", "2")])),
            Err(ConfigError::InvalidValue { key: "BCRYPT_COST", .. })
        );
        assert_matches!(
            ServerConfig::from_sources(Some("port = \"x\""), env(&[])),
            Err(ConfigError::Parse(_))
        );
    }

    #[tokio::test]
    async fn test_load_store_without_database_url_is_memory() {
        let config = ServerConfig::default();
        let store = load_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }
    #[test]
    #[serial_test::serial]
    fn test_load_reads_file_named_by_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gogo.toml");
        std::fs::write(&path, "token_ttl_hours = 48\n\n[admin]\nusername = \"root_admin\"\n").unwrap();

        std::env::set_var("GOGO_CONFIG", &path);
        let loaded = ServerConfig::load();
        std::env::remove_var("GOGO_CONFIG");

        let config = loaded.unwrap();
        assert_eq!(config.token_ttl_hours, 48);
        assert_eq!(config.admin.username, "root_admin");
        assert_eq!(config.admin.email, "admin@gogo.com");
    }

    #[test]
    #[serial_test::serial]
    fn test_load_reports_missing_file() {
        std::env::set_var("GOGO_CONFIG", "/nonexistent/gogo.toml");
        let loaded = ServerConfig::load();
        std::env::remove_var("GOGO_CONFIG");

        assert_matches!(loaded, Err(ConfigError::Io { .. }));
    }
}
