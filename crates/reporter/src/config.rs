use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Plain TCP connection options; the deployment runs the database on a
    /// private network without TLS.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(PgSslMode::Disable)
    }
}

/// Which `StatusStore` backs the API.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Postgres,
    /// Process-local map; statuses are lost on restart.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterConfig {
    pub store: StoreKind,
    pub database: DatabaseConfig,
    pub port: u16,
    pub log_dir: String,
}

// Every field optional so file and environment can be layered.
#[derive(Deserialize, Default, Debug)]
pub struct PartialReporterConfig {
    store: Option<StoreKind>,
    db_host: Option<String>,
    db_port: Option<u16>,
    db_user: Option<String>,
    db_password: Option<String>,
    db_name: Option<String>,
    db_max_connections: Option<u32>,
    backend_port: Option<u16>,
    log_dir: Option<String>,
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_name() -> String {
    "postgres".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_PORT: u16 = 8080;

impl ReporterConfig {
    /// Loads the optional TOML file, then lets environment variables
    /// (including those from `.env`) override it.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path_str) if Path::new(path_str).exists() => read_file_config(path_str)?,
            _ => PartialReporterConfig::default(),
        };
        let env_config: PartialReporterConfig = envy::from_env()?;

        Ok(Self::merge(env_config, file_config))
    }

    /// Environment values take precedence over file values; defaults fill
    /// whatever neither provides.
    pub fn merge(env: PartialReporterConfig, file: PartialReporterConfig) -> Self {
        ReporterConfig {
            store: env.store.or(file.store).unwrap_or_default(),
            database: DatabaseConfig {
                host: env.db_host.or(file.db_host).unwrap_or_else(default_db_host),
                port: env.db_port.or(file.db_port).unwrap_or(DEFAULT_DB_PORT),
                user: env.db_user.or(file.db_user).unwrap_or_else(default_db_user),
                password: env.db_password.or(file.db_password).unwrap_or_default(),
                name: env.db_name.or(file.db_name).unwrap_or_else(default_db_name),
                max_connections: env
                    .db_max_connections
                    .or(file.db_max_connections)
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            },
            port: env.backend_port.or(file.backend_port).unwrap_or(DEFAULT_PORT),
            log_dir: env.log_dir.or(file.log_dir).unwrap_or_else(default_log_dir),
        }
    }
}

fn read_file_config(path_str: &str) -> Result<PartialReporterConfig, ConfigError> {
    let contents = fs::read_to_string(path_str).map_err(|source| ConfigError::Read {
        path: path_str.to_string(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path_str.to_string(),
        source,
    })
}
