use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://backend:8080";
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

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
    #[error("No TARGETS provided")]
    MissingTargets,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProberConfig {
    pub targets: Vec<String>,
    pub backend_url: String,
    pub ping_interval: Duration,
    /// A `ping_interval` value that did not parse and was replaced by the
    /// default. Reported once logging is up.
    pub rejected_ping_interval: Option<String>,
    pub log_dir: String,
}

#[derive(Deserialize, Default, Debug)]
pub struct PartialProberConfig {
    targets: Option<String>,
    backend_url: Option<String>,
    ping_interval: Option<String>,
    log_dir: Option<String>,
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl ProberConfig {
    /// Loads the optional TOML file, then lets environment variables
    /// (including those from `.env`) override it.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path_str) if Path::new(path_str).exists() => read_file_config(path_str)?,
            _ => PartialProberConfig::default(),
        };
        let env_config: PartialProberConfig = envy::from_env()?;

        Self::merge(env_config, file_config)
    }

    pub fn merge(
        env: PartialProberConfig,
        file: PartialProberConfig,
    ) -> Result<Self, ConfigError> {
        let targets = parse_targets(&env.targets.or(file.targets).unwrap_or_default());
        if targets.is_empty() {
            return Err(ConfigError::MissingTargets);
        }

        let backend_url = env
            .backend_url
            .or(file.backend_url)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let (ping_interval, rejected_ping_interval) =
            match env.ping_interval.or(file.ping_interval) {
                None => (DEFAULT_PING_INTERVAL, None),
                Some(raw) if raw.trim().is_empty() => (DEFAULT_PING_INTERVAL, None),
                Some(raw) => match humantime::parse_duration(raw.trim()) {
                    Ok(interval) => (interval, None),
                    Err(_) => (DEFAULT_PING_INTERVAL, Some(raw)),
                },
            };

        Ok(ProberConfig {
            targets,
            backend_url,
            ping_interval,
            rejected_ping_interval,
            log_dir: env.log_dir.or(file.log_dir).unwrap_or_else(default_log_dir),
        })
    }
}

/// Splits a comma-separated target list, trimming whitespace and dropping
/// empty entries.
pub fn parse_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_file_config(path_str: &str) -> Result<PartialProberConfig, ConfigError> {
    let contents = fs::read_to_string(path_str).map_err(|source| ConfigError::Read {
        path: path_str.to_string(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path_str.to_string(),
        source,
    })
}
