use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::services::executor::{Credentials, DEFAULT_BASE_URL};
use crate::services::retry::{DEFAULT_BACKOFF_FACTOR, DEFAULT_MAX_RETRIES};

/// Largest accepted per-request timeout, in seconds.
pub const MAX_TIMEOUT_SECS: f64 = 3600.0;
/// Largest accepted backoff factor, in seconds.
pub const MAX_BACKOFF_FACTOR: f64 = 600.0;

pub const ENV_CLIENT_ID: &str = "OZON_CLIENT_ID";
pub const ENV_API_KEY: &str = "OZON_API_KEY";
pub const ENV_BASE_URL: &str = "OZON_BASE_URL";
pub const ENV_TIMEOUT: &str = "OZON_TIMEOUT";
pub const ENV_MAX_RETRIES: &str = "OZON_MAX_RETRIES";
pub const ENV_BACKOFF_FACTOR: &str = "OZON_BACKOFF_FACTOR";
pub const ENV_DEBUG: &str = "OZON_DEBUG";
pub const ENV_DATE_FROM: &str = "OZON_DATE_FROM";
pub const ENV_DATE_TO: &str = "OZON_DATE_TO";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("client_id and api_key must both be set")]
    MissingCredentials,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Client settings, resolved as defaults < config file < environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub client_id: String,
    pub api_key: String,
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout: f64,
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub debug: bool,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            client_id: String::new(),
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: 30.0,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            debug: false,
            date_from: None,
            date_to: None,
        }
    }
}

// Every key optional so a file only overrides what it names.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    client_id: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<f64>,
    max_retries: Option<u32>,
    backoff_factor: Option<f64>,
    debug: Option<bool>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

impl Config {
    /// Loads defaults, then `path` if it exists, then `OZON_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = path {
            if path.exists() {
                config.apply_file(path)?;
            } else {
                debug!("Config file {} not found, skipping", path.display());
            }
        }

        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let file: FileConfig = match extension.as_str() {
            "json" => serde_json::from_str(&contents)?,
            "yaml" | "yml" => {
                if contents.trim().is_empty() {
                    FileConfig::default()
                } else {
                    serde_yml::from_str(&contents)?
                }
            }
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        debug!("Loaded config file {}", path.display());
        self.merge(file);
        Ok(())
    }

    fn merge(&mut self, file: FileConfig) {
        if let Some(v) = file.client_id {
            self.client_id = v;
        }
        if let Some(v) = file.api_key {
            self.api_key = v;
        }
        if let Some(v) = file.base_url {
            self.base_url = v;
        }
        if let Some(v) = file.timeout {
            self.timeout = v;
        }
        if let Some(v) = file.max_retries {
            self.max_retries = v;
        }
        if let Some(v) = file.backoff_factor {
            self.backoff_factor = v;
        }
        if let Some(v) = file.debug {
            self.debug = v;
        }
        if file.date_from.is_some() {
            self.date_from = file.date_from;
        }
        if file.date_to.is_some() {
            self.date_to = file.date_to;
        }
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_CLIENT_ID) {
            self.client_id = v;
        }
        if let Some(v) = lookup(ENV_API_KEY) {
            self.api_key = v;
        }
        if let Some(v) = lookup(ENV_BASE_URL) {
            self.base_url = v;
        }
        if let Some(v) = lookup(ENV_TIMEOUT) {
            self.timeout = parse_value(ENV_TIMEOUT, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_RETRIES) {
            self.max_retries = parse_value(ENV_MAX_RETRIES, &v)?;
        }
        if let Some(v) = lookup(ENV_BACKOFF_FACTOR) {
            self.backoff_factor = parse_value(ENV_BACKOFF_FACTOR, &v)?;
        }
        if let Some(v) = lookup(ENV_DEBUG) {
            self.debug = parse_flag(ENV_DEBUG, &v)?;
        }
        if let Some(v) = lookup(ENV_DATE_FROM) {
            self.date_from = Some(parse_date(ENV_DATE_FROM, &v)?);
        }
        if let Some(v) = lookup(ENV_DATE_TO) {
            self.date_to = Some(parse_date(ENV_DATE_TO, &v)?);
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.timeout > 0.0 && self.timeout <= MAX_TIMEOUT_SECS) {
            return Err(invalid("timeout", self.timeout));
        }
        if !(0.0..=MAX_BACKOFF_FACTOR).contains(&self.backoff_factor) {
            return Err(invalid("backoff_factor", self.backoff_factor));
        }
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(invalid("date_from", format!("{from} is after date_to {to}")));
            }
        }
        Ok(())
    }

    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        Credentials::new(self.client_id.clone(), self.api_key.clone())
    }

    /// Per-request timeout, clamped to `MAX_TIMEOUT_SECS`.
    pub fn timeout(&self) -> Duration {
        let ceiling = Duration::from_secs_f64(MAX_TIMEOUT_SECS);
        Duration::try_from_secs_f64(self.timeout)
            .unwrap_or(ceiling)
            .min(ceiling)
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| invalid(key, raw))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw)),
    }
}

fn parse_date(key: &str, raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| invalid(key, raw))
}
