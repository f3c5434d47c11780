use crate::communication::{EdgeFunctionNotifier, Notifier};
use crate::database::{PostgrestRepository, Repository};
use serde::Deserialize;
use std::env;
use std::fs;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File read error")]
    FileError,

    #[error("Deserialization error:{0}")]
    DeserializationError(String),

    #[error("Missing environment variable:{0}")]
    MissingEnv(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    pub currency: String,
}

/// Names of the sibling functions that receive notifications
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    pub quotation_function: String,
    pub order_function: String,
    pub stock_alert_function: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: "PKR".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            quotation_function: "quotation-notifications".to_string(),
            order_function: "order-notifications".to_string(),
            stock_alert_function: "stock-alerts".to_string(),
        }
    }
}

impl Config {
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(config_file).map_err(|_| ConfigError::FileError)?;
        Self::from_json(&config_str)
    }

    pub fn from_json(config_str: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(config_str)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }
}

/// Supabase credentials, read from the environment once at start-up
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
}

impl SupabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: required_env("SUPABASE_URL")?,
            service_key: required_env("SUPABASE_KEY")?,
        })
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name.to_string())),
    }
}

#[derive(Clone)]
pub struct Context {
    pub config: Config,
    pub repository: Arc<dyn Repository>,
    pub notifier: Arc<dyn Notifier>,
}

impl Context {
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let config = Config::new(config_file)?;
        let supabase = SupabaseConfig::from_env()?;

        Ok(Self {
            config,
            repository: Arc::new(PostgrestRepository::new(
                &supabase.url,
                &supabase.service_key,
            )),
            notifier: Arc::new(EdgeFunctionNotifier::new(
                &supabase.url,
                &supabase.service_key,
            )),
        })
    }
}
