//! Application configuration.
//!
//! Loaded from YAML files and `FOODNEST__*` environment variables.

use crate::domain::PaymentMethod;
use serde::Deserialize;

/// Default configuration file name (extension resolved by the loader).
pub const DEFAULT_CONFIG_FILE: &str = "foodnest";
/// Environment variable for an explicit configuration file path.
pub const CONFIG_ENV_VAR: &str = "FOODNEST_CONFIG";
/// Prefix for configuration environment variables, e.g. `FOODNEST__ORDERS__MAX_PAGE_SIZE`.
pub const CONFIG_ENV_PREFIX: &str = "FOODNEST";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Capacity of the store actor's request channel.
    pub channel_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { channel_buffer: 64 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    pub max_notes_len: usize,
    pub default_page_size: usize,
    pub max_page_size: usize,
    /// Reject forward jumps that skip a status (e.g. pending -> ready).
    pub strict_adjacency: bool,
    /// Put decremented stock back when an order is cancelled.
    pub restore_stock_on_cancel: bool,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            max_notes_len: 500,
            default_page_size: 20,
            max_page_size: 100,
            strict_adjacency: false,
            restore_stock_on_cancel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub default_method: PaymentMethod,
    pub online_gateway_enabled: bool,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            default_method: PaymentMethod::CashOnDelivery,
            online_gateway_enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG` when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub orders: OrdersConfig,
    pub payments: PaymentsConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// Sources, later overriding earlier:
    /// 1. `foodnest.yaml` in the current directory (if it exists)
    /// 2. File given by `path` (if provided)
    /// 3. File named by `FOODNEST_CONFIG` (if set)
    /// 4. `FOODNEST__SECTION__KEY` environment variables
    pub fn load(path: Option<&str>) -> Result<Self, ::config::ConfigError> {
        use ::config::{Config, Environment, File, FileFormat};

        let mut builder = Config::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse a YAML document on top of the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ::config::ConfigError> {
        use ::config::{Config, File, FileFormat};

        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }
}
