use actbus::BusConfig;
use actbus::logger::LogConfig;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Default configuration file, looked up in the working directory with any
/// supported extension (`actbus-demo.toml`, ...).
pub const DEFAULT_CONFIG: &str = "actbus-demo";
pub const ENV_PREFIX: &str = "ACTBUS";

#[actbus::actbus_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub bus: BusConfig,
    pub logger: LogConfig,
}

impl Default for DemoConfig {
    /// Stdout carries the rendered view, so console logging is off unless configured.
    fn default() -> Self {
        Self {
            bus: BusConfig::default().with_label("ui"),
            logger: LogConfig { console: false, path: Some("logs".into()), ..LogConfig::default() },
        }
    }
}

/// Loads the demo configuration in layers:
/// 1. the file at `path`, which must exist when given, or the optional
///    [`DEFAULT_CONFIG`] file otherwise;
/// 2. environment overrides prefixed `ACTBUS__`, nested with `__`
///    (e.g. `ACTBUS__BUS__RETIRED_DISPATCH=reject`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicit file is missing or any source
/// does not match [`DemoConfig`].
pub fn load_config(path: Option<&Path>) -> Result<DemoConfig, ConfigError> {
    let file = path.map_or_else(
        || File::with_name(DEFAULT_CONFIG).required(false),
        |path| File::from(path).required(true),
    );

    let builder = Config::builder().add_source(file).add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .convert_case(config::Case::Snake),
    );

    info!(path = ?path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG)), "Loading demo config");

    builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<DemoConfig>()
        .context("Failed to deserialize config")
}
