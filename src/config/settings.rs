use std::{collections::HashSet, path::Path, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{
    bridge::{
        BatchOptions, DEFAULT_BUFFER_CAPACITY, DEFAULT_FLUSH_INTERVAL, DEFAULT_HIGH_WATER_MARK,
    },
    logging::LoggingConfig,
    profile::default_profiles,
    ConnectionProfile,
};

/// Префикс переменных окружения: `PUBSUB_BRIDGE_BRIDGE__FLUSH_INTERVAL_MS=100`.
pub const ENV_PREFIX: &str = "PUBSUB_BRIDGE";

/// Параметры накопления пачек.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    pub flush_interval_ms: u64,
    pub high_water_mark: usize,
    pub buffer_capacity: usize,
}

/// Параметры встроенного брокера.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSettings {
    /// Ёмкость канала одного подписчика.
    pub channel_capacity: usize,
}

/// Конфигурация процесса.
///
/// Источники в порядке приоритета: переменные окружения, TOML-файл,
/// значения по умолчанию.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bridge: BridgeSettings,
    pub broker: BrokerSettings,
    pub profiles: Vec<ConnectionProfile>,
    pub logging: LoggingConfig,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL.as_millis() as u64,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bridge: BridgeSettings::default(),
            broker: BrokerSettings::default(),
            profiles: default_profiles(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Загружает конфигурацию: значения по умолчанию, затем файл `path`
    /// (если передан, он обязан существовать), затем переменные окружения.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let cfg = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.flush_interval_ms == 0 {
            return Err(ConfigError::Message(
                "bridge.flush_interval_ms must be positive".into(),
            ));
        }
        if self.bridge.high_water_mark == 0 {
            return Err(ConfigError::Message(
                "bridge.high_water_mark must be positive".into(),
            ));
        }
        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if !seen.insert(profile.name.as_str()) {
                return Err(ConfigError::Message(format!(
                    "duplicate connection profile: {}",
                    profile.name
                )));
            }
        }
        self.logging.validate().map_err(ConfigError::Message)
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            flush_interval: Duration::from_millis(self.bridge.flush_interval_ms),
            high_water_mark: self.bridge.high_water_mark,
            buffer_capacity: self.bridge.buffer_capacity,
        }
    }
}
