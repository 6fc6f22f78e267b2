pub mod settings;

pub use settings::{BridgeSettings, BrokerSettings, Settings, ENV_PREFIX};
