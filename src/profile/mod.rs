//! Профили соединений и стандартная реализация провайдера соединений.

pub mod store;

use serde::{Deserialize, Serialize};

pub use store::ProfileStore;

/// Настройки соединения с брокером, хранимые под именем сервера.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionProfile {
    /// Имя сервера, по которому мост находит профиль.
    pub name: String,
    /// Namespace встроенного брокера.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    "default".to_string()
}

impl ConnectionProfile {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Профили по умолчанию: один сервер `local` на namespace `default`.
pub fn default_profiles() -> Vec<ConnectionProfile> {
    vec![ConnectionProfile::new("local", default_namespace())]
}
