use std::sync::Arc;

use async_trait::async_trait;

use crate::{application::BrokerClient, BridgeResult, ConnectionProfile};

/// Источник профилей соединений и фабрика клиентов брокера.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Профиль по имени сервера или `ProfileNotFound`.
    fn profile(
        &self,
        server: &str,
    ) -> BridgeResult<ConnectionProfile>;

    /// Открыть новое соединение по профилю или `ConnectionFailed`.
    async fn open_client(
        &self,
        profile: &ConnectionProfile,
    ) -> BridgeResult<Arc<dyn BrokerClient>>;
}

/// Получение клиента для публикации.
///
/// Отделён от реестра подписок: публикация никогда не создаёт и не
/// трогает состояние подписки.
#[async_trait]
pub trait ClientResolver: Send + Sync {
    async fn client(
        &self,
        server: &str,
    ) -> BridgeResult<Arc<dyn BrokerClient>>;
}
