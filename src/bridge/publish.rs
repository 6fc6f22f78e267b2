use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::{application::ClientResolver, BridgeResult};

/// Путь публикации.
///
/// Без состояния: получает клиента через [`ClientResolver`] и делает одну
/// публикацию. Реестр подписок не используется.
pub struct Publisher {
    resolver: Arc<dyn ClientResolver>,
}

impl Publisher {
    pub fn new(resolver: Arc<dyn ClientResolver>) -> Self {
        Self { resolver }
    }

    /// Публикует `payload` в `channel` сервера `server`.
    ///
    /// Возвращает число получателей, как его сообщил брокер (в том числе
    /// ноль). Ошибки транспорта пробрасываются как есть.
    pub async fn publish(
        &self,
        server: &str,
        channel: &str,
        payload: Bytes,
    ) -> BridgeResult<u64> {
        let client = self.resolver.client(server).await?;
        let size = payload.len();
        let received = client.publish(channel, payload).await?;
        debug!(server, channel, size, received, "message published");
        Ok(received)
    }
}
