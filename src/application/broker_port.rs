use async_trait::async_trait;
use bytes::Bytes;

use crate::{BridgeResult, Message};

/// Соединение с брокером.
///
/// Реализация владеет транспортом; мост только публикует и подписывается.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Опубликовать сообщение в канал. Возвращает число получателей по
    /// версии брокера (может быть нулём).
    async fn publish(
        &self,
        channel: &str,
        payload: Bytes,
    ) -> BridgeResult<u64>;

    /// Подписаться на каналы по шаблону.
    async fn psubscribe(
        &self,
        pattern: &str,
    ) -> BridgeResult<PatternStream>;
}

/// Поток входящих сообщений подписки.
///
/// `recv` должен быть cancel-safe: его future участвует в `select!`
/// и может быть отброшен до завершения без потери сообщения.
#[async_trait]
pub trait MessageStream: Send {
    /// Следующее сообщение или `None`, если поток закончился.
    async fn recv(&mut self) -> Option<Message>;
}

/// Управление живой подпиской на стороне брокера.
pub trait SubscriptionControl: Send + Sync {
    /// Освобождает ресурсы подписки сразу: следующая публикация её уже
    /// не учитывает. Поток после этого заканчивается. Повторный вызов
    /// ничего не делает.
    fn close(&self);
}

/// Результат `psubscribe`: поток сообщений и управление подпиской.
pub struct PatternStream {
    pub messages: Box<dyn MessageStream>,
    pub control: Box<dyn SubscriptionControl>,
}
