use globset::Glob;
use tokio::sync::broadcast;

use super::{Message, SubscriptionId};
use crate::RecvError;

/// Подписка на каналы по glob-паттерну.
///
/// Получает сообщения из всех каналов, подходящих под шаблон.
/// Брокер забывает подписку при [`LocalBroker::punsubscribe`] или на
/// первой публикации после `Drop`.
///
/// [`LocalBroker::punsubscribe`]: super::LocalBroker::punsubscribe
pub struct PatternSubscription {
    pub(crate) id: SubscriptionId,
    /// Шаблон glob для сопоставления имён каналов.
    pub pattern: Glob,
    /// Внутренний приёмник для входящих сообщений.
    pub(crate) inner: broadcast::Receiver<Message>,
}

impl PatternSubscription {
    /// Асинхронно ожидает следующее сообщение, соответствующее паттерну.
    ///
    /// # Возвращает
    /// - `Ok(Message)` при успешном получении сообщения
    /// - `Err(RecvError::Closed)` после отписки, когда очередь пуста
    /// - `Err(RecvError::Lagged(n))` если приёмник отстал на `n` сообщений
    pub async fn recv(&mut self) -> Result<Message, RecvError> {
        self.inner.recv().await.map_err(Into::into)
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn pattern(&self) -> &Glob {
        &self.pattern
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Количество сообщений в очереди на получение.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
