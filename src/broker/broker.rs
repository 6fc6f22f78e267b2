use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use bytes::Bytes;
use dashmap::DashMap;
use globset::{Glob, GlobMatcher};
use tokio::sync::broadcast;
use tracing::trace;

use super::{Message, PatternSubscription};

/// Идентификатор шаблонной подписки внутри брокера.
pub type SubscriptionId = u64;

/// Отправитель шаблонной подписки вместе с заранее скомпилированным
/// матчером, чтобы не компилировать glob на каждую публикацию.
struct PatternEntry {
    glob: Glob,
    matcher: GlobMatcher,
    tx: broadcast::Sender<Message>,
}

/// Встроенный брокер Pub/Sub сообщений.
///
/// Поддерживает:
/// - Подписки по шаблонам (glob), у каждой подписки свой `Sender`
/// - Синхронную отписку по идентификатору
/// - Автоматическое удаление подписок без слушателей
/// - Статистику публикаций и ошибок отправки
pub struct LocalBroker {
    /// Подписка → шаблон и `Sender`
    patterns: DashMap<SubscriptionId, PatternEntry>,
    next_id: AtomicU64,
    /// Ёмкость буфера каждого `broadcast::channel`
    default_capacity: usize,
    /// Общее количество вызовов `publish`
    pub publish_count: AtomicUsize,
    /// Количество неудачных `send` (приёмник уже сброшен)
    pub send_error_count: AtomicUsize,
}

impl LocalBroker {
    /// Создаёт новый брокер с заданной буферной ёмкостью каналов.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            patterns: DashMap::new(),
            next_id: AtomicU64::new(1),
            default_capacity: default_capacity.max(1),
            publish_count: AtomicUsize::new(0),
            send_error_count: AtomicUsize::new(0),
        }
    }

    /// Подписка по шаблону (glob), например `"kin.*"` или `"a?c"`.
    ///
    /// Каждый вызов регистрирует отдельную подписку: две подписки на один
    /// шаблон считаются двумя получателями.
    pub fn psubscribe(
        &self,
        pattern: &str,
    ) -> Result<PatternSubscription, globset::Error> {
        let glob = Glob::new(pattern)?;
        let (tx, rx) = broadcast::channel(self.default_capacity);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.patterns.insert(
            id,
            PatternEntry {
                matcher: glob.compile_matcher(),
                glob: glob.clone(),
                tx,
            },
        );
        Ok(PatternSubscription {
            id,
            pattern: glob,
            inner: rx,
        })
    }

    /// Отписка по идентификатору. Запись удаляется сразу: следующая
    /// публикация её уже не учитывает, а приёмник получит `Closed` после
    /// уже доставленных сообщений.
    ///
    /// Возвращает `false`, если подписки уже нет.
    pub fn punsubscribe(
        &self,
        id: SubscriptionId,
    ) -> bool {
        match self.patterns.remove(&id) {
            Some((_, entry)) => {
                trace!(id, pattern = entry.glob.glob(), "pattern unsubscribed");
                true
            }
            None => false,
        }
    }

    /// Публикация сообщения в канал.
    ///
    /// Отправляет сообщение каждой подписке, чей шаблон совпадает с
    /// именем канала, и возвращает число получателей. Подписки, у которых
    /// приёмник уже сброшен, удаляются.
    pub fn publish(
        &self,
        channel: &str,
        payload: impl Into<Bytes>,
    ) -> usize {
        self.publish_count.fetch_add(1, Ordering::Relaxed);

        let payload = payload.into();
        let key: Arc<str> = Arc::from(channel);
        let mut received = 0;

        let mut stale = Vec::new();
        for entry in self.patterns.iter() {
            if !entry.value().matcher.is_match(channel) {
                continue;
            }
            match entry.value().tx.send(Message::new(key.clone(), payload.clone())) {
                Ok(n) => received += n,
                Err(_) => {
                    self.send_error_count.fetch_add(1, Ordering::Relaxed);
                    stale.push(*entry.key());
                }
            }
        }
        for id in stale {
            self.patterns
                .remove_if(&id, |_, entry| entry.tx.receiver_count() == 0);
        }

        trace!(channel, received, "published");
        received
    }

    /// Количество зарегистрированных шаблонных подписок.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}
