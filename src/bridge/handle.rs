use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Accumulator, BatchBuffer, BatchOptions, BatchedMessage};
use crate::{
    application::{BrokerClient, EventSink, SubscriptionControl},
    BridgeResult,
};

/// Шаблон, которым заменяется пустой ввод: все каналы.
pub const MATCH_ALL: &str = "*";

/// Сквозной номер активации: два старта в одну миллисекунду получают
/// разные имена событий.
static ACTIVATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Состояние подписки одного сервера.
///
/// Владеет соединением с брокером (создаётся лениво реестром и переживает
/// циклы подписки/отписки) и, пока подписка активна, тройкой
/// (подписка, стоп-сигнал, имя события).
pub struct SubscriptionHandle {
    server: String,
    client: Arc<dyn BrokerClient>,
    active: Option<ActiveSubscription>,
}

/// Живая подписка и её цикл накопления.
struct ActiveSubscription {
    control: Box<dyn SubscriptionControl>,
    stop: CancellationToken,
    event_name: Arc<str>,
    pattern: String,
    buffer: Arc<Mutex<BatchBuffer>>,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn new(
        server: impl Into<String>,
        client: Arc<dyn BrokerClient>,
    ) -> Self {
        Self {
            server: server.into(),
            client,
            active: None,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn client(&self) -> &Arc<dyn BrokerClient> {
        &self.client
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn event_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| &*a.event_name)
    }

    pub fn pattern(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.pattern.as_str())
    }

    /// Сколько сообщений ждёт сброса.
    pub fn pending(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.buffer.lock().len())
    }

    /// Жив ли цикл накопления.
    pub fn is_running(&self) -> bool {
        self.active.as_ref().is_some_and(|a| !a.task.is_finished())
    }

    /// Запускает подписку на `pattern` (пустой: все каналы).
    ///
    /// Если подписка уже активна, она сначала останавливается. Стоп-сигнал
    /// новой подписки порождается от `root`, поэтому отмена корневого
    /// токена тоже останавливает цикл.
    pub async fn activate(
        &mut self,
        pattern: &str,
        root: &CancellationToken,
        sink: Arc<dyn EventSink>,
        options: &BatchOptions,
    ) -> BridgeResult<Arc<str>> {
        if self.deactivate() {
            info!(server = %self.server, "replacing active subscription");
        }

        let pattern = normalize_pattern(pattern);
        let stream = self.client.psubscribe(&pattern).await?;

        let event_name = next_event_name(&self.server);
        let stop = root.child_token();
        let buffer = Arc::new(Mutex::new(BatchBuffer::new(
            options.buffer_capacity,
            options.high_water_mark,
        )));
        let accumulator = Accumulator::new(
            event_name.clone(),
            buffer.clone(),
            sink,
            options.flush_interval,
            stop.clone(),
        );
        let task = tokio::spawn(accumulator.run(stream.messages));

        debug!(server = %self.server, event = %event_name, pattern = %pattern, "subscription activated");
        self.active = Some(ActiveSubscription {
            control: stream.control,
            stop,
            event_name: event_name.clone(),
            pattern,
            buffer,
            task,
        });
        Ok(event_name)
    }

    /// Закрывает подписку и стоп-сигнал. Не ждёт завершения цикла.
    ///
    /// Возвращает `false`, если активной подписки не было.
    pub fn deactivate(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.control.close();
        active.stop.cancel();
        debug!(server = %self.server, event = %active.event_name, "subscription deactivated");
        true
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.deactivate();
    }
}

pub fn normalize_pattern(pattern: &str) -> String {
    if pattern.is_empty() {
        MATCH_ALL.to_string()
    } else {
        pattern.to_string()
    }
}

fn next_event_name(server: &str) -> Arc<str> {
    let seq = ACTIVATION_SEQ.fetch_add(1, Ordering::Relaxed);
    Arc::from(format!(
        "sub:{server}:{}:{seq}",
        BatchedMessage::now_millis()
    ))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::{
        broker::{LocalBroker, LocalClient},
        sink::ChannelSink,
    };

    fn handle() -> (SubscriptionHandle, Arc<LocalBroker>) {
        let broker = Arc::new(LocalBroker::new(64));
        let client = LocalClient::new("test", broker.clone());
        (SubscriptionHandle::new("local", Arc::new(client)), broker)
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        assert_eq!(normalize_pattern(""), "*");
        assert_eq!(normalize_pattern("news.*"), "news.*");
    }

    #[test]
    fn test_event_names_are_unique() {
        let a = next_event_name("local");
        let b = next_event_name("local");
        assert_ne!(a, b);
        assert!(a.starts_with("sub:local:"));
    }

    #[tokio::test]
    async fn test_activate_replaces_previous_subscription() {
        let (mut handle, broker) = handle();
        let (sink, _rx) = ChannelSink::new();
        let sink: Arc<dyn EventSink> = Arc::new(sink);
        let root = CancellationToken::new();

        let first = handle
            .activate("", &root, sink.clone(), &BatchOptions::default())
            .await
            .unwrap();
        let second = handle
            .activate("news.*", &root, sink, &BatchOptions::default())
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(handle.event_name(), Some(&*second));
        assert_eq!(handle.pattern(), Some("news.*"));

        // только вторая подписка осталась у брокера
        assert_eq!(broker.pattern_count(), 1);
        assert_eq!(broker.publish("news.a", Bytes::from_static(b"x")), 1);
        assert_eq!(broker.publish("other", Bytes::from_static(b"x")), 0);
    }

    #[tokio::test]
    async fn test_deactivate_is_idempotent() {
        let (mut handle, _broker) = handle();
        assert!(!handle.deactivate());

        let (sink, _rx) = ChannelSink::new();
        handle
            .activate("*", &CancellationToken::new(), Arc::new(sink), &BatchOptions::default())
            .await
            .unwrap();
        assert!(handle.is_active());
        assert!(handle.deactivate());
        assert!(!handle.deactivate());
        assert!(!handle.is_active());
        assert_eq!(handle.pending(), 0);
    }

    /// Тест проверяет, что после `deactivate` брокер сразу не видит
    /// подписку, без ожидания цикла накопления.
    #[tokio::test]
    async fn test_deactivate_releases_broker_subscription() {
        let (mut handle, broker) = handle();
        let (sink, _rx) = ChannelSink::new();
        handle
            .activate("*", &CancellationToken::new(), Arc::new(sink), &BatchOptions::default())
            .await
            .unwrap();
        assert_eq!(broker.publish("a", Bytes::from_static(b"1")), 1);

        handle.deactivate();
        assert_eq!(broker.publish("a", Bytes::from_static(b"2")), 0);
        assert_eq!(broker.pattern_count(), 0);
    }

    #[tokio::test]
    async fn test_root_cancellation_stops_loop() {
        let (mut handle, _broker) = handle();
        let (sink, _rx) = ChannelSink::new();
        let root = CancellationToken::new();
        handle
            .activate("*", &root, Arc::new(sink), &BatchOptions::default())
            .await
            .unwrap();
        assert!(handle.is_running());

        root.cancel();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!handle.is_running());
    }
}
