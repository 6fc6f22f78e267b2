use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{
    BatchOptions, Lifecycle, PublishData, Publisher, Registry, Response, SubscribeData,
};
use crate::{
    application::{ClientResolver, ConnectionProvider, EventSink},
    profile::ProfileStore,
    BridgeError, BridgeResult,
};

/// Снимок активной подписки.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    pub server: String,
    pub event_name: String,
    pub pattern: String,
    pub pending: usize,
}

/// Фасад моста: публикация, старт и остановка подписок.
///
/// Все операции возвращают [`Response`]; варианты `try_*` отдают
/// типизированный [`BridgeResult`].
pub struct PubsubBridge {
    registry: Registry,
    publisher: Publisher,
    lifecycle: Lifecycle,
    sink: Arc<dyn EventSink>,
    options: BatchOptions,
}

impl PubsubBridge {
    pub fn new(
        provider: Arc<dyn ConnectionProvider>,
        resolver: Arc<dyn ClientResolver>,
        sink: Arc<dyn EventSink>,
        options: BatchOptions,
    ) -> Self {
        Self {
            registry: Registry::new(provider),
            publisher: Publisher::new(resolver),
            lifecycle: Lifecycle::new(),
            sink,
            options,
        }
    }

    /// Мост поверх хранилища профилей: оно же провайдер соединений и
    /// резолвер клиентов публикации.
    pub fn with_profile_store(
        store: Arc<ProfileStore>,
        sink: Arc<dyn EventSink>,
        options: BatchOptions,
    ) -> Self {
        Self::new(store.clone(), store, sink, options)
    }

    /// Привязывает жизненный цикл моста к токену процесса.
    ///
    /// Повторный вызов после [`stop_all`](Self::stop_all) снова разрешает
    /// подписки.
    pub fn start(
        &self,
        parent: &CancellationToken,
    ) {
        self.lifecycle.start(parent);
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub async fn publish(
        &self,
        server: &str,
        channel: &str,
        payload: impl Into<Bytes>,
    ) -> Response<PublishData> {
        Response::from_result(self.try_publish(server, channel, payload).await)
    }

    pub async fn try_publish(
        &self,
        server: &str,
        channel: &str,
        payload: impl Into<Bytes>,
    ) -> BridgeResult<PublishData> {
        let received = self
            .publisher
            .publish(server, channel, payload.into())
            .await
            .inspect_err(|err| {
                warn!(server, channel, status = %err.status_code(), error = %err, "publish failed")
            })?;
        Ok(PublishData { received })
    }

    pub async fn start_subscribe(
        &self,
        server: &str,
        pattern: &str,
    ) -> Response<SubscribeData> {
        Response::from_result(self.try_start_subscribe(server, pattern).await)
    }

    /// Запускает подписку сервера `server` на `pattern`.
    ///
    /// Активная подписка того же сервера заменяется: старая закрывается
    /// до открытия новой, и её событие больше не получает пакетов.
    pub async fn try_start_subscribe(
        &self,
        server: &str,
        pattern: &str,
    ) -> BridgeResult<SubscribeData> {
        let mut registry = self.registry.lock().await;
        // проверка под блокировкой: stop_all снимает ключи только после нас
        if self.lifecycle.is_cancelled() {
            return Err(BridgeError::Shutdown);
        }
        let res = match registry.resolve(server).await {
            Ok(handle) => {
                handle
                    .activate(
                        pattern,
                        &self.lifecycle.root(),
                        self.sink.clone(),
                        &self.options,
                    )
                    .await
            }
            Err(err) => Err(err),
        };
        drop(registry);

        match res {
            Ok(event_name) => {
                info!(server, pattern, event = %event_name, "subscription started");
                Ok(SubscribeData {
                    event_name: event_name.to_string(),
                })
            }
            Err(err) => {
                warn!(server, pattern, status = %err.status_code(), error = %err, "subscription failed");
                Err(err)
            }
        }
    }

    /// Останавливает подписку сервера. Всегда успешна.
    ///
    /// Неизвестный сервер и уже остановленная подписка ничего не меняют.
    pub async fn stop_subscribe(
        &self,
        server: &str,
    ) -> Response<()> {
        let mut registry = self.registry.lock().await;
        let deactivated = registry
            .get_mut(server)
            .is_some_and(|handle| handle.deactivate());
        if deactivated {
            registry.remove(server);
            info!(server, "subscription stopped");
        }
        Response::done()
    }

    /// Останавливает все подписки: отменяет корень, затем закрывает
    /// каждую запись по снимку ключей.
    pub async fn stop_all(&self) {
        self.lifecycle.cancel();
        let servers = self.registry.servers().await;
        let count = servers.len();
        for server in servers {
            self.stop_subscribe(&server).await;
        }
        info!(count, "all subscriptions stopped");
    }

    pub async fn subscriptions(&self) -> Vec<SubscriptionInfo> {
        let registry = self.registry.lock().await;
        let mut list: Vec<SubscriptionInfo> = registry
            .handles()
            .filter_map(|handle| {
                Some(SubscriptionInfo {
                    server: handle.server().to_string(),
                    event_name: handle.event_name()?.to_string(),
                    pattern: handle.pattern()?.to_string(),
                    pending: handle.pending(),
                })
            })
            .collect();
        list.sort_by(|a, b| a.server.cmp(&b.server));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{broker::BrokerHub, sink::ChannelSink, ConnectionProfile};

    fn bridge() -> PubsubBridge {
        let hub = Arc::new(BrokerHub::new(64));
        let store = Arc::new(ProfileStore::new(
            [ConnectionProfile::new("local", "default")],
            hub,
        ));
        let (sink, _rx) = ChannelSink::new();
        PubsubBridge::with_profile_store(store, Arc::new(sink), BatchOptions::default())
    }

    #[tokio::test]
    async fn test_stop_unknown_server_succeeds() {
        let bridge = bridge();
        let resp = bridge.stop_subscribe("nowhere").await;
        assert!(resp.success);
        assert!(bridge.subscriptions().await.is_empty());
    }

    #[tokio::test]
    async fn test_subscription_listed_until_stopped() {
        let bridge = bridge();
        let data = bridge.try_start_subscribe("local", "").await.unwrap();

        let list = bridge.subscriptions().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].event_name, data.event_name);
        assert_eq!(list[0].pattern, "*");

        bridge.stop_subscribe("local").await;
        assert!(bridge.subscriptions().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_profile_fails_subscribe() {
        let bridge = bridge();
        let resp = bridge.start_subscribe("prod", "*").await;
        assert!(!resp.success);
        assert!(resp.msg.contains("prod"));
        assert!(bridge.subscriptions().await.is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_after_stop_all_is_rejected() {
        let bridge = bridge();
        bridge.stop_all().await;
        let err = bridge.try_start_subscribe("local", "*").await.unwrap_err();
        assert_eq!(err, BridgeError::Shutdown);

        bridge.start(&CancellationToken::new());
        assert!(bridge.try_start_subscribe("local", "*").await.is_ok());
    }
}
