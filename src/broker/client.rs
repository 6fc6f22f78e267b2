use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use super::{LocalBroker, Message, PatternSubscription, SubscriptionId};
use crate::{
    application::{BrokerClient, MessageStream, PatternStream, SubscriptionControl},
    BridgeError, BridgeResult, RecvError,
};

/// Клиент встроенного брокера.
#[derive(Clone)]
pub struct LocalClient {
    namespace: String,
    broker: Arc<LocalBroker>,
}

/// Поток сообщений шаблонной подписки встроенного брокера.
///
/// Заканчивается, когда подписку сняли у брокера и очередь опустела.
pub struct LocalMessageStream {
    inner: PatternSubscription,
}

/// Снимает подписку [`LocalMessageStream`] у брокера.
pub struct LocalSubscriptionControl {
    broker: Arc<LocalBroker>,
    id: SubscriptionId,
    pattern: String,
}

impl LocalClient {
    pub fn new(
        namespace: impl Into<String>,
        broker: Arc<LocalBroker>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            broker,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn broker(&self) -> &Arc<LocalBroker> {
        &self.broker
    }
}

#[async_trait]
impl BrokerClient for LocalClient {
    async fn publish(
        &self,
        channel: &str,
        payload: Bytes,
    ) -> BridgeResult<u64> {
        if channel.is_empty() {
            return Err(BridgeError::publish_failed(
                channel,
                "channel name must not be empty",
            ));
        }
        Ok(self.broker.publish(channel, payload) as u64)
    }

    async fn psubscribe(
        &self,
        pattern: &str,
    ) -> BridgeResult<PatternStream> {
        let inner = self.broker.psubscribe(pattern)?;
        let id = inner.id();
        debug!(namespace = %self.namespace, pattern, id, "pattern subscription opened");

        Ok(PatternStream {
            messages: Box::new(LocalMessageStream { inner }),
            control: Box::new(LocalSubscriptionControl {
                broker: self.broker.clone(),
                id,
                pattern: pattern.to_string(),
            }),
        })
    }
}

#[async_trait]
impl MessageStream for LocalMessageStream {
    async fn recv(&mut self) -> Option<Message> {
        loop {
            match self.inner.recv().await {
                Ok(msg) => return Some(msg),
                Err(RecvError::Lagged(n)) => {
                    warn!(pattern = self.inner.pattern().glob(), missed = n, "subscription lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl SubscriptionControl for LocalSubscriptionControl {
    fn close(&self) {
        if self.broker.punsubscribe(self.id) {
            debug!(pattern = %self.pattern, id = self.id, "pattern subscription closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{timeout, Duration};

    use super::*;

    fn client() -> LocalClient {
        LocalClient::new("test", Arc::new(LocalBroker::new(16)))
    }

    #[tokio::test]
    async fn test_publish_reports_receivers() {
        let client = client();
        assert_eq!(client.publish("a", Bytes::from_static(b"1")).await, Ok(0));

        let _stream = client.psubscribe("*").await.unwrap();
        assert_eq!(client.publish("a", Bytes::from_static(b"1")).await, Ok(1));
    }

    #[tokio::test]
    async fn test_stream_yields_messages_in_order() {
        let client = client();
        let mut stream = client.psubscribe("news.*").await.unwrap();
        client.publish("news.a", Bytes::from_static(b"1")).await.unwrap();
        client.publish("other", Bytes::from_static(b"x")).await.unwrap();
        client.publish("news.b", Bytes::from_static(b"2")).await.unwrap();

        let first = stream.messages.recv().await.unwrap();
        let second = stream.messages.recv().await.unwrap();
        assert_eq!(&*first.channel, "news.a");
        assert_eq!(&*second.channel, "news.b");
    }

    /// Тест проверяет, что после `close` брокер сразу перестаёт считать
    /// подписку получателем.
    #[tokio::test]
    async fn test_close_releases_subscription_immediately() {
        let client = client();
        let stream = client.psubscribe("*").await.unwrap();
        assert_eq!(client.publish("a", Bytes::from_static(b"1")).await, Ok(1));

        stream.control.close();
        assert_eq!(client.publish("a", Bytes::from_static(b"2")).await, Ok(0));
        assert_eq!(client.broker().pattern_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_channel_is_publish_error() {
        let err = client().publish("", Bytes::from_static(b"1")).await.unwrap_err();
        assert!(matches!(err, crate::BridgeError::PublishFailed { .. }));
    }

    #[tokio::test]
    async fn test_close_ends_stream() {
        let client = client();
        let mut stream = client.psubscribe("*").await.unwrap();
        stream.control.close();
        stream.control.close();

        let next = timeout(Duration::from_millis(50), stream.messages.recv())
            .await
            .expect("closed stream must not block");
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_subscription_error() {
        let err = client().psubscribe("[oops").await.err().unwrap();
        assert!(matches!(err, crate::BridgeError::SubscriptionFailed { .. }));
    }
}
