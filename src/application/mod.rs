//! Порты (интерфейсы) внешних коллабораторов моста.
//!
//! - `BrokerClient`: соединение с брокером: публикация и подписка по шаблону.
//! - `ConnectionProvider`: профили соединений и открытие клиентов.
//! - `ClientResolver`: получение клиента для пути публикации.
//! - `EventSink`: приёмник пачек сообщений.

pub mod broker_port;
pub mod connection_port;
pub mod sink_port;

pub use broker_port::{BrokerClient, MessageStream, PatternStream, SubscriptionControl};
pub use connection_port::{ClientResolver, ConnectionProvider};
pub use sink_port::EventSink;
