//! Встроенный (in-process) Pub/Sub брокер.
//!
//! - `broker`: регистрация шаблонных подписок, доставка сообщений.
//! - `client`: реализация [`crate::application::BrokerClient`] поверх брокера.
//! - `hub`: набор именованных брокеров (namespace → брокер).
//! - `message`: структура сообщения.
//! - `subscriber`: подписка на glob-шаблон.

pub mod broker;
pub mod client;
pub mod hub;
pub mod message;
pub mod subscriber;

pub use broker::*;
pub use client::*;
pub use hub::*;
pub use message::*;
pub use subscriber::*;
