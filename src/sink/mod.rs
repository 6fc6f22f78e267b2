//! Реализации [`crate::application::EventSink`].
//!
//! - `channel`: передача пачек в tokio-канал (тесты, встраивание).
//! - `json`: построчный JSON в любой `Write` (stdout бинарника).

pub mod channel;
pub mod json;

pub use channel::{ChannelSink, EmittedBatch};
pub use json::JsonLinesSink;
