//! Ядро моста.
//!
//! - `buffer`, `accumulator`: накопление сообщений и сброс пачек.
//! - `handle`, `registry`: подписки по серверам.
//! - `publish`: путь публикации.
//! - `lifecycle`: корневой токен отмены.
//! - `service`: фасад [`PubsubBridge`] и ответы [`Response`].

pub mod accumulator;
pub mod buffer;
pub mod handle;
pub mod lifecycle;
pub mod message;
pub mod publish;
pub mod registry;
pub mod response;
pub mod service;

pub use accumulator::{
    Accumulator, BatchOptions, DEFAULT_BUFFER_CAPACITY, DEFAULT_FLUSH_INTERVAL,
    DEFAULT_HIGH_WATER_MARK,
};
pub use buffer::{BatchBuffer, FlushReason};
pub use handle::{normalize_pattern, SubscriptionHandle, MATCH_ALL};
pub use lifecycle::Lifecycle;
pub use message::BatchedMessage;
pub use publish::Publisher;
pub use registry::{Registry, RegistryGuard};
pub use response::{PublishData, Response, SubscribeData};
pub use service::{PubsubBridge, SubscriptionInfo};
