//! Batched publish/subscribe bridge.
//!
//! Publishes messages to a broker and forwards pattern subscriptions to an
//! event sink in bounded, time-flushed batches.

/// Ports for the bridge's external collaborators (broker, connections, sink).
pub mod application;
/// Bridge core: batching loop, subscription registry, publish path, facade.
pub mod bridge;
/// In-process Pub/Sub broker used as the default transport.
pub mod broker;
/// Process configuration loading.
pub mod config;
/// Common error types and status codes.
pub mod error;
/// Flexible logging (formatting, filters, sinks).
pub mod logging;
/// Connection profiles and the default connection provider.
pub mod profile;
/// Event sink implementations.
pub mod sink;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Collaborator traits.
pub use application::{
    BrokerClient, ClientResolver, ConnectionProvider, EventSink, MessageStream, PatternStream,
    SubscriptionControl,
};
/// Bridge facade and its responses.
pub use bridge::{
    BatchOptions, BatchedMessage, PublishData, PubsubBridge, Response, SubscribeData,
    SubscriptionInfo,
};
/// In-process broker.
pub use broker::{BrokerHub, LocalBroker, LocalClient, Message};
/// config
pub use self::config::Settings;
/// Operation errors and result types.
pub use error::{BridgeError, BridgeResult, RecvError, StatusCode};
/// Logging bootstrap.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
/// Connection profiles.
pub use profile::{ConnectionProfile, ProfileStore};
/// Event sinks.
pub use sink::{ChannelSink, EmittedBatch, JsonLinesSink};
