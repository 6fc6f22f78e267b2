use thiserror::Error;

use super::StatusCode;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Ошибки, которые мост отдаёт вызывающей стороне.
///
/// Ни одна из них не пересекает границу моста в виде паники: фасад
/// [`crate::PubsubBridge`] сворачивает их в ответ `success: false` с
/// человекочитаемым сообщением.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    // ==== Профили и соединения ====
    #[error("no connection profile named: {server}")]
    ProfileNotFound { server: String },

    #[error("connection to '{server}' failed: {reason}")]
    ConnectionFailed { server: String, reason: String },

    // ==== Pub/Sub ====
    #[error("failed to subscribe to pattern '{pattern}': {reason}")]
    SubscriptionFailed { pattern: String, reason: String },

    #[error("failed to publish to channel '{channel}': {reason}")]
    PublishFailed { channel: String, reason: String },

    // ==== Жизненный цикл ====
    #[error("bridge is shut down")]
    Shutdown,
}

impl BridgeError {
    pub fn profile_not_found(server: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            server: server.into(),
        }
    }

    pub fn connection_failed(
        server: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::ConnectionFailed {
            server: server.into(),
            reason: reason.to_string(),
        }
    }

    pub fn subscription_failed(
        pattern: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::SubscriptionFailed {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }

    pub fn publish_failed(
        channel: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::PublishFailed {
            channel: channel.into(),
            reason: reason.to_string(),
        }
    }

    /// Категория ошибки.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ProfileNotFound { .. } => StatusCode::NotFound,
            Self::ConnectionFailed { .. } => StatusCode::ConnectionFailed,
            Self::SubscriptionFailed { .. } => StatusCode::InvalidArgs,
            Self::PublishFailed { .. } => StatusCode::InvalidArgs,
            Self::Shutdown => StatusCode::Unavailable,
        }
    }

    /// Сообщение, которое уходит клиенту в поле `msg`.
    pub fn client_message(&self) -> String {
        self.to_string()
    }
}

impl From<globset::Error> for BridgeError {
    fn from(err: globset::Error) -> Self {
        let pattern = err.glob().unwrap_or_default().to_string();
        BridgeError::SubscriptionFailed {
            pattern,
            reason: err.kind().to_string(),
        }
    }
}
