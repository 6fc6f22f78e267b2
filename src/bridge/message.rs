use serde::{Deserialize, Serialize};

use crate::Message;

/// Сообщение в пачке, отдаваемой приёмнику событий.
///
/// `timestamp`: время получения мостом (мс с Unix epoch), а не время
/// отправки брокером.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchedMessage {
    pub timestamp: i64,
    pub channel: String,
    #[serde(rename = "message")]
    pub payload: String,
}

impl BatchedMessage {
    /// Штампует сообщение брокера временем получения.
    pub fn received(
        msg: &Message,
        timestamp: i64,
    ) -> Self {
        Self {
            timestamp,
            channel: msg.channel.to_string(),
            payload: msg.payload_lossy(),
        }
    }

    /// Текущее время в миллисекундах.
    pub fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
