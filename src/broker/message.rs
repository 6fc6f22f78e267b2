use std::sync::Arc;

use bytes::Bytes;
use tracing::trace;

/// Сообщение, доставляемое брокером подписчикам.
///
/// `channel`: конкретный канал публикации, даже если подписка была
/// оформлена по шаблону.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub channel: Arc<str>,
    pub payload: Bytes,
}

impl Message {
    pub fn new(
        channel: impl Into<Arc<str>>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }

    /// Payload как строка; невалидные UTF-8 последовательности заменяются
    /// на `U+FFFD`, о чём пишется trace-событие.
    pub fn payload_lossy(&self) -> String {
        match std::str::from_utf8(&self.payload) {
            Ok(text) => text.to_owned(),
            Err(err) => {
                trace!(
                    channel = %self.channel,
                    len = self.payload.len(),
                    valid_up_to = err.valid_up_to(),
                    "payload is not valid UTF-8, invalid bytes replaced"
                );
                String::from_utf8_lossy(&self.payload).into_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use tracing_subscriber::{fmt, prelude::*, registry::Registry};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs(emit: impl FnOnce()) -> String {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let layer = fmt::layer()
            .with_ansi(false)
            .with_writer(move || writer.clone());
        tracing::subscriber::with_default(Registry::default().with(layer), emit);
        let out = buf.0.lock().unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Тест проверяет создание сообщения с &str и статическими байтами
    #[test]
    fn test_message_creation_with_str_and_bytes() {
        let msg = Message::new("news", Bytes::from_static(b"hello world"));

        assert_eq!(&*msg.channel, "news");
        assert_eq!(msg.payload, Bytes::from_static(b"hello world"));
    }

    /// Тест проверяет создание сообщения с String и Vec<u8>
    #[test]
    fn test_message_creation_with_string_and_vec() {
        let msg = Message::new(String::from("updates"), vec![1u8, 2, 3]);

        assert_eq!(&*msg.channel, "updates");
        assert_eq!(msg.payload.as_ref(), &[1, 2, 3]);
    }

    /// Тест проверяет, что бинарный payload не ломает строковое представление
    #[test]
    fn test_payload_lossy_with_binary_data() {
        let msg = Message::new("bin", vec![b'o', b'k', 0xff]);
        assert_eq!(msg.payload_lossy(), "ok\u{fffd}");
    }

    /// Тест проверяет, что замена невалидных байтов видна в логах, а
    /// валидный payload проходит молча.
    #[test]
    fn test_payload_lossy_logs_replacement() {
        let bad = Message::new("bin", vec![b'o', b'k', 0xff]);
        let good = Message::new("txt", Bytes::from_static(b"ok"));

        let logs = capture_logs(|| {
            assert_eq!(bad.payload_lossy(), "ok\u{fffd}");
        });
        assert!(logs.contains("invalid bytes replaced"));
        assert!(logs.contains("channel=bin"));

        let logs = capture_logs(|| {
            assert_eq!(good.payload_lossy(), "ok");
        });
        assert!(logs.is_empty());
    }
}
