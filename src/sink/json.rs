use std::io::Write;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use crate::{application::EventSink, BatchedMessage};

#[derive(Serialize)]
struct Line<'a> {
    event: &'a str,
    batch: &'a [BatchedMessage],
}

/// Приёмник, пишущий каждую пачку одной JSON-строкой:
/// `{"event":"sub:...","batch":[{"timestamp":..,"channel":..,"message":..}]}`.
///
/// Ошибка записи логируется, пачка теряется.
pub struct JsonLinesSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_line(
        &self,
        line: &Line<'_>,
    ) -> std::io::Result<()> {
        // одна запись на строку: stdout делят и другие писатели
        let mut buf = serde_json::to_vec(line)?;
        buf.push(b'\n');
        let mut out = self.out.lock();
        out.write_all(&buf)?;
        out.flush()
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(
        &self,
        event_name: &str,
        batch: Vec<BatchedMessage>,
    ) {
        let line = Line {
            event: event_name,
            batch: &batch,
        };
        if let Err(e) = self.write_line(&line) {
            warn!(event = event_name, batch_len = batch.len(), error = %e, "failed to write batch");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(
            &mut self,
            _buf: &[u8],
        ) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_each_batch_is_one_json_line() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.emit(
            "sub:local:1:0",
            vec![BatchedMessage {
                timestamp: 1700000000000,
                channel: "news".into(),
                payload: "hello".into(),
            }],
        );
        sink.emit("sub:local:1:0", Vec::new());

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            json!({
                "event": "sub:local:1:0",
                "batch": [{"timestamp": 1700000000000i64, "channel": "news", "message": "hello"}]
            })
        );
    }

    #[test]
    fn test_write_error_is_swallowed() {
        let sink = JsonLinesSink::new(BrokenWriter);
        sink.emit("ev", Vec::new());
    }
}
