use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::{BatchBuffer, BatchedMessage, FlushReason};
use crate::{
    application::{EventSink, MessageStream},
    Message,
};

pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(300);
pub const DEFAULT_HIGH_WATER_MARK: usize = 300;
pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

/// Параметры накопления пачек.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Период таймера сброса.
    pub flush_interval: Duration,
    /// Размер буфера, при котором пачка сбрасывается немедленно.
    pub high_water_mark: usize,
    /// Начальная ёмкость буфера.
    pub buffer_capacity: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Цикл накопления одной подписки.
///
/// Ждёт одно из трёх событий: стоп, новое сообщение или тик таймера.
/// Стоп проверяется первым, поэтому после остановки ни одно сообщение
/// уже не обрабатывается. Сообщения обрабатываются прямо в цикле, в
/// порядке получения. Пачка извлекается под блокировкой буфера, а
/// отдаётся приёмнику после её освобождения.
pub struct Accumulator {
    event_name: Arc<str>,
    buffer: Arc<Mutex<BatchBuffer>>,
    sink: Arc<dyn EventSink>,
    flush_interval: Duration,
    stop: CancellationToken,
}

impl Accumulator {
    pub fn new(
        event_name: Arc<str>,
        buffer: Arc<Mutex<BatchBuffer>>,
        sink: Arc<dyn EventSink>,
        flush_interval: Duration,
        stop: CancellationToken,
    ) -> Self {
        Self {
            event_name,
            buffer,
            sink,
            flush_interval: flush_interval.max(Duration::from_millis(1)),
            stop,
        }
    }

    /// Основной цикл. Завершается только по стоп-сигналу; закончившийся
    /// поток сообщений просто перестаёт опрашиваться.
    pub async fn run(
        self,
        mut messages: Box<dyn MessageStream>,
    ) {
        let mut ticker = interval_at(Instant::now() + self.flush_interval, self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stream_open = true;

        debug!(event = %self.event_name, interval_ms = self.flush_interval.as_millis() as u64, "accumulator started");

        loop {
            tokio::select! {
                biased;

                _ = self.stop.cancelled() => {
                    debug!(
                        event = %self.event_name,
                        dropped = self.buffer.lock().len(),
                        "accumulator stopped"
                    );
                    break;
                }

                msg = messages.recv(), if stream_open => match msg {
                    Some(msg) => self.on_message(&msg),
                    None => {
                        debug!(event = %self.event_name, "message stream ended");
                        stream_open = false;
                    }
                },

                _ = ticker.tick() => self.on_tick(),
            }
        }
    }

    fn on_message(
        &self,
        msg: &Message,
    ) {
        let item = BatchedMessage::received(msg, BatchedMessage::now_millis());
        let flushed = self.buffer.lock().push(item);
        if let Some(batch) = flushed {
            self.emit(batch, FlushReason::HighWater);
        }
    }

    fn on_tick(&self) {
        let flushed = self.buffer.lock().take();
        if let Some(batch) = flushed {
            self.emit(batch, FlushReason::Tick);
        }
    }

    fn emit(
        &self,
        batch: Vec<BatchedMessage>,
        reason: FlushReason,
    ) {
        if self.stop.is_cancelled() {
            return;
        }
        trace!(
            event = %self.event_name,
            batch_len = batch.len(),
            reason = reason.as_str(),
            "emitting batch"
        );
        self.sink.emit(&self.event_name, batch);
    }
}
