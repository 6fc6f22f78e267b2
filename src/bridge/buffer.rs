use super::BatchedMessage;

/// Причина сброса пачки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// Буфер достиг верхней отметки.
    HighWater,
    /// Сработал периодический таймер.
    Tick,
}

impl FlushReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FlushReason::HighWater => "high_water",
            FlushReason::Tick => "tick",
        }
    }
}

/// Буфер накопления одной подписки.
///
/// Порядок вставки равен порядку получения. Сброс отдаёт накопленное
/// содержимое и оставляет буфер пустым с сохранённой ёмкостью.
#[derive(Debug)]
pub struct BatchBuffer {
    items: Vec<BatchedMessage>,
    high_water_mark: usize,
}

impl BatchBuffer {
    pub fn new(
        capacity: usize,
        high_water_mark: usize,
    ) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            high_water_mark: high_water_mark.max(1),
        }
    }

    /// Добавляет сообщение. Если буфер достиг верхней отметки, возвращает
    /// сброшенную пачку (размер ровно `high_water_mark`).
    pub fn push(
        &mut self,
        msg: BatchedMessage,
    ) -> Option<Vec<BatchedMessage>> {
        self.items.push(msg);
        if self.items.len() >= self.high_water_mark {
            return self.take();
        }
        None
    }

    /// Забирает всё накопленное; `None`, если буфер пуст. Пустых пачек
    /// не бывает.
    pub fn take(&mut self) -> Option<Vec<BatchedMessage>> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.items.drain(..).collect())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }
}
