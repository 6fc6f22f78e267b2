use crate::BatchedMessage;

/// Приёмник пачек сообщений.
///
/// Вызов fire-and-forget: результат мостом не наблюдается, пачка, которую
/// приёмник не смог доставить, теряется.
pub trait EventSink: Send + Sync {
    fn emit(
        &self,
        event_name: &str,
        batch: Vec<BatchedMessage>,
    );
}
