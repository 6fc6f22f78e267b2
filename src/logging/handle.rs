use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;

/// Handle системы логирования.
///
/// Держит guard фонового писателя файлового приёмника: при drop'е
/// буфер дописывается на диск.
pub struct LoggingHandle {
    _file_guard: Option<WorkerGuard>,
    file_dir: Option<PathBuf>,
}

impl LoggingHandle {
    pub fn new(
        file_guard: Option<WorkerGuard>,
        file_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            _file_guard: file_guard,
            file_dir,
        }
    }

    pub fn has_file_sink(&self) -> bool {
        self._file_guard.is_some()
    }

    pub fn file_dir(&self) -> Option<&PathBuf> {
        self.file_dir.as_ref()
    }

    /// Завершает логирование, дописывая буферизованные записи.
    pub fn shutdown(self) {
        tracing::info!(file_sink = self.has_file_sink(), "logging shutdown");
        drop(self);
    }
}
