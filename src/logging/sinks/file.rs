use std::{fs, io};

use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling::daily};
use tracing_subscriber::{layer::Layer as LayerTrait, registry::LookupSpan};

use crate::logging::{
    config::{FileLogConfig, LoggingConfig},
    formatter,
};

/// Файловый слой с ежедневной ротацией.
///
/// Запись идёт через фоновый поток; `WorkerGuard` нужно держать до
/// завершения процесса, иначе хвост логов потеряется.
pub fn layer_with_config<S>(
    config: &LoggingConfig,
    file: &FileLogConfig,
) -> io::Result<(Box<dyn LayerTrait<S> + Send + Sync>, WorkerGuard)>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fs::create_dir_all(&file.dir)?;
    let appender = daily(&file.dir, &file.prefix);
    let (writer, guard) = non_blocking(appender);
    let layer = formatter::build_formatter_from_config(config, writer, false);
    Ok((layer, guard))
}
