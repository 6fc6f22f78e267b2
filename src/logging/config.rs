use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Формат вывода логов.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Файловый приёмник логов (ежедневная ротация).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLogConfig {
    pub dir: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub prefix: String,
}

/// Конфигурация логирования.
///
/// `level` принимает либо уровень (`info`, `debug`, ...), либо готовую
/// директиву `EnvFilter` (`pubsub_bridge=trace,warn`). Переменная
/// `RUST_LOG`, если задана, имеет приоритет.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub file: Option<FileLogConfig>,
}

fn default_file_prefix() -> String {
    "pubsub-bridge.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: true,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Директива фильтра: голый уровень применяется к крейту, всё остальное
    /// ограничивается `warn`.
    pub fn build_filter_directive(&self) -> String {
        let level = self.level.trim();
        if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("warn,pubsub_bridge={level}")
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("logging.level must not be empty".to_string());
        }
        if let Some(file) = &self.file {
            if file.prefix.trim().is_empty() {
                return Err("logging.file.prefix must not be empty".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_is_scoped_to_crate() {
        let cfg = LoggingConfig {
            level: "debug".into(),
            ..Default::default()
        };
        assert_eq!(cfg.build_filter_directive(), "warn,pubsub_bridge=debug");
    }

    #[test]
    fn test_full_directive_is_kept() {
        let cfg = LoggingConfig {
            level: "pubsub_bridge::bridge=trace".into(),
            ..Default::default()
        };
        assert_eq!(cfg.build_filter_directive(), "pubsub_bridge::bridge=trace");
    }

    #[test]
    fn test_validate_rejects_blank_values() {
        let blank_level = LoggingConfig {
            level: "  ".into(),
            ..Default::default()
        };
        assert!(blank_level.validate().is_err());

        let blank_prefix = LoggingConfig {
            file: Some(FileLogConfig {
                dir: "logs".into(),
                prefix: String::new(),
            }),
            ..Default::default()
        };
        assert!(blank_prefix.validate().is_err());
        assert!(LoggingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_format_names_are_lowercase() {
        let fmt: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(fmt, LogFormat::Json);
        assert_eq!(serde_json::to_string(&LogFormat::Pretty).unwrap(), "\"pretty\"");
    }
}
