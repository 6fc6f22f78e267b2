use std::fmt;

/// Коды статуса для категоризации ошибок моста.
///
/// # Диапазоны:
/// - 0xxx: Успех
/// - 1xxx: Общие ошибки
/// - 2xxx: Ошибки данных
/// - 6xxx: Сеть / IO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 0xxx: Успех ===
    Success = 0,

    // === 1xxx: Общие ошибки ===
    Internal = 1003,
    InvalidArgs = 1004,
    Unavailable = 1006,

    // === 2xxx: Ошибки данных ===
    NotFound = 2000,

    // === 6xxx: Сеть/IO ===
    ConnectionFailed = 6004,
}

impl StatusCode {
    /// Числовое значение кода.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Является ли код успешным.
    pub fn is_success(self) -> bool {
        matches!(self, StatusCode::Success)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            StatusCode::Success => "Success",
            StatusCode::Internal => "Internal",
            StatusCode::InvalidArgs => "InvalidArgs",
            StatusCode::Unavailable => "Unavailable",
            StatusCode::NotFound => "NotFound",
            StatusCode::ConnectionFailed => "ConnectionFailed",
        };
        write!(f, "{name}({})", self.as_u32())
    }
}
