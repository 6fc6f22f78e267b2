pub mod bridge;
pub mod recv;
pub mod status_code;

// Публичный экспорт всех типов ошибок из вложенных модулей, чтобы
// упростить доступ к ним из внешнего кода.
pub use bridge::{BridgeError, BridgeResult};
pub use recv::RecvError;
pub use status_code::StatusCode;
