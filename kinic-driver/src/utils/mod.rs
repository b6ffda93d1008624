//! 工具模块：日志初始化与全局错误类型

/// Logging utilities
pub mod logging;

/// Global error handling
pub mod error;

pub use error::{AppError, AppResult, ErrorCode, ErrorContext};
pub use logging::init_logging;
