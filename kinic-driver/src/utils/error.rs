//! 全局错误处理模块
//!
//! 提供统一的应用错误类型和用户友好的错误消息
//!
//! # 功能
//!
//! - 统一的 `AppError` 类型，聚合所有模块错误
//! - 用户友好的错误消息
//! - 错误代码用于调用方处理
//! - 错误恢复建议
//!
//! # 使用示例
//!
//! ```
//! use kinic_driver_lib::utils::error::{AppError, ErrorCode};
//! use kinic_driver_lib::input::InputError;
//!
//! let err = AppError::from(InputError::PermissionDenied);
//! assert_eq!(err.code(), ErrorCode::InputPermissionDenied);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::automation::error::AutomationError;
use crate::input::error::InputError;
use crate::state::config::ConfigError;

/// 应用错误类型
///
/// 聚合所有模块的错误类型，提供统一的错误处理接口
#[derive(Error, Debug)]
pub enum AppError {
    /// 输入错误
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 编排错误
    #[error("Automation error: {0}")]
    Automation(#[from] AutomationError),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 错误代码
///
/// 调用方按代码识别错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // 输入错误
    /// 权限被拒绝
    InputPermissionDenied,
    /// 找不到宿主窗口
    InputTargetWindowNotFound,
    /// 无法切换到前台
    InputFocusFailed,
    /// 键鼠模拟失败
    InputInjectionFailed,
    /// 剪贴板操作失败
    InputClipboardFailed,
    /// 平台不支持
    InputPlatformUnsupported,

    // 配置错误
    /// 配置文件读写失败
    ConfigIoFailed,
    /// 配置无效
    ConfigInvalid,
    /// 找不到配置目录
    ConfigPathUnavailable,

    // 编排错误
    /// 前置条件不满足
    AutomationPrecondition,
    /// 宿主窗口无法切到前台
    AutomationFocusFailed,
    /// 注入失败
    AutomationInputInjection,
    /// 界面未到达预期状态
    AutomationTiming,
    /// 捕获内容被拒绝
    AutomationExtraction,
    /// 未校准
    AutomationNotCalibrated,
    /// 桌面忙碌
    AutomationBusy,

    // 通用错误
    /// 内部错误
    InternalError,
}

/// 错误上下文信息
///
/// 提供用户友好的错误信息和恢复建议
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// 错误代码
    pub code: ErrorCode,
    /// 用户友好的错误消息
    pub message: String,
    /// 详细错误信息（用于日志）
    pub detail: Option<String>,
    /// 恢复建议
    pub recovery_hint: Option<String>,
    /// 是否可恢复
    pub recoverable: bool,
}

impl ErrorContext {
    /// 创建新的错误上下文
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
            recovery_hint: None,
            recoverable: true,
        }
    }

    /// 设置详细信息
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// 设置恢复建议
    pub fn with_recovery_hint(mut self, hint: impl Into<String>) -> Self {
        self.recovery_hint = Some(hint.into());
        self
    }

    /// 标记为不可恢复
    pub fn not_recoverable(mut self) -> Self {
        self.recoverable = false;
        self
    }
}

impl AppError {
    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            // 输入错误
            AppError::Input(InputError::PermissionDenied) => ErrorCode::InputPermissionDenied,
            AppError::Input(InputError::TargetWindowNotFound(_)) => {
                ErrorCode::InputTargetWindowNotFound
            }
            AppError::Input(InputError::FocusFailed(_))
            | AppError::Input(InputError::WindowDetectionFailed(_)) => ErrorCode::InputFocusFailed,
            AppError::Input(InputError::ClipboardFailed(_)) => ErrorCode::InputClipboardFailed,
            AppError::Input(InputError::PlatformNotSupported(_)) => {
                ErrorCode::InputPlatformUnsupported
            }
            AppError::Input(_) => ErrorCode::InputInjectionFailed,

            // 配置错误
            AppError::Config(ConfigError::Io(_)) => ErrorCode::ConfigIoFailed,
            AppError::Config(ConfigError::Json(_)) => ErrorCode::ConfigInvalid,
            AppError::Config(ConfigError::Path(_)) => ErrorCode::ConfigPathUnavailable,

            // 编排错误
            AppError::Automation(AutomationError::Precondition(_)) => {
                ErrorCode::AutomationPrecondition
            }
            AppError::Automation(AutomationError::Focus { .. }) => ErrorCode::AutomationFocusFailed,
            AppError::Automation(AutomationError::InputInjection { .. }) => {
                ErrorCode::AutomationInputInjection
            }
            AppError::Automation(AutomationError::Timing { .. }) => ErrorCode::AutomationTiming,
            AppError::Automation(AutomationError::Extraction { .. }) => {
                ErrorCode::AutomationExtraction
            }
            AppError::Automation(AutomationError::Configuration(_)) => {
                ErrorCode::AutomationNotCalibrated
            }
            AppError::Automation(AutomationError::Busy { .. }) => ErrorCode::AutomationBusy,

            // 通用错误
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// 获取用户友好的错误消息
    pub fn user_message(&self) -> String {
        match self {
            // 输入错误
            AppError::Input(InputError::PermissionDenied) => {
                "需要辅助功能权限才能模拟键盘和鼠标".to_string()
            }
            AppError::Input(InputError::TargetWindowNotFound(_)) => {
                "找不到浏览器窗口".to_string()
            }
            AppError::Input(InputError::FocusFailed(_))
            | AppError::Input(InputError::WindowDetectionFailed(_)) => {
                "无法把浏览器窗口切换到前台".to_string()
            }
            AppError::Input(InputError::ClipboardFailed(_)) => "剪贴板操作失败".to_string(),
            AppError::Input(InputError::PlatformNotSupported(_)) => {
                "当前系统不支持此功能".to_string()
            }
            AppError::Input(_) => "键盘或鼠标模拟失败".to_string(),

            // 配置错误
            AppError::Config(ConfigError::Io(_)) => "无法读写配置文件".to_string(),
            AppError::Config(ConfigError::Json(_)) => "配置文件格式错误".to_string(),
            AppError::Config(ConfigError::Path(_)) => "找不到配置目录".to_string(),

            // 编排错误
            AppError::Automation(AutomationError::Precondition(_)) => {
                "操作未开始：前置条件不满足".to_string()
            }
            AppError::Automation(AutomationError::Focus { .. }) => {
                "操作未开始：无法把浏览器窗口切换到前台".to_string()
            }
            AppError::Automation(AutomationError::InputInjection { step, .. }) => {
                format!("在步骤 {} 模拟输入失败", step)
            }
            AppError::Automation(AutomationError::Timing { step, .. }) => {
                format!("在步骤 {} 等待界面响应超时", step)
            }
            AppError::Automation(AutomationError::Extraction { .. }) => {
                "未能捕获有效内容".to_string()
            }
            AppError::Automation(AutomationError::Configuration(_)) => {
                "坐标尚未校准".to_string()
            }
            AppError::Automation(AutomationError::Busy { .. }) => {
                "已有操作在执行".to_string()
            }

            // 通用错误
            AppError::Internal(msg) => format!("内部错误: {}", msg),
        }
    }

    /// 获取完整的错误上下文
    pub fn context(&self) -> ErrorContext {
        let mut ctx = ErrorContext::new(self.code(), self.user_message()).with_detail(self.to_string());

        ctx.recovery_hint = self.recovery_hint();

        if !self.is_recoverable() {
            ctx = ctx.not_recoverable();
        }

        ctx
    }

    /// 获取恢复建议
    pub fn recovery_hint(&self) -> Option<String> {
        match self {
            AppError::Input(InputError::PermissionDenied) => {
                Some("请在系统设置中为终端开启辅助功能权限".to_string())
            }
            AppError::Input(InputError::TargetWindowNotFound(_)) => {
                Some("请先打开 Chrome，或在 settings.json 中调整 target.app_names".to_string())
            }
            AppError::Config(ConfigError::Json(_)) => {
                Some("请修正 settings.json 的格式，或删除它以使用默认值".to_string())
            }
            AppError::Automation(e) => Some(e.recovery_hint().to_string()),
            _ => None,
        }
    }

    /// 检查错误是否可恢复
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            AppError::Config(_)
                | AppError::Internal(_)
                | AppError::Input(InputError::PlatformNotSupported(_))
        )
    }
}

/// 应用结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 将任意错误转换为内部错误
impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
