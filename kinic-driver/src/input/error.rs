//! 输入模块错误类型
//!
//! 定义输入注入、剪贴板和窗口焦点相关的错误类型

use thiserror::Error;

/// 输入操作错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// 辅助功能权限被拒绝
    #[error("Accessibility permission denied")]
    PermissionDenied,

    /// 找不到目标宿主窗口
    #[error("Target window not found: {0}")]
    TargetWindowNotFound(String),

    /// 无法将目标窗口切换到前台
    #[error("Failed to focus target window: {0}")]
    FocusFailed(String),

    /// 剪贴板操作失败
    #[error("Clipboard operation failed: {0}")]
    ClipboardFailed(String),

    /// 窗口检测失败
    #[error("Window detection failed: {0}")]
    WindowDetectionFailed(String),

    /// 键盘模拟失败
    #[error("Keyboard simulation failed: {0}")]
    KeyboardSimulationFailed(String),

    /// 鼠标模拟失败
    #[error("Mouse simulation failed: {0}")]
    MouseSimulationFailed(String),

    /// 平台不支持
    #[error("Platform not supported: {0}")]
    PlatformNotSupported(String),
}

impl InputError {
    /// 是否属于焦点类错误
    ///
    /// 焦点错误必须作为前置条件失败上报，而不是普通的注入失败
    pub fn is_focus_error(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::TargetWindowNotFound(_)
                | Self::FocusFailed(_)
                | Self::WindowDetectionFailed(_)
        )
    }
}

/// 输入操作结果类型
pub type InputResult<T> = Result<T, InputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        let error = InputError::TargetWindowNotFound("chrome".to_string());
        assert!(error.to_string().contains("chrome"));

        let error = InputError::PermissionDenied;
        assert!(error.to_string().contains("permission denied"));

        let error = InputError::MouseSimulationFailed("test reason".to_string());
        assert!(error.to_string().contains("test reason"));

        let error = InputError::ClipboardFailed("clipboard error".to_string());
        assert!(error.to_string().contains("clipboard error"));
    }

    #[test]
    fn test_input_error_equality() {
        let error1 = InputError::PermissionDenied;
        let error2 = InputError::PermissionDenied;
        assert_eq!(error1, error2);

        let error3 = InputError::FocusFailed("x".to_string());
        assert_ne!(error1, error3);

        let error4 = InputError::KeyboardSimulationFailed("test".to_string());
        let error5 = InputError::KeyboardSimulationFailed("test".to_string());
        assert_eq!(error4, error5);
    }

    #[test]
    fn test_focus_error_classification() {
        assert!(InputError::PermissionDenied.is_focus_error());
        assert!(InputError::FocusFailed("x".into()).is_focus_error());
        assert!(InputError::TargetWindowNotFound("x".into()).is_focus_error());
        assert!(!InputError::KeyboardSimulationFailed("x".into()).is_focus_error());
        assert!(!InputError::ClipboardFailed("x".into()).is_focus_error());
    }
}
