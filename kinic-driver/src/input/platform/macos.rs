//! macOS 平台特定实现
//!
//! 模拟键盘鼠标和读取其他应用的窗口都需要辅助功能权限。
//! 前台切换通过 System Events 按进程 ID 设置 `frontmost`。

#![cfg(target_os = "macos")]

use std::process::Command;

use crate::input::error::{InputError, InputResult};

/// 检查辅助功能权限，不弹出对话框
pub fn check_accessibility_permission() -> bool {
    macos_accessibility_client::accessibility::application_is_trusted()
}

/// 请求辅助功能权限
///
/// 未被信任时显示系统对话框，授权后需要重启进程才能生效
pub fn request_accessibility_permission() -> bool {
    macos_accessibility_client::accessibility::application_is_trusted_with_prompt()
}

/// 将进程切换到前台
///
/// # Errors
///
/// - `InputError::FocusFailed` - osascript 执行失败
pub fn activate_process(process_id: u32) -> InputResult<()> {
    let script = format!(
        r#"tell application "System Events" to set frontmost of (first process whose unix id is {}) to true"#,
        process_id
    );

    let output = Command::new("osascript")
        .arg("-e")
        .arg(&script)
        .output()
        .map_err(|e| InputError::FocusFailed(e.to_string()))?;

    if !output.status.success() {
        return Err(InputError::FocusFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(())
}
