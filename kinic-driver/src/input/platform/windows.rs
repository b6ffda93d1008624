//! Windows 平台特定实现
//!
//! 前台切换使用 `SetForegroundWindow`。最小化的窗口需要先还原，
//! 否则切到前台后仍不可见，点击会落到其他窗口上。

#![cfg(target_os = "windows")]

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    IsIconic, SW_RESTORE, SetForegroundWindow, ShowWindow,
};

use crate::input::error::{InputError, InputResult};

/// 激活窗口
///
/// # Errors
///
/// - `InputError::FocusFailed` - 系统拒绝切换前台（例如前台锁定）
pub fn activate_window(window_id: u32) -> InputResult<()> {
    let hwnd = HWND(window_id as usize as *mut core::ffi::c_void);

    // SAFETY: hwnd 来自 x-win 枚举的顶层窗口句柄，API 对失效句柄返回失败而非崩溃
    unsafe {
        if IsIconic(hwnd).as_bool() {
            let _ = ShowWindow(hwnd, SW_RESTORE);
        }

        if !SetForegroundWindow(hwnd).as_bool() {
            return Err(InputError::FocusFailed(format!(
                "SetForegroundWindow refused window {:#x}",
                window_id
            )));
        }
    }

    Ok(())
}
