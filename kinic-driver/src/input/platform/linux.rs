//! Linux 平台特定实现
//!
//! # 显示服务器
//!
//! - X11: XTest 注入与 EWMH 窗口激活都可用
//! - Wayland: 合成器禁止外部程序注入输入和抢占焦点，只能通过 XWayland 部分工作
//!
//! # 窗口激活
//!
//! 优先使用 `wmctrl -i -a`，不存在时退回 `xdotool windowactivate`

#![cfg(target_os = "linux")]

use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::input::error::{InputError, InputResult};

/// 显示服务器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayServer {
    X11,
    Wayland,
    Unknown,
}

impl DisplayServer {
    pub fn name(&self) -> &'static str {
        match self {
            DisplayServer::X11 => "X11",
            DisplayServer::Wayland => "Wayland",
            DisplayServer::Unknown => "Unknown",
        }
    }

    /// 是否支持键盘与鼠标模拟
    pub fn supports_input_simulation(&self) -> bool {
        matches!(self, DisplayServer::X11)
    }

    /// 是否能激活其他应用的窗口
    pub fn supports_window_activation(&self) -> bool {
        matches!(self, DisplayServer::X11)
    }
}

/// 检测当前显示服务器
///
/// 依次检查 `WAYLAND_DISPLAY`、`XDG_SESSION_TYPE`、`DISPLAY`
pub fn detect_display_server() -> DisplayServer {
    if std::env::var("WAYLAND_DISPLAY").is_ok() {
        return DisplayServer::Wayland;
    }

    if let Ok(session_type) = std::env::var("XDG_SESSION_TYPE") {
        match session_type.to_lowercase().as_str() {
            "wayland" => return DisplayServer::Wayland,
            "x11" => return DisplayServer::X11,
            _ => {}
        }
    }

    if std::env::var("DISPLAY").is_ok() {
        return DisplayServer::X11;
    }

    DisplayServer::Unknown
}

/// 激活指定 X11 窗口
///
/// # Errors
///
/// - `InputError::FocusFailed` - wmctrl 和 xdotool 都不可用或都失败
pub fn activate_window(window_id: u32) -> InputResult<()> {
    let hex_id = format!("0x{:x}", window_id);

    match run_tool("wmctrl", &["-i", "-a", &hex_id]) {
        Ok(()) => return Ok(()),
        Err(e) => tracing::debug!(error = %e, "wmctrl activation failed, trying xdotool"),
    }

    run_tool("xdotool", &["windowactivate", "--sync", &window_id.to_string()])
}

fn run_tool(program: &str, args: &[&str]) -> InputResult<()> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| InputError::FocusFailed(format!("{}: {}", program, e)))?;

    if !output.status.success() {
        return Err(InputError::FocusFailed(format!(
            "{}: {}",
            program,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}
