//! 平台特定实现模块
//!
//! 提供跨平台的系统交互功能，包括：
//! - 辅助功能权限检测（macOS）
//! - 显示服务器检测（Linux）
//! - 将指定窗口切换到前台
//!
//! # 架构
//!
//! ```text
//! platform/
//! ├── mod.rs          - 平台抽象和能力查询
//! ├── macos.rs        - osascript 前台切换、辅助功能权限
//! ├── linux.rs        - wmctrl / xdotool 前台切换、显示服务器检测
//! └── windows.rs      - SetForegroundWindow
//! ```

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

use serde::{Deserialize, Serialize};

use super::error::{InputError, InputResult};
use super::window::WindowInfo;

/// 平台类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
    Unknown,
}

impl Platform {
    /// 获取当前平台
    pub fn current() -> Self {
        #[cfg(target_os = "windows")]
        return Platform::Windows;

        #[cfg(target_os = "macos")]
        return Platform::MacOS;

        #[cfg(target_os = "linux")]
        return Platform::Linux;

        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        return Platform::Unknown;
    }

    /// 获取平台名称
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOS => "macOS",
            Platform::Linux => "Linux",
            Platform::Unknown => "Unknown",
        }
    }
}

/// 平台能力
///
/// 由 `config` 子命令输出，便于排查环境问题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformCapabilities {
    pub platform: Platform,
    /// 是否支持键盘与鼠标模拟
    pub input_simulation: bool,
    pub clipboard: bool,
    pub window_detection: bool,
    /// 是否能把指定窗口切到前台
    pub window_focus: bool,
    /// 是否需要辅助功能权限
    pub requires_accessibility: bool,
    /// 显示服务器类型（Linux 专用）
    pub display_server: Option<String>,
}

impl PlatformCapabilities {
    /// 获取当前平台的能力
    pub fn current() -> Self {
        match Platform::current() {
            Platform::Windows => Self::supported(Platform::Windows, false, None),
            Platform::MacOS => Self::supported(Platform::MacOS, true, None),
            Platform::Linux => Self::linux(),
            Platform::Unknown => Self::unknown(),
        }
    }

    fn supported(
        platform: Platform,
        requires_accessibility: bool,
        display_server: Option<String>,
    ) -> Self {
        Self {
            platform,
            input_simulation: true,
            clipboard: true,
            window_detection: true,
            window_focus: true,
            requires_accessibility,
            display_server,
        }
    }

    fn linux() -> Self {
        #[cfg(target_os = "linux")]
        {
            let server = linux::detect_display_server();
            let mut caps = Self::supported(Platform::Linux, false, Some(server.name().to_string()));
            caps.input_simulation = server.supports_input_simulation();
            caps.window_focus = server.supports_window_activation();
            caps
        }

        #[cfg(not(target_os = "linux"))]
        {
            Self::supported(Platform::Linux, false, None)
        }
    }

    fn unknown() -> Self {
        Self {
            platform: Platform::Unknown,
            input_simulation: false,
            clipboard: false,
            window_detection: false,
            window_focus: false,
            requires_accessibility: false,
            display_server: None,
        }
    }
}

/// 权限状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// 已授权
    Granted,
    /// 被拒绝
    Denied,
    /// 不适用（平台不需要此权限）
    NotApplicable,
}

/// 检查辅助功能权限
pub fn check_accessibility_permission() -> PermissionStatus {
    #[cfg(target_os = "macos")]
    {
        if macos::check_accessibility_permission() {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        PermissionStatus::NotApplicable
    }
}

/// 请求辅助功能权限
///
/// 在 macOS 上会显示系统权限请求对话框
pub fn request_accessibility_permission() -> bool {
    #[cfg(target_os = "macos")]
    {
        macos::request_accessibility_permission()
    }

    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}

/// 确认可以注入输入
///
/// # Errors
///
/// - `InputError::PermissionDenied` - macOS 上未授予辅助功能权限
pub fn ensure_input_permission() -> InputResult<()> {
    match check_accessibility_permission() {
        PermissionStatus::Denied => Err(InputError::PermissionDenied),
        PermissionStatus::Granted | PermissionStatus::NotApplicable => Ok(()),
    }
}

/// 将窗口切换到前台
///
/// 只负责发出请求，是否真正获得焦点由调用方通过前台窗口查询确认
///
/// # Errors
///
/// - `InputError::FocusFailed` - 平台命令执行失败
/// - `InputError::PlatformNotSupported` - 当前平台无法切换窗口
pub fn focus_window(window: &WindowInfo) -> InputResult<()> {
    tracing::debug!(
        window_id = window.window_id,
        pid = window.process_id,
        app = %window.app_name,
        "Requesting foreground"
    );

    #[cfg(target_os = "macos")]
    {
        macos::activate_process(window.process_id)
    }

    #[cfg(target_os = "linux")]
    {
        linux::activate_window(window.window_id)
    }

    #[cfg(target_os = "windows")]
    {
        windows::activate_window(window.window_id)
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        Err(InputError::PlatformNotSupported(
            Platform::current().name().to_string(),
        ))
    }
}
