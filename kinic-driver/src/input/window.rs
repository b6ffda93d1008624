//! 窗口检测与焦点模块
//!
//! 所有基于坐标的输入都要求宿主浏览器窗口处于前台。本模块负责：
//!
//! - 获取当前前台窗口信息
//! - 按应用名称和标题查找宿主窗口
//! - 请求切换到前台（确认与重试由编排器异步完成）
//!
//! # 使用示例
//!
//! ```ignore
//! use kinic_driver_lib::input::window::{TargetWindow, WindowFocusManager};
//!
//! let manager = WindowFocusManager::new(TargetWindow::default());
//! let window = manager.request_focus()?;
//! println!("宿主窗口: {} - {}", window.app_name, window.title);
//! ```
//!
//! # 平台说明
//!
//! - **Windows**: 直接支持
//! - **macOS**: 需要屏幕录制权限才能获取窗口标题
//! - **Linux (X11)**: 直接支持
//! - **Linux (GNOME > 41)**: 需要安装并启用 x-win 扩展

use serde::{Deserialize, Serialize};

use super::error::{InputError, InputResult};
use super::platform;

/// 窗口信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    /// 应用程序名称
    pub app_name: String,
    /// 窗口标题
    pub title: String,
    /// 进程 ID
    pub process_id: u32,
    /// 可执行文件名称
    pub exec_name: String,
    /// 窗口 ID
    pub window_id: u32,
}

impl From<x_win::WindowInfo> for WindowInfo {
    fn from(window: x_win::WindowInfo) -> Self {
        Self {
            app_name: window.info.name,
            title: window.title,
            process_id: window.info.process_id,
            exec_name: window.info.exec_name,
            window_id: window.id,
        }
    }
}

/// 宿主窗口匹配规则
///
/// 应用名称与可执行文件名按不区分大小写的子串匹配，标题过滤可选
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetWindow {
    /// 候选应用名称
    pub app_names: Vec<String>,
    /// 标题必须包含的文本
    pub title_contains: Option<String>,
}

impl Default for TargetWindow {
    fn default() -> Self {
        Self {
            app_names: vec![
                "chrome".to_string(),
                "google chrome".to_string(),
                "chromium".to_string(),
            ],
            title_contains: None,
        }
    }
}

impl TargetWindow {
    /// 判断窗口是否为宿主窗口
    pub fn matches(&self, window: &WindowInfo) -> bool {
        let app = window.app_name.to_lowercase();
        let exec = window.exec_name.to_lowercase();

        let app_matches = self.app_names.iter().any(|name| {
            let name = name.to_lowercase();
            app.contains(&name) || exec.contains(&name)
        });

        let title_matches = match &self.title_contains {
            Some(text) => window.title.to_lowercase().contains(&text.to_lowercase()),
            None => true,
        };

        app_matches && title_matches
    }

    /// 用于日志与错误信息的描述
    pub fn describe(&self) -> String {
        match &self.title_contains {
            Some(title) => format!("{} (title contains '{}')", self.app_names.join("|"), title),
            None => self.app_names.join("|"),
        }
    }
}

/// 获取当前前台窗口
///
/// # Errors
///
/// - `InputError::WindowDetectionFailed` - 窗口检测失败
pub fn get_focused_window() -> InputResult<WindowInfo> {
    match x_win::get_active_window() {
        Ok(active_window) => {
            let info = WindowInfo::from(active_window);

            tracing::debug!(
                app = %info.app_name,
                title = %info.title,
                window_id = info.window_id,
                "Got focused window"
            );

            Ok(info)
        }
        Err(e) => {
            tracing::warn!(error = ?e, "Failed to get active window");
            Err(InputError::WindowDetectionFailed(format!("{:?}", e)))
        }
    }
}

/// 列出所有可见窗口
pub fn list_windows() -> InputResult<Vec<WindowInfo>> {
    x_win::get_open_windows()
        .map(|windows| windows.into_iter().map(WindowInfo::from).collect())
        .map_err(|e| InputError::WindowDetectionFailed(format!("{:?}", e)))
}

/// 宿主窗口焦点管理器
///
/// 只负责发出切换请求，确认前台和重试由调用方按自己的时钟完成
#[derive(Debug, Clone)]
pub struct WindowFocusManager {
    target: TargetWindow,
}

impl WindowFocusManager {
    pub fn new(target: TargetWindow) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &TargetWindow {
        &self.target
    }

    /// 查找宿主窗口
    ///
    /// # Errors
    ///
    /// - `InputError::TargetWindowNotFound` - 没有匹配的窗口
    pub fn find_target(&self) -> InputResult<WindowInfo> {
        list_windows()?
            .into_iter()
            .find(|w| self.target.matches(w))
            .ok_or_else(|| InputError::TargetWindowNotFound(self.target.describe()))
    }

    /// 请求把宿主窗口切到前台
    ///
    /// 已在前台时直接返回当前窗口；否则发出切换请求并立即返回目标窗口，
    /// 不等待窗口管理器完成切换
    ///
    /// # Errors
    ///
    /// - `InputError::PermissionDenied` - 缺少辅助功能权限
    /// - `InputError::TargetWindowNotFound` - 没有匹配的窗口
    /// - `InputError::FocusFailed` - 平台拒绝了切换请求
    pub fn request_focus(&self) -> InputResult<WindowInfo> {
        platform::ensure_input_permission()?;

        if let Ok(current) = get_focused_window()
            && self.target.matches(&current)
        {
            return Ok(current);
        }

        let window = self.find_target()?;
        platform::focus_window(&window)?;
        tracing::debug!(app = %window.app_name, window_id = window.window_id, "Focus requested");

        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(app: &str, title: &str) -> WindowInfo {
        WindowInfo {
            app_name: app.to_string(),
            title: title.to_string(),
            process_id: 42,
            exec_name: String::new(),
            window_id: 7,
        }
    }

    #[test]
    fn test_default_target_matches_chrome() {
        let target = TargetWindow::default();
        assert!(target.matches(&window("Google Chrome", "Docs")));
        assert!(target.matches(&window("chromium-browser", "x")));
        assert!(!target.matches(&window("Firefox", "Docs")));
    }

    #[test]
    fn test_target_matches_exec_name() {
        let target = TargetWindow::default();
        let mut w = window("Browser", "x");
        w.exec_name = "chrome.exe".to_string();
        assert!(target.matches(&w));
    }

    #[test]
    fn test_target_title_filter() {
        let target = TargetWindow {
            app_names: vec!["chrome".to_string()],
            title_contains: Some("Kinic".to_string()),
        };
        assert!(target.matches(&window("Chrome", "kinic - Profile 1")));
        assert!(!target.matches(&window("Chrome", "Inbox")));
        assert!(target.describe().contains("Kinic"));
    }

    #[test]
    fn test_focus_manager_keeps_target() {
        let manager = WindowFocusManager::new(TargetWindow::default());
        assert_eq!(manager.target().app_names, TargetWindow::default().app_names);
    }

    #[test]
    fn test_get_focused_window() {
        // 无头环境中可能失败
        match get_focused_window() {
            Ok(window) => assert!(window.process_id > 0 || window.app_name.is_empty()),
            Err(e) => assert!(matches!(e, InputError::WindowDetectionFailed(_))),
        }
    }
}
