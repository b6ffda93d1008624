//! 输入模块
//!
//! 对操作系统输入设施的薄封装：键盘鼠标模拟、剪贴板、宿主窗口焦点
//!
//! # 子模块
//!
//! - [`error`] - 错误类型定义
//! - [`keyboard`] - 按键与组合键
//! - [`mouse`] - 点击、连击、拖拽和区域点击
//! - [`clipboard`] - 剪贴板读写与快照
//! - [`window`] - 前台窗口检测与宿主窗口焦点
//! - [`platform`] - 平台能力、权限和前台切换
//! - [`desktop`] - 编排层使用的 trait 与系统实现
//!
//! # 平台支持
//!
//! | 平台 | 窗口焦点 | 输入模拟 | 剪贴板 |
//! |------|----------|----------|--------|
//! | Windows | ✅ | ✅ | ✅ |
//! | macOS | ✅ * | ✅ * | ✅ |
//! | Linux (X11) | ✅ | ✅ | ✅ |
//! | Linux (Wayland) | ⚠️ | ⚠️ | ✅ |
//!
//! * macOS 需要辅助功能权限

pub mod clipboard;
pub mod desktop;
pub mod error;
pub mod keyboard;
pub mod mouse;
pub mod platform;
pub mod window;

pub use clipboard::{ClipboardManager, ClipboardSnapshot};
pub use desktop::{
    ClipboardBridge, Desktop, FocusManager, InputInjector, SystemDesktop, SystemInjector,
};
pub use error::{InputError, InputResult};
pub use keyboard::{KeyStroke, KeyboardSimulator};
pub use mouse::{ClickArea, MouseSimulator, ScreenPoint};
pub use platform::{Platform, PlatformCapabilities};
pub use window::{get_focused_window, TargetWindow, WindowFocusManager, WindowInfo};
