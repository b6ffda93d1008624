//! 桌面抽象模块
//!
//! 编排层只通过这里的三个 trait 接触操作系统：
//!
//! | trait | 职责 | 系统实现 |
//! |-------|------|----------|
//! | [`InputInjector`] | 指针与按键 | enigo |
//! | [`ClipboardBridge`] | 剪贴板 | arboard |
//! | [`FocusManager`] | 宿主窗口前台 | x-win + 平台命令 |
//!
//! [`Desktop`] 把三者组合成一个独占资源，由请求串行器持有。
//! 测试用脚本化的假桌面替换 [`SystemDesktop`]。

use std::time::Duration;

use super::clipboard::{ClipboardManager, ClipboardSnapshot};
use super::error::InputResult;
use super::keyboard::{KeyStroke, KeyboardSimulator};
use super::mouse::{MouseSimulator, ScreenPoint};
use super::window::{self, TargetWindow, WindowFocusManager, WindowInfo};

/// 指针与键盘注入
pub trait InputInjector {
    /// 在坐标处单击
    fn click(&mut self, point: ScreenPoint) -> InputResult<()>;

    /// 在坐标处连击
    fn multi_click(&mut self, point: ScreenPoint, count: u32, interval: Duration)
        -> InputResult<()>;

    /// 按住左键从 `from` 拖到 `to`
    fn drag(&mut self, from: ScreenPoint, to: ScreenPoint) -> InputResult<()>;

    /// 发送按键动作
    fn key(&mut self, stroke: KeyStroke) -> InputResult<()>;

    /// 输入文本
    fn type_text(&mut self, text: &str) -> InputResult<()>;
}

/// 剪贴板读写
pub trait ClipboardBridge {
    /// 读取文本，空或非文本返回 `None`
    fn read_text(&mut self) -> InputResult<Option<String>>;

    fn write_text(&mut self, text: &str) -> InputResult<()>;

    fn clear(&mut self) -> InputResult<()>;

    /// 读取并打上时间戳
    fn snapshot(&mut self) -> InputResult<ClipboardSnapshot> {
        Ok(ClipboardSnapshot::new(self.read_text()?))
    }
}

/// 宿主窗口焦点
pub trait FocusManager {
    /// 请求把宿主窗口切到前台，返回该窗口
    ///
    /// 不阻塞等待切换完成，调用方通过 [`FocusManager::foreground`] 确认
    fn request_focus(&mut self) -> InputResult<WindowInfo>;

    /// 当前前台窗口，检测不到时返回 `None`
    fn foreground(&mut self) -> InputResult<Option<WindowInfo>>;
}

/// 独占的桌面资源
pub trait Desktop {
    fn injector(&mut self) -> &mut dyn InputInjector;

    fn clipboard(&mut self) -> &mut dyn ClipboardBridge;

    fn focus(&mut self) -> &mut dyn FocusManager;
}

/// 基于 enigo 的注入器
pub struct SystemInjector {
    keyboard: KeyboardSimulator,
    mouse: MouseSimulator,
}

impl SystemInjector {
    pub fn new() -> InputResult<Self> {
        Ok(Self {
            keyboard: KeyboardSimulator::new()?,
            mouse: MouseSimulator::new()?,
        })
    }
}

impl InputInjector for SystemInjector {
    fn click(&mut self, point: ScreenPoint) -> InputResult<()> {
        self.mouse.click_at(point)
    }

    fn multi_click(
        &mut self,
        point: ScreenPoint,
        count: u32,
        interval: Duration,
    ) -> InputResult<()> {
        self.mouse.multi_click_at(point, count, interval)
    }

    fn drag(&mut self, from: ScreenPoint, to: ScreenPoint) -> InputResult<()> {
        self.mouse.drag(from, to)
    }

    fn key(&mut self, stroke: KeyStroke) -> InputResult<()> {
        self.keyboard.stroke(stroke)
    }

    fn type_text(&mut self, text: &str) -> InputResult<()> {
        self.keyboard.type_text(text)
    }
}

impl ClipboardBridge for ClipboardManager {
    fn read_text(&mut self) -> InputResult<Option<String>> {
        self.read()
    }

    fn write_text(&mut self, text: &str) -> InputResult<()> {
        self.write(text)
    }

    fn clear(&mut self) -> InputResult<()> {
        ClipboardManager::clear(self)
    }
}

impl FocusManager for WindowFocusManager {
    fn request_focus(&mut self) -> InputResult<WindowInfo> {
        WindowFocusManager::request_focus(self)
    }

    fn foreground(&mut self) -> InputResult<Option<WindowInfo>> {
        Ok(window::get_focused_window().ok())
    }
}

/// 真实桌面
pub struct SystemDesktop {
    injector: SystemInjector,
    clipboard: ClipboardManager,
    focus: WindowFocusManager,
}

impl SystemDesktop {
    /// 初始化输入、剪贴板和焦点管理
    ///
    /// # Arguments
    ///
    /// * `target` - 宿主窗口匹配规则
    ///
    /// # Errors
    ///
    /// 任一系统组件初始化失败时返回对应的 `InputError`
    pub fn new(target: TargetWindow) -> InputResult<Self> {
        let desktop = Self {
            injector: SystemInjector::new()?,
            clipboard: ClipboardManager::new()?,
            focus: WindowFocusManager::new(target),
        };

        tracing::info!(target = %desktop.focus.target().describe(), "System desktop ready");

        Ok(desktop)
    }
}

impl Desktop for SystemDesktop {
    fn injector(&mut self) -> &mut dyn InputInjector {
        &mut self.injector
    }

    fn clipboard(&mut self) -> &mut dyn ClipboardBridge {
        &mut self.clipboard
    }

    fn focus(&mut self) -> &mut dyn FocusManager {
        &mut self.focus
    }
}
