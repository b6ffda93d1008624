//! 键盘模拟模块
//!
//! 提供驱动扩展界面所需的按键与组合键模拟
//!
//! # 功能
//!
//! - 单键：Escape、Tab、Enter、方向键
//! - 组合键：Shift+Tab、Shift+F10（上下文菜单）、复制、全选
//! - 文本输入：逐字符模拟键盘输入搜索词
//!
//! # 使用示例
//!
//! ```ignore
//! use kinic_driver_lib::input::{KeyboardSimulator, KeyStroke};
//!
//! let mut keyboard = KeyboardSimulator::new()?;
//! keyboard.stroke(KeyStroke::Escape)?;
//! keyboard.type_text("rust async")?;
//! keyboard.stroke(KeyStroke::Enter)?;
//! ```
//!
//! # 平台支持
//!
//! | 平台 | 主修饰键 | 备注 |
//! |------|----------|------|
//! | Windows | Ctrl | 无需特殊权限 |
//! | macOS | Cmd | 需要辅助功能权限 |
//! | Linux (X11) | Ctrl | 需要 X11 |
//! | Linux (Wayland) | Ctrl | 受限支持 |

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use serde::{Deserialize, Serialize};

use super::error::{InputError, InputResult};

/// 编排中使用的按键动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStroke {
    /// 取消键，关闭浮层或菜单
    Escape,
    /// 焦点前移
    Tab,
    /// 焦点后移
    ShiftTab,
    /// 提交
    Enter,
    /// 菜单项下移
    ArrowDown,
    /// 打开上下文菜单 (Shift+F10)
    ContextMenu,
    /// 复制 (Ctrl+C / Cmd+C)
    Copy,
    /// 全选 (Ctrl+A / Cmd+A)
    SelectAll,
}

impl KeyStroke {
    /// 获取按键名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Escape => "escape",
            Self::Tab => "tab",
            Self::ShiftTab => "shift+tab",
            Self::Enter => "enter",
            Self::ArrowDown => "down",
            Self::ContextMenu => "shift+f10",
            Self::Copy => "copy",
            Self::SelectAll => "select_all",
        }
    }

    /// 是否需要修饰键
    pub fn is_chord(&self) -> bool {
        matches!(
            self,
            Self::ShiftTab | Self::ContextMenu | Self::Copy | Self::SelectAll
        )
    }
}

/// 当前平台的主修饰键
///
/// macOS 使用 Cmd，其余平台使用 Ctrl
pub fn primary_modifier() -> Key {
    #[cfg(target_os = "macos")]
    {
        Key::Meta
    }

    #[cfg(not(target_os = "macos"))]
    {
        Key::Control
    }
}

/// 键盘模拟器
///
/// 封装 enigo 库，提供跨平台的键盘模拟功能
pub struct KeyboardSimulator {
    /// enigo 实例
    enigo: Enigo,
}

impl KeyboardSimulator {
    /// 创建新的键盘模拟器
    ///
    /// # Errors
    ///
    /// - `InputError::KeyboardSimulationFailed` - 初始化失败
    pub fn new() -> InputResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            InputError::KeyboardSimulationFailed(format!("Failed to initialize: {}", e))
        })?;

        tracing::debug!("Keyboard simulator initialized");

        Ok(Self { enigo })
    }

    /// 发送一个按键动作
    ///
    /// # Errors
    ///
    /// - `InputError::KeyboardSimulationFailed` - 按键失败
    pub fn stroke(&mut self, stroke: KeyStroke) -> InputResult<()> {
        tracing::debug!(key = stroke.name(), "Sending key stroke");

        match stroke {
            KeyStroke::Escape => self.click_key(Key::Escape),
            KeyStroke::Tab => self.click_key(Key::Tab),
            KeyStroke::Enter => self.click_key(Key::Return),
            KeyStroke::ArrowDown => self.click_key(Key::DownArrow),
            KeyStroke::ShiftTab => self.chord(Key::Shift, Key::Tab),
            KeyStroke::ContextMenu => self.chord(Key::Shift, Key::F10),
            KeyStroke::Copy => self.chord(primary_modifier(), Key::Unicode('c')),
            KeyStroke::SelectAll => self.chord(primary_modifier(), Key::Unicode('a')),
        }
    }

    /// 输入文本
    ///
    /// # 注意
    ///
    /// 输入过程中用户移动焦点会导致文本进入错误的窗口
    pub fn type_text(&mut self, text: &str) -> InputResult<()> {
        if text.is_empty() {
            return Ok(());
        }

        tracing::debug!(text_len = text.len(), "Typing text");

        self.enigo
            .text(text)
            .map_err(|e| InputError::KeyboardSimulationFailed(format!("Failed to type text: {}", e)))
    }

    /// 按住修饰键点击目标键
    ///
    /// 目标键失败时仍会尝试释放修饰键，避免修饰键卡住
    fn chord(&mut self, modifier: Key, key: Key) -> InputResult<()> {
        self.press_key(modifier)?;

        let clicked = self.click_key(key);
        let released = self.release_key(modifier);

        clicked.and(released)
    }

    /// 按下单个按键
    pub fn press_key(&mut self, key: Key) -> InputResult<()> {
        self.enigo
            .key(key, Direction::Press)
            .map_err(|e| InputError::KeyboardSimulationFailed(format!("Failed to press key: {}", e)))
    }

    /// 释放单个按键
    pub fn release_key(&mut self, key: Key) -> InputResult<()> {
        self.enigo
            .key(key, Direction::Release)
            .map_err(|e| InputError::KeyboardSimulationFailed(format!("Failed to release key: {}", e)))
    }

    /// 点击单个按键（按下并释放）
    pub fn click_key(&mut self, key: Key) -> InputResult<()> {
        self.enigo
            .key(key, Direction::Click)
            .map_err(|e| InputError::KeyboardSimulationFailed(format!("Failed to click key: {}", e)))
    }
}
