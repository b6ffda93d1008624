//! 剪贴板操作模块
//!
//! 剪贴板是唯一的结果通道：扩展界面中的文本只能通过复制读取。
//!
//! # 功能
//!
//! - 读取与写入纯文本
//! - 清空剪贴板，为下一次捕获准备干净的基线
//! - 捕获前后的快照，供提取校验比较
//!
//! # 使用示例
//!
//! ```ignore
//! use kinic_driver_lib::input::ClipboardManager;
//!
//! let mut clipboard = ClipboardManager::new()?;
//! let before = clipboard.read()?;
//! clipboard.clear()?;
//! // 发送复制快捷键...
//! let captured = clipboard.read()?;
//! ```

use arboard::Clipboard;
use tokio::time::Instant;

use super::error::{InputError, InputResult};

/// 某一时刻的剪贴板文本
///
/// 捕获前后各取一次快照，用于判断复制是否真正发生
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    /// 剪贴板文本，`None` 表示为空或不是文本
    pub text: Option<String>,
    /// 快照时间
    pub captured_at: Instant,
}

impl ClipboardSnapshot {
    pub fn new(text: Option<String>) -> Self {
        Self {
            text,
            captured_at: Instant::now(),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// 系统剪贴板管理器
///
/// 封装 arboard，非文本内容按空处理
pub struct ClipboardManager {
    clipboard: Clipboard,
}

impl ClipboardManager {
    /// 打开系统剪贴板
    ///
    /// # Errors
    ///
    /// - `InputError::ClipboardFailed` - 无法访问剪贴板（如无显示服务器）
    pub fn new() -> InputResult<Self> {
        let clipboard = Clipboard::new()
            .map_err(|e| InputError::ClipboardFailed(format!("Failed to open: {}", e)))?;

        Ok(Self { clipboard })
    }

    /// 读取剪贴板文本
    ///
    /// 剪贴板为空或内容不是文本时返回 `Ok(None)`
    pub fn read(&mut self) -> InputResult<Option<String>> {
        match self.clipboard.get_text() {
            Ok(text) => {
                tracing::debug!(text_len = text.len(), "Read clipboard");
                Ok(Some(text))
            }
            Err(arboard::Error::ContentNotAvailable) => {
                tracing::debug!("Clipboard is empty");
                Ok(None)
            }
            Err(e) => Err(InputError::ClipboardFailed(format!("Failed to read: {}", e))),
        }
    }

    /// 写入文本
    pub fn write(&mut self, text: &str) -> InputResult<()> {
        tracing::debug!(text_len = text.len(), "Writing to clipboard");

        self.clipboard
            .set_text(text)
            .map_err(|e| InputError::ClipboardFailed(format!("Failed to write: {}", e)))
    }

    /// 清空剪贴板
    pub fn clear(&mut self) -> InputResult<()> {
        tracing::debug!("Clearing clipboard");

        self.clipboard
            .clear()
            .map_err(|e| InputError::ClipboardFailed(format!("Failed to clear: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_text() {
        let snapshot = ClipboardSnapshot::new(Some("hello".to_string()));
        assert_eq!(snapshot.text(), Some("hello"));
        assert_eq!(ClipboardSnapshot::new(None).text(), None);
    }

    #[test]
    fn test_clipboard_manager_new() {
        // 无显示服务器时打开失败，错误类型必须是剪贴板错误
        if let Err(e) = ClipboardManager::new() {
            assert!(matches!(e, InputError::ClipboardFailed(_)));
        }
    }
}
