//! 编排表
//!
//! 三个工作流共用同一个编排器，区别只在这张表里：
//!
//! | 操作 | 字段导航 | 搜索词 | 提交后等待 | 触发回答 | 结果导航 | 结果等待 | 选择策略 |
//! |------|----------|--------|------------|----------|----------|----------|----------|
//! | save | Shift+Tab ×1 | 否 | 保存提交 | - | - | - | - |
//! | search_retrieve | Tab ×4 | 是 | - | - | Tab ×2 | 搜索结果（两级） | 上下文菜单复制链接、复制焦点 |
//! | search_extract | Tab ×4 | 是 | 搜索结果（常规） | Tab ×5 + Enter | - | AI 生成（两级） | 连击、全选、拖选 |
//!
//! 取回链接升级等待后，先 Shift+Tab ×2 退回搜索框再 Tab ×2，重新把焦点放到第一个结果上。
//!
//! `dismiss` 只发送取消键，没有编排表。

use std::time::Duration;

use super::selection::StrategyKind;
use super::timing::{WaitKind, WaitPolicy};
use super::validator::ExpectedContent;
use super::workflow::Operation;
use crate::input::KeyStroke;
use crate::state::config::TimingConfig;

/// 重复按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRepeat {
    pub stroke: KeyStroke,
    pub count: u32,
}

impl KeyRepeat {
    pub const fn new(stroke: KeyStroke, count: u32) -> Self {
        Self { stroke, count }
    }

    /// 反方向的同等导航，只有 Tab 和 Shift+Tab 可以反向
    pub fn reversed(self) -> Option<Self> {
        let stroke = match self.stroke {
            KeyStroke::Tab => KeyStroke::ShiftTab,
            KeyStroke::ShiftTab => KeyStroke::Tab,
            _ => return None,
        };
        Some(Self::new(stroke, self.count))
    }
}

/// 捕获阶段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub wait: WaitKind,
    pub policy: WaitPolicy,
    /// 等待之后、选择之前的焦点导航，升级等待后退回并重新执行
    pub result_navigation: Option<KeyRepeat>,
    /// 按顺序尝试
    pub strategies: Vec<StrategyKind>,
    pub expected: ExpectedContent,
}

/// 单个工作流的编排
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choreography {
    pub operation: Operation,
    /// 打开浮层后到达输入字段
    pub navigation: KeyRepeat,
    pub enter_query: bool,
    /// 提交后的固定等待
    pub post_submit: Option<Duration>,
    /// 触发 AI 回答的导航，之后按 Enter
    pub trigger: Option<KeyRepeat>,
    pub capture: Option<Capture>,
}

impl Choreography {
    /// 取出操作的编排，`dismiss` 返回 `None`
    pub fn for_operation(operation: Operation, timing: &TimingConfig) -> Option<Self> {
        let choreography = match operation {
            Operation::Save => Self {
                operation,
                navigation: KeyRepeat::new(KeyStroke::ShiftTab, 1),
                enter_query: false,
                post_submit: Some(Duration::from_millis(timing.save_commit_ms)),
                trigger: None,
                capture: None,
            },
            Operation::SearchRetrieve => Self {
                operation,
                navigation: KeyRepeat::new(KeyStroke::Tab, 4),
                enter_query: true,
                post_submit: None,
                trigger: None,
                capture: Some(Capture {
                    wait: WaitKind::SearchResults,
                    policy: WaitPolicy::for_kind(WaitKind::SearchResults, timing),
                    result_navigation: Some(KeyRepeat::new(KeyStroke::Tab, 2)),
                    strategies: vec![StrategyKind::ContextMenuLink, StrategyKind::FocusedCopy],
                    expected: ExpectedContent::Url,
                }),
            },
            Operation::SearchExtract => Self {
                operation,
                navigation: KeyRepeat::new(KeyStroke::Tab, 4),
                enter_query: true,
                post_submit: Some(Duration::from_millis(timing.search_typical_ms)),
                trigger: Some(KeyRepeat::new(KeyStroke::Tab, 5)),
                capture: Some(Capture {
                    wait: WaitKind::AiGeneration,
                    policy: WaitPolicy::for_kind(WaitKind::AiGeneration, timing),
                    result_navigation: None,
                    strategies: vec![
                        StrategyKind::MultiClick,
                        StrategyKind::SelectAll,
                        StrategyKind::DragSelect,
                    ],
                    expected: ExpectedContent::AnswerText,
                }),
            },
            Operation::Dismiss => return None,
        };

        Some(choreography)
    }

    /// 是否会改写剪贴板
    pub fn touches_clipboard(&self) -> bool {
        self.capture.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_choreography() {
        let choreography =
            Choreography::for_operation(Operation::Save, &TimingConfig::default()).unwrap();
        assert_eq!(choreography.navigation, KeyRepeat::new(KeyStroke::ShiftTab, 1));
        assert!(!choreography.enter_query);
        assert!(!choreography.touches_clipboard());
    }

    #[test]
    fn test_retrieve_choreography() {
        let choreography =
            Choreography::for_operation(Operation::SearchRetrieve, &TimingConfig::default())
                .unwrap();
        let capture = choreography.capture.as_ref().unwrap();

        assert_eq!(capture.expected, ExpectedContent::Url);
        assert_eq!(capture.result_navigation, Some(KeyRepeat::new(KeyStroke::Tab, 2)));
        assert_eq!(capture.strategies[0], StrategyKind::ContextMenuLink);
    }

    #[test]
    fn test_extract_choreography() {
        let timing = TimingConfig::default();
        let choreography = Choreography::for_operation(Operation::SearchExtract, &timing).unwrap();

        assert_eq!(choreography.trigger, Some(KeyRepeat::new(KeyStroke::Tab, 5)));
        assert_eq!(
            choreography.post_submit,
            Some(Duration::from_millis(timing.search_typical_ms))
        );
        assert_eq!(choreography.capture.unwrap().wait, WaitKind::AiGeneration);
    }

    #[test]
    fn test_result_navigation_reverses() {
        let forward = KeyRepeat::new(KeyStroke::Tab, 2);
        assert_eq!(forward.reversed(), Some(KeyRepeat::new(KeyStroke::ShiftTab, 2)));
        assert_eq!(KeyRepeat::new(KeyStroke::Enter, 1).reversed(), None);
    }

    #[test]
    fn test_dismiss_has_no_choreography() {
        assert!(Choreography::for_operation(Operation::Dismiss, &TimingConfig::default()).is_none());
    }
}
