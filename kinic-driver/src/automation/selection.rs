//! 选择策略
//!
//! 每个策略把“选中并复制”描述成一串输入动作，由编排层逐个执行。
//! 策略只负责动作本身，是否成功交给提取校验器判断。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{AutomationError, AutomationResult};
use crate::input::{KeyStroke, ScreenPoint};
use crate::state::config::SelectionConfig;

/// 一个输入动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Click(ScreenPoint),
    MultiClick {
        point: ScreenPoint,
        count: u32,
        interval: Duration,
    },
    Drag {
        from: ScreenPoint,
        to: ScreenPoint,
    },
    Key(KeyStroke),
    /// 动作之间的等待
    Pause(Duration),
}

/// 选择并复制的策略
pub trait SelectionStrategy {
    fn name(&self) -> &'static str;

    /// 按顺序执行的输入动作，最后一个动作应当把内容放进剪贴板
    fn plan(&self) -> Vec<InputAction>;
}

/// 策略类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MultiClick,
    SelectAll,
    DragSelect,
    ContextMenuLink,
    FocusedCopy,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MultiClick => "multi_click",
            Self::SelectAll => "select_all",
            Self::DragSelect => "drag_select",
            Self::ContextMenuLink => "context_menu_link",
            Self::FocusedCopy => "focused_copy",
        }
    }

    /// 是否需要回答区域坐标
    pub fn needs_anchor(&self) -> bool {
        matches!(self, Self::MultiClick | Self::SelectAll | Self::DragSelect)
    }

    /// 构造策略
    ///
    /// # Errors
    ///
    /// 策略需要回答区域坐标但 `anchor` 为 `None` 时返回 `AutomationError::Configuration`
    pub fn build(
        &self,
        config: &SelectionConfig,
        anchor: Option<ScreenPoint>,
    ) -> AutomationResult<Box<dyn SelectionStrategy>> {
        let require_anchor = || {
            anchor.ok_or_else(|| {
                AutomationError::Configuration(format!(
                    "Strategy {} needs a calibrated response area",
                    self.name()
                ))
            })
        };

        let strategy: Box<dyn SelectionStrategy> = match self {
            Self::MultiClick => Box::new(MultiClickCopy {
                anchor: require_anchor()?,
                count: config.multi_click_count.max(2),
                interval: Duration::from_millis(config.multi_click_interval_ms),
            }),
            Self::SelectAll => Box::new(SelectAllCopy {
                anchor: require_anchor()?,
            }),
            Self::DragSelect => Box::new(DragSelectCopy {
                anchor: require_anchor()?,
                dx: config.drag_dx,
                dy: config.drag_dy,
            }),
            Self::ContextMenuLink => Box::new(ContextMenuLink {
                downs: config.context_menu_downs,
            }),
            Self::FocusedCopy => Box::new(FocusedCopy),
        };

        Ok(strategy)
    }
}

/// 菜单弹出或选区建立后的等待
const SELECTION_SETTLE: Duration = Duration::from_millis(150);

/// 在回答区域快速连击选中段落
pub struct MultiClickCopy {
    anchor: ScreenPoint,
    count: u32,
    interval: Duration,
}

impl SelectionStrategy for MultiClickCopy {
    fn name(&self) -> &'static str {
        StrategyKind::MultiClick.name()
    }

    fn plan(&self) -> Vec<InputAction> {
        vec![
            InputAction::MultiClick {
                point: self.anchor,
                count: self.count,
                interval: self.interval,
            },
            InputAction::Pause(SELECTION_SETTLE),
            InputAction::Key(KeyStroke::Copy),
        ]
    }
}

/// 点击回答区域后全选
pub struct SelectAllCopy {
    anchor: ScreenPoint,
}

impl SelectionStrategy for SelectAllCopy {
    fn name(&self) -> &'static str {
        StrategyKind::SelectAll.name()
    }

    fn plan(&self) -> Vec<InputAction> {
        vec![
            InputAction::Click(self.anchor),
            InputAction::Pause(SELECTION_SETTLE),
            InputAction::Key(KeyStroke::SelectAll),
            InputAction::Key(KeyStroke::Copy),
        ]
    }
}

/// 从回答区域按固定偏移拖选
pub struct DragSelectCopy {
    anchor: ScreenPoint,
    dx: i32,
    dy: i32,
}

impl SelectionStrategy for DragSelectCopy {
    fn name(&self) -> &'static str {
        StrategyKind::DragSelect.name()
    }

    fn plan(&self) -> Vec<InputAction> {
        vec![
            InputAction::Drag {
                from: self.anchor,
                to: self.anchor.offset(self.dx, self.dy),
            },
            InputAction::Pause(SELECTION_SETTLE),
            InputAction::Key(KeyStroke::Copy),
        ]
    }
}

/// 在获得焦点的链接上打开上下文菜单，选择“复制链接地址”
pub struct ContextMenuLink {
    downs: u32,
}

impl SelectionStrategy for ContextMenuLink {
    fn name(&self) -> &'static str {
        StrategyKind::ContextMenuLink.name()
    }

    fn plan(&self) -> Vec<InputAction> {
        let mut actions = vec![
            InputAction::Key(KeyStroke::ContextMenu),
            InputAction::Pause(SELECTION_SETTLE),
        ];
        actions.extend((0..self.downs).map(|_| InputAction::Key(KeyStroke::ArrowDown)));
        actions.push(InputAction::Key(KeyStroke::Enter));
        actions
    }
}

/// 直接复制当前焦点
pub struct FocusedCopy;

impl SelectionStrategy for FocusedCopy {
    fn name(&self) -> &'static str {
        StrategyKind::FocusedCopy.name()
    }

    fn plan(&self) -> Vec<InputAction> {
        vec![InputAction::Key(KeyStroke::Copy)]
    }
}
