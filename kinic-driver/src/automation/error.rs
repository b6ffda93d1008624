//! 编排错误类型

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validator::Rejection;
use super::workflow::Step;
use crate::input::InputError;

/// 某个选择策略被拒绝的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRejection {
    pub strategy: String,
    #[serde(flatten)]
    pub rejection: Rejection,
}

impl StrategyRejection {
    pub fn new(strategy: &str, rejection: Rejection) -> Self {
        Self {
            strategy: strategy.to_string(),
            rejection,
        }
    }
}

fn describe_rejections(rejections: &[StrategyRejection]) -> String {
    rejections
        .iter()
        .map(|r| format!("{}: {}", r.strategy, r.rejection))
        .collect::<Vec<_>>()
        .join("; ")
}

/// 编排错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AutomationError {
    /// 前置条件不满足，没有注入任何输入
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// 宿主窗口无法切到前台，没有注入任何输入
    #[error("Host window not focused: {source}")]
    Focus {
        #[source]
        source: InputError,
    },

    /// 输入注入连续失败
    #[error("Input injection failed at {step}: {source}")]
    InputInjection {
        step: Step,
        #[source]
        source: InputError,
    },

    /// 期望的界面状态没有出现
    #[error("UI state not reached at {step} after {waited_ms}ms")]
    Timing { step: Step, waited_ms: u64 },

    /// 所有选择策略都被拒绝
    #[error("Extraction failed: {}", describe_rejections(.rejections))]
    Extraction { rejections: Vec<StrategyRejection> },

    /// 缺少校准坐标或配置不可用
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 串行器拒绝准入
    #[error("Driver busy: {waiting} requests already waiting")]
    Busy { waiting: usize },
}

/// 错误类别（序列化到结果中）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Precondition,
    InputInjection,
    Timing,
    Extraction,
    Configuration,
    Busy,
}

/// 面向用户的失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// 操作没有开始，桌面未被触碰
    NotStarted,
    /// 界面没有到达预期状态（重新校准或重新聚焦）
    UiStateUnreached,
    /// 界面到达了，但捕获的内容被拒绝（调整等待或策略）
    CaptureRejected,
}

impl AutomationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Precondition(_) | Self::Focus { .. } => ErrorKind::Precondition,
            Self::InputInjection { .. } => ErrorKind::InputInjection,
            Self::Timing { .. } => ErrorKind::Timing,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Busy { .. } => ErrorKind::Busy,
        }
    }

    /// 失败所在步骤
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::InputInjection { step, .. } | Self::Timing { step, .. } => Some(*step),
            Self::Extraction { .. } => Some(Step::Extract),
            Self::Focus { .. } => Some(Step::FocusWindow),
            Self::Precondition(_) | Self::Configuration(_) | Self::Busy { .. } => None,
        }
    }

    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::Precondition(_)
            | Self::Focus { .. }
            | Self::Configuration(_)
            | Self::Busy { .. } => FailureClass::NotStarted,
            Self::InputInjection { .. } | Self::Timing { .. } => FailureClass::UiStateUnreached,
            Self::Extraction { .. } => FailureClass::CaptureRejected,
        }
    }

    /// 恢复建议
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Precondition(_) => "请检查搜索词和运行环境后重试",
            Self::Focus {
                source: InputError::PermissionDenied,
            } => "请在系统设置中为终端开启辅助功能权限",
            Self::Focus { .. } => "请确认 Chrome 已打开且可以切换到前台",
            Self::Configuration(_) => "请先运行 calibrate 命令校准扩展按钮和回答区域的坐标",
            Self::Busy { .. } => "已有操作在执行，请稍后重试",
            Self::InputInjection { .. } => "输入模拟失败，请检查辅助功能权限或显示服务器",
            Self::Timing {
                step: Step::OpenOverlay,
                ..
            } => "扩展界面没有打开，屏幕布局可能已变化，请重新校准按钮坐标",
            Self::Timing { .. } => "界面响应超时，请确认宿主窗口保持在前台并适当延长等待时间",
            Self::Extraction { .. } => {
                "未能捕获有效内容，请重新校准回答区域或在 settings.json 中延长等待时间"
            }
        }
    }

    /// 是否在注入任何输入之前失败
    pub fn is_pre_injection(&self) -> bool {
        self.failure_class() == FailureClass::NotStarted
    }
}

/// 编排结果类型
pub type AutomationResult<T> = Result<T, AutomationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err = AutomationError::Precondition("no window".to_string());
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(err.failure_class(), FailureClass::NotStarted);
        assert!(err.is_pre_injection());
        assert_eq!(err.step(), None);

        let err = AutomationError::InputInjection {
            step: Step::Submit,
            source: InputError::KeyboardSimulationFailed("x".to_string()),
        };
        assert_eq!(err.step(), Some(Step::Submit));
        assert_eq!(err.failure_class(), FailureClass::UiStateUnreached);
        assert!(err.to_string().contains("submit"));

        let err = AutomationError::Extraction { rejections: vec![] };
        assert_eq!(err.step(), Some(Step::Extract));
        assert_eq!(err.failure_class(), FailureClass::CaptureRejected);
    }

    #[test]
    fn test_extraction_message_lists_rejections() {
        let err = AutomationError::Extraction {
            rejections: vec![
                StrategyRejection::new("multi_click", Rejection::Empty),
                StrategyRejection::new("select_all", Rejection::UnexpectedUri),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("multi_click"));
        assert!(message.contains("select_all"));
    }

    #[test]
    fn test_focus_failure_names_step() {
        let err = AutomationError::Focus {
            source: InputError::TargetWindowNotFound("chrome".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(err.step(), Some(Step::FocusWindow));
        assert!(err.is_pre_injection());
        assert!(err.recovery_hint().contains("Chrome"));

        let err = AutomationError::Focus {
            source: InputError::PermissionDenied,
        };
        assert!(err.recovery_hint().contains("辅助功能"));
    }

    #[test]
    fn test_open_overlay_hint_mentions_calibration() {
        let err = AutomationError::Timing {
            step: Step::OpenOverlay,
            waited_ms: 1000,
        };
        assert!(err.recovery_hint().contains("校准"));
    }

    #[test]
    fn test_rejection_serialization() {
        let rejection = StrategyRejection::new("drag_select", Rejection::TooShort { len: 3, min: 20 });
        let json = serde_json::to_value(&rejection).unwrap();
        assert_eq!(json["strategy"], "drag_select");
        assert_eq!(json["reason"], "too_short");
        assert_eq!(json["min"], 20);
    }
}
