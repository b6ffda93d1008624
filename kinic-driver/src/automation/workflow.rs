//! 工作流请求与结果
//!
//! 结果对象在生成后不再修改，序列化为 JSON 返回给调用方

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::error::{AutomationError, ErrorKind, FailureClass};
use crate::state::config::BudgetConfig;

/// 操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// 保存当前页面
    Save,
    /// 搜索并取回第一个结果的链接
    SearchRetrieve,
    /// 搜索、生成 AI 回答并提取文本
    SearchExtract,
    /// 发送取消键关闭扩展界面
    Dismiss,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::SearchRetrieve => "search_retrieve",
            Self::SearchExtract => "search_extract",
            Self::Dismiss => "dismiss",
        }
    }

    /// 是否需要搜索词
    pub fn requires_query(&self) -> bool {
        matches!(self, Self::SearchRetrieve | Self::SearchExtract)
    }

    /// 操作总时长上限
    pub fn budget(&self, budgets: &BudgetConfig) -> Duration {
        let ms = match self {
            Self::Save | Self::Dismiss => budgets.save_ms,
            Self::SearchRetrieve => budgets.retrieve_ms,
            Self::SearchExtract => budgets.extract_ms,
        };
        Duration::from_millis(ms)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 编排步骤
///
/// 失败结果通过 `step_failed` 指出停在哪一步
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    FocusWindow,
    DismissOverlay,
    OpenOverlay,
    NavigateToField,
    EnterQuery,
    Submit,
    AwaitResults,
    TriggerAnswer,
    AwaitAnswer,
    NavigateToResult,
    Extract,
    CloseOverlay,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FocusWindow => "focus_window",
            Self::DismissOverlay => "dismiss_overlay",
            Self::OpenOverlay => "open_overlay",
            Self::NavigateToField => "navigate_to_field",
            Self::EnterQuery => "enter_query",
            Self::Submit => "submit",
            Self::AwaitResults => "await_results",
            Self::TriggerAnswer => "trigger_answer",
            Self::AwaitAnswer => "await_answer",
            Self::NavigateToResult => "navigate_to_result",
            Self::Extract => "extract",
            Self::CloseOverlay => "close_overlay",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 工作流请求
#[derive(Debug, Clone)]
pub struct WorkflowRequest {
    pub operation: Operation,
    pub query: Option<String>,
    pub submitted_at: Instant,
}

impl WorkflowRequest {
    pub fn new(operation: Operation, query: Option<String>) -> Self {
        Self {
            operation,
            query,
            submitted_at: Instant::now(),
        }
    }

    pub fn save() -> Self {
        Self::new(Operation::Save, None)
    }

    pub fn retrieve(query: impl Into<String>) -> Self {
        Self::new(Operation::SearchRetrieve, Some(query.into()))
    }

    pub fn extract(query: impl Into<String>) -> Self {
        Self::new(Operation::SearchExtract, Some(query.into()))
    }

    pub fn dismiss() -> Self {
        Self::new(Operation::Dismiss, None)
    }
}

/// 捕获到的数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkflowData {
    Url { url: String },
    Text { text: String },
}

/// 工作流结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<WorkflowData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_failed: Option<Step>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureClass>,
    /// 恢复建议
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub timing_ms: u64,
    /// 等待升级次数（0 或 1）
    pub escalations: u32,
    /// 成功捕获所用的选择策略
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

impl WorkflowResult {
    /// 成功结果
    pub fn succeeded(
        data: Option<WorkflowData>,
        elapsed: Duration,
        escalations: u32,
        strategy: Option<&str>,
    ) -> Self {
        Self {
            success: true,
            data,
            error: None,
            error_kind: None,
            step_failed: None,
            failure: None,
            hint: None,
            timing_ms: elapsed.as_millis() as u64,
            escalations,
            strategy: strategy.map(str::to_string),
        }
    }

    /// 失败结果
    pub fn failed(error: &AutomationError, elapsed: Duration, escalations: u32) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            step_failed: error.step(),
            failure: Some(error.failure_class()),
            hint: Some(error.recovery_hint().to_string()),
            timing_ms: elapsed.as_millis() as u64,
            escalations,
            strategy: None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.data {
            Some(WorkflowData::Url { url }) => Some(url),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.data {
            Some(WorkflowData::Text { text }) => Some(text),
            _ => None,
        }
    }
}
