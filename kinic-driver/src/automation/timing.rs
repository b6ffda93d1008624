//! 等待策略
//!
//! 扩展界面的渲染时间不可预测。每类等待有两级：先等常规时长尝试一次，
//! 被拒绝后只升级一次，补足到扩展时长。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::workflow::Step;
use crate::state::config::{RetryConfig, TimingConfig};

/// 等待类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitKind {
    /// 搜索结果渲染
    SearchResults,
    /// AI 回答生成
    AiGeneration,
}

impl WaitKind {
    /// 等待期间所处的步骤
    pub fn step(&self) -> Step {
        match self {
            Self::SearchResults => Step::AwaitResults,
            Self::AiGeneration => Step::AwaitAnswer,
        }
    }
}

/// 两级等待
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    typical: Duration,
    extended: Duration,
}

impl WaitPolicy {
    /// 扩展时长小于常规时长时按常规时长处理
    pub fn new(typical: Duration, extended: Duration) -> Self {
        Self {
            typical,
            extended: extended.max(typical),
        }
    }

    pub fn for_kind(kind: WaitKind, timing: &TimingConfig) -> Self {
        let (typical, extended) = match kind {
            WaitKind::SearchResults => (timing.search_typical_ms, timing.search_extended_ms),
            WaitKind::AiGeneration => (timing.ai_typical_ms, timing.ai_extended_ms),
        };
        Self::new(Duration::from_millis(typical), Duration::from_millis(extended))
    }

    pub fn typical(&self) -> Duration {
        self.typical
    }

    pub fn extended(&self) -> Duration {
        self.extended
    }

    /// 升级时追加的等待
    pub fn escalation_delay(&self) -> Duration {
        self.extended - self.typical
    }
}

/// 步骤之间的固定节奏
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub overlay_open: Duration,
    pub key_interval: Duration,
    pub field_settle: Duration,
    pub dismiss_settle: Duration,
    pub capture_settle: Duration,
    pub retry_pause: Duration,
}

impl Pacing {
    pub fn new(timing: &TimingConfig, retry: &RetryConfig) -> Self {
        Self {
            overlay_open: Duration::from_millis(timing.overlay_open_ms),
            key_interval: Duration::from_millis(timing.key_interval_ms),
            field_settle: Duration::from_millis(timing.field_settle_ms),
            dismiss_settle: Duration::from_millis(timing.dismiss_settle_ms),
            capture_settle: Duration::from_millis(timing.capture_settle_ms),
            retry_pause: Duration::from_millis(retry.retry_pause_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation_delay() {
        let policy = WaitPolicy::new(Duration::from_secs(10), Duration::from_secs(25));
        assert_eq!(policy.escalation_delay(), Duration::from_secs(15));
        assert_eq!(policy.typical() + policy.escalation_delay(), policy.extended());
    }

    #[test]
    fn test_extended_never_below_typical() {
        let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_secs(2));
        assert_eq!(policy.extended(), Duration::from_secs(5));
        assert_eq!(policy.escalation_delay(), Duration::ZERO);
    }

    #[test]
    fn test_policy_from_config() {
        let timing = TimingConfig::default();
        let policy = WaitPolicy::for_kind(WaitKind::AiGeneration, &timing);
        assert_eq!(policy.typical(), Duration::from_millis(timing.ai_typical_ms));
        assert_eq!(WaitKind::AiGeneration.step(), Step::AwaitAnswer);
        assert_eq!(WaitKind::SearchResults.step(), Step::AwaitResults);
    }
}
