use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use super::error::{StateError, StateResult};
use crate::automation::workflow::{Operation, Step};

/// 驱动状态
///
/// 记录正在桌面上执行的操作及其当前步骤。操作超时时，
/// 失败结果中的步骤就是从这里读取的
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DriverState {
    /// 空闲，桌面可用
    Idle,

    /// 操作执行中
    Running {
        operation: Operation,
        /// 尚未进入任何步骤时为 `None`
        step: Option<Step>,
    },
}

impl DriverState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// 正在执行的操作
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Running { operation, .. } => Some(*operation),
            Self::Idle => None,
        }
    }

    /// 当前步骤
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::Running { step, .. } => *step,
            Self::Idle => None,
        }
    }

    /// 状态名称（用于日志）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running { .. } => "Running",
        }
    }
}

impl Default for DriverState {
    fn default() -> Self {
        Self::Idle
    }
}

/// 状态管理器
///
/// 请求串行器保证同一时刻只有一个操作推进状态，
/// 读取方（超时处理、日志）可以在任意线程无锁读取
pub struct StateManager {
    state: ArcSwap<DriverState>,
}

impl StateManager {
    /// 创建新的状态管理器
    ///
    /// # Examples
    ///
    /// ```
    /// use kinic_driver_lib::state::StateManager;
    ///
    /// let manager = StateManager::new();
    /// assert!(manager.current().is_idle());
    /// ```
    pub fn new() -> Self {
        Self {
            state: ArcSwap::new(Arc::new(DriverState::Idle)),
        }
    }

    /// 获取当前状态
    pub fn current(&self) -> Arc<DriverState> {
        self.state.load_full()
    }

    /// 当前步骤
    pub fn current_step(&self) -> Option<Step> {
        self.current().step()
    }

    /// 开始一个操作
    ///
    /// # Errors
    ///
    /// 已有操作在执行时返回 [`StateError::InvalidTransition`]
    pub fn begin(&self, operation: Operation) -> StateResult<()> {
        self.transition(DriverState::Running {
            operation,
            step: None,
        })
    }

    /// 进入下一个步骤
    ///
    /// # Errors
    ///
    /// 没有操作在执行时返回 [`StateError::InvalidTransition`]
    pub fn advance(&self, step: Step) -> StateResult<()> {
        let operation = self
            .current()
            .operation()
            .ok_or(StateError::NotRunning)?;

        self.transition(DriverState::Running {
            operation,
            step: Some(step),
        })
    }

    /// 结束当前操作，回到空闲
    pub fn finish(&self) -> StateResult<()> {
        self.transition(DriverState::Idle)
    }

    /// 强制回到空闲（跳过验证）
    ///
    /// 操作被超时中断时使用
    pub fn reset(&self) {
        self.state.store(Arc::new(DriverState::Idle));
    }

    /// 转换到新状态
    ///
    /// # Errors
    ///
    /// 转换不合法时返回 [`StateError::InvalidTransition`]
    pub fn transition(&self, new_state: DriverState) -> StateResult<()> {
        let current = self.current();

        if !Self::is_valid_transition(&current, &new_state) {
            return Err(StateError::InvalidTransition {
                from: *current,
                to: new_state,
            });
        }

        tracing::debug!(
            from = current.name(),
            to = new_state.name(),
            step = ?new_state.step(),
            "Driver state transition"
        );

        self.state.store(Arc::new(new_state));
        Ok(())
    }

    fn is_valid_transition(from: &DriverState, to: &DriverState) -> bool {
        use DriverState::*;

        match (from, to) {
            (Idle, Running { step: None, .. }) => true,
            // 同一操作内推进步骤
            (
                Running { operation: a, .. },
                Running {
                    operation: b,
                    step: Some(_),
                },
            ) => a == b,
            (Running { .. }, Idle) => true,
            _ => false,
        }
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let manager = StateManager::new();
        assert!(manager.current().is_idle());
        assert_eq!(manager.current_step(), None);
    }

    #[test]
    fn test_operation_lifecycle() {
        let manager = StateManager::new();

        manager.begin(Operation::Save).unwrap();
        assert!(manager.current().is_running());
        assert_eq!(manager.current().operation(), Some(Operation::Save));

        manager.advance(Step::FocusWindow).unwrap();
        manager.advance(Step::OpenOverlay).unwrap();
        assert_eq!(manager.current_step(), Some(Step::OpenOverlay));

        manager.finish().unwrap();
        assert!(manager.current().is_idle());
    }

    #[test]
    fn test_begin_while_running_rejected() {
        let manager = StateManager::new();
        manager.begin(Operation::Save).unwrap();

        let err = manager.begin(Operation::SearchExtract).unwrap_err();
        assert!(matches!(err, StateError::InvalidTransition { .. }));
    }

    #[test]
    fn test_advance_while_idle_rejected() {
        let manager = StateManager::new();
        assert_eq!(manager.advance(Step::Submit), Err(StateError::NotRunning));
        assert!(manager.finish().is_err());
    }

    #[test]
    fn test_operation_cannot_change_mid_flight() {
        let manager = StateManager::new();
        manager.begin(Operation::Save).unwrap();

        let result = manager.transition(DriverState::Running {
            operation: Operation::SearchRetrieve,
            step: Some(Step::Submit),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_reset() {
        let manager = StateManager::new();
        manager.begin(Operation::SearchRetrieve).unwrap();
        manager.advance(Step::AwaitResults).unwrap();

        manager.reset();
        assert!(manager.current().is_idle());
    }

    #[test]
    fn test_state_serialization() {
        let state = DriverState::Running {
            operation: Operation::SearchExtract,
            step: Some(Step::AwaitAnswer),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"state\":\"running\""));
        assert!(json.contains("\"search_extract\""));
        assert!(json.contains("\"await_answer\""));
    }
}
