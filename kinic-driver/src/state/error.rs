use thiserror::Error;

use super::app_state::DriverState;

/// 状态相关错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// 无效的状态转换
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition { from: DriverState, to: DriverState },

    /// 没有正在执行的操作
    #[error("No operation is running")]
    NotRunning,
}

/// 状态模块的结果类型
pub type StateResult<T> = Result<T, StateError>;
