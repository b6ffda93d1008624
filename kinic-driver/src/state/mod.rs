//! 状态管理模块
//!
//! # 模块结构
//!
//! - `app_state` - 驱动状态和状态管理器
//! - `config` - 只读调优参数
//! - `coordinates` - 校准坐标的持久化
//! - `error` - 状态相关错误类型

mod app_state;
pub mod config;
pub mod coordinates;
mod error;

pub use app_state::{DriverState, StateManager};
pub use config::{AppConfig, ConfigError, ConfigManager, ConfigResult, GlobalConfig};
pub use coordinates::{CoordinatePair, CoordinateRecord, CoordinateStore, PointLabel};
pub use error::{StateError, StateResult};
