//! 自动化模块
//!
//! 通过合成输入驱动没有编程接口的浏览器扩展
//!
//! # 子模块
//!
//! - [`workflow`] - 操作、步骤、请求与结果
//! - [`choreography`] - 每个工作流的编排表
//! - [`timing`] - 两级等待与步骤节奏
//! - [`selection`] - 选择并复制的策略链
//! - [`validator`] - 剪贴板捕获校验
//! - [`sequencer`] - 执行编排的动作编排器
//! - [`serializer`] - 桌面独占与排队准入
//! - [`context`] - 进程内唯一的上下文对象
//! - [`error`] - 错误类型定义
//!
//! # 数据流
//!
//! ```text
//! WorkflowRequest → RequestSerializer → ActionSequencer → WorkflowResult
//!                                          │
//!                                          ├─ Desktop (键鼠/剪贴板/焦点)
//!                                          └─ ExtractionValidator
//! ```

pub mod choreography;
pub mod context;
pub mod error;
pub mod selection;
pub mod sequencer;
pub mod serializer;
pub mod timing;
pub mod validator;
pub mod workflow;

pub use context::AutomationContext;
pub use error::{AutomationError, AutomationResult, ErrorKind, FailureClass, StrategyRejection};
pub use selection::{InputAction, SelectionStrategy, StrategyKind};
pub use sequencer::ActionSequencer;
pub use serializer::{Admission, AdmissionPolicy, RequestSerializer};
pub use timing::{Pacing, WaitKind, WaitPolicy};
pub use validator::{ExpectedContent, ExtractionValidator, Rejection, Verdict};
pub use workflow::{Operation, Step, WorkflowData, WorkflowRequest, WorkflowResult};
