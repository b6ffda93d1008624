//! 自动化上下文
//!
//! 进程内唯一的上下文对象：调优参数、校准坐标、请求串行器和驱动状态。
//! 所有入口（命令行、测试）都通过它发起请求。

use std::sync::Arc;

use super::sequencer::ActionSequencer;
use super::serializer::{AdmissionPolicy, RequestSerializer};
use super::workflow::{WorkflowRequest, WorkflowResult};
use crate::input::{Desktop, InputResult, SystemDesktop};
use crate::state::config::{AppConfig, ConfigResult, GlobalConfig};
use crate::state::{CoordinateRecord, CoordinateStore, DriverState, PointLabel, StateManager};

/// 自动化上下文
pub struct AutomationContext<D: Desktop> {
    settings: GlobalConfig,
    coordinates: CoordinateStore,
    serializer: RequestSerializer<D>,
    state: StateManager,
}

impl<D: Desktop> AutomationContext<D> {
    /// 创建上下文
    ///
    /// 准入策略在创建时固定
    pub fn new(settings: AppConfig, coordinates: CoordinateStore, desktop: D) -> Self {
        let policy = AdmissionPolicy::from(&settings.serializer);

        tracing::info!(
            policy = ?policy,
            calibrated = coordinates.get().is_complete(),
            coordinates = %coordinates.path().display(),
            "Automation context created"
        );

        Self {
            settings: GlobalConfig::new(settings),
            coordinates,
            serializer: RequestSerializer::new(desktop, policy),
            state: StateManager::new(),
        }
    }

    /// 保存当前页面
    pub async fn save(&self) -> WorkflowResult {
        self.execute(WorkflowRequest::save()).await
    }

    /// 搜索并取回第一个结果的链接
    pub async fn search_and_retrieve(&self, query: &str) -> WorkflowResult {
        self.execute(WorkflowRequest::retrieve(query)).await
    }

    /// 搜索并提取 AI 回答
    pub async fn search_and_extract(&self, query: &str) -> WorkflowResult {
        self.execute(WorkflowRequest::extract(query)).await
    }

    /// 关闭扩展界面
    pub async fn dismiss(&self) -> WorkflowResult {
        self.execute(WorkflowRequest::dismiss()).await
    }

    /// 经串行器执行请求
    pub async fn execute(&self, request: WorkflowRequest) -> WorkflowResult {
        let mut admission = match self.serializer.acquire().await {
            Ok(admission) => admission,
            Err(e) => {
                return WorkflowResult::failed(&e, request.submitted_at.elapsed(), 0);
            }
        };

        // 准入之后再读取，排队期间的重新校准也能生效
        let settings = self.settings.get();
        let coordinates = self.coordinates.get();

        let mut sequencer =
            ActionSequencer::new(&mut *admission, &settings, &coordinates, &self.state);
        sequencer.execute(&request).await
    }

    /// 当前校准坐标
    pub fn read_configuration(&self) -> Arc<CoordinateRecord> {
        self.coordinates.get()
    }

    /// 更新校准坐标并立即持久化
    pub fn update_configuration(
        &self,
        label: PointLabel,
        x: i32,
        y: i32,
    ) -> ConfigResult<CoordinateRecord> {
        self.coordinates.update(label, x, y)
    }

    /// 当前驱动状态
    pub fn state(&self) -> Arc<DriverState> {
        self.state.current()
    }

    /// 当前调优参数
    pub fn settings(&self) -> Arc<AppConfig> {
        self.settings.get()
    }

    pub fn coordinates(&self) -> &CoordinateStore {
        &self.coordinates
    }

    /// 执行中和等待中的请求数
    pub fn in_flight(&self) -> usize {
        self.serializer.in_flight()
    }
}

impl AutomationContext<SystemDesktop> {
    /// 使用真实桌面创建上下文
    ///
    /// # Errors
    ///
    /// 输入模拟或剪贴板初始化失败时返回 `InputError`
    pub fn system(settings: AppConfig, coordinates: CoordinateStore) -> InputResult<Self> {
        let desktop = SystemDesktop::new(settings.target.window())?;

        Ok(Self::new(settings, coordinates, desktop))
    }
}
