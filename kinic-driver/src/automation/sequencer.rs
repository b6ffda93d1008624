//! 动作编排器
//!
//! 按编排表把键鼠、剪贴板和焦点原语组合成完整的工作流。
//!
//! # 执行顺序
//!
//! 1. 预检：搜索词、校准坐标、选择策略（失败时不触碰桌面）
//! 2. 宿主窗口切到前台并确认（失败为焦点错误，不注入任何输入）
//! 3. 取消键关闭残留浮层
//! 4. 区域点击扩展按钮打开浮层
//! 5. 字段导航、输入搜索词、提交
//! 6. 等待、触发回答、再等待
//! 7. 按策略链选择并复制，每次尝试交给校验器判断；升级等待后重新导航到结果
//! 8. 取消键关闭浮层
//!
//! 第一个输入事件之后的任何失败都会补发取消键，把界面带回已知状态。
//! 整个过程受操作总时长限制，超时视为停在当前步骤的时序错误。
//! 开启浮层检测时，区域点击偏移点的等待额外计入总时长。

use std::time::Duration;

use tokio::time::{sleep, Instant};

use super::choreography::{Capture, Choreography, KeyRepeat};
use super::error::{AutomationError, AutomationResult, StrategyRejection};
use super::selection::{InputAction, SelectionStrategy};
use super::timing::Pacing;
use super::validator::{ExpectedContent, ExtractionValidator, Rejection, Verdict};
use super::workflow::{Operation, Step, WorkflowData, WorkflowRequest, WorkflowResult};
use crate::input::{
    ClickArea, Desktop, InputError, InputResult, KeyStroke, ScreenPoint, WindowInfo,
};
use crate::state::config::{AppConfig, OverlayDetection};
use crate::state::{CoordinateRecord, PointLabel, StateManager};

/// 预检通过后的执行计划
struct Plan {
    choreography: Option<Choreography>,
    query: Option<String>,
    button: Option<ScreenPoint>,
    strategies: Vec<Box<dyn SelectionStrategy>>,
}

/// 捕获结果
struct Captured {
    text: String,
    strategy: &'static str,
}

/// 动作编排器
///
/// 每次请求新建一个，借用串行器持有的桌面
pub struct ActionSequencer<'a, D: Desktop + ?Sized> {
    desktop: &'a mut D,
    config: &'a AppConfig,
    coordinates: &'a CoordinateRecord,
    state: &'a StateManager,
    pacing: Pacing,
    validator: ExtractionValidator,
    /// 是否已经注入过输入
    injected: bool,
    /// 是否已经改写过剪贴板
    clipboard_touched: bool,
    escalations: u32,
}

impl<'a, D: Desktop + ?Sized> ActionSequencer<'a, D> {
    pub fn new(
        desktop: &'a mut D,
        config: &'a AppConfig,
        coordinates: &'a CoordinateRecord,
        state: &'a StateManager,
    ) -> Self {
        Self {
            desktop,
            config,
            coordinates,
            state,
            pacing: Pacing::new(&config.timing, &config.retry),
            validator: ExtractionValidator::new(&config.validation),
            injected: false,
            clipboard_touched: false,
            escalations: 0,
        }
    }

    /// 保存当前页面
    pub async fn save_page(&mut self) -> WorkflowResult {
        self.execute(&WorkflowRequest::save()).await
    }

    /// 搜索并取回第一个结果的链接
    pub async fn search_and_retrieve(&mut self, query: &str) -> WorkflowResult {
        self.execute(&WorkflowRequest::retrieve(query)).await
    }

    /// 搜索、生成 AI 回答并提取文本
    pub async fn search_and_extract_ai(&mut self, query: &str) -> WorkflowResult {
        self.execute(&WorkflowRequest::extract(query)).await
    }

    /// 关闭扩展界面
    pub async fn dismiss(&mut self) -> WorkflowResult {
        self.execute(&WorkflowRequest::dismiss()).await
    }

    /// 执行一个请求
    ///
    /// 总是返回结果对象，错误体现在 `success = false` 的结果中
    pub async fn execute(&mut self, request: &WorkflowRequest) -> WorkflowResult {
        let started = Instant::now();
        let operation = request.operation;
        self.injected = false;
        self.clipboard_touched = false;
        self.escalations = 0;

        tracing::info!(
            operation = %operation,
            queued_ms = started.duration_since(request.submitted_at).as_millis() as u64,
            "Workflow started"
        );

        let plan = match self.prepare(request) {
            Ok(plan) => plan,
            Err(e) => return self.finish(operation, Err(e), started),
        };

        if let Err(e) = self.state.begin(operation) {
            tracing::warn!(error = %e, "Driver state was not idle, resetting");
            self.state.reset();
            if let Err(e) = self.state.begin(operation) {
                let err = AutomationError::Precondition(e.to_string());
                return self.finish(operation, Err(err), started);
            }
        }

        // 保存用户剪贴板
        let saved_clipboard = match &plan.choreography {
            Some(choreography) if self.config.restore_clipboard && choreography.touches_clipboard() => {
                match self.desktop.clipboard().read_text() {
                    Ok(text) => Some(text),
                    Err(e) => {
                        tracing::warn!(error = %e, "Could not save clipboard, it will not be restored");
                        None
                    }
                }
            }
            _ => None,
        };

        let budget = self.budget(operation, &plan);
        let outcome = match tokio::time::timeout(budget, self.run(&plan)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let step = self.state.current_step().unwrap_or(Step::FocusWindow);
                tracing::warn!(step = %step, budget_ms = budget.as_millis() as u64, "Operation budget exhausted");
                Err(AutomationError::Timing {
                    step,
                    waited_ms: started.elapsed().as_millis() as u64,
                })
            }
        };

        if let Err(e) = &outcome
            && !e.is_pre_injection()
            && self.injected
        {
            self.cleanup().await;
        }

        if let Some(saved) = saved_clipboard
            && self.clipboard_touched
        {
            self.restore_clipboard(saved);
        }

        if let Err(e) = self.state.finish() {
            tracing::warn!(error = %e, "Failed to return driver state to idle");
            self.state.reset();
        }

        self.finish(operation, outcome, started)
    }

    fn finish(
        &self,
        operation: Operation,
        outcome: AutomationResult<Option<Captured>>,
        started: Instant,
    ) -> WorkflowResult {
        let elapsed = started.elapsed();

        match outcome {
            Ok(captured) => {
                tracing::info!(
                    operation = %operation,
                    elapsed_ms = elapsed.as_millis() as u64,
                    escalations = self.escalations,
                    strategy = captured.as_ref().map(|c| c.strategy),
                    "Workflow succeeded"
                );

                let strategy = captured.as_ref().map(|c| c.strategy);
                let data = captured.map(|c| match operation {
                    Operation::SearchRetrieve => WorkflowData::Url { url: c.text },
                    _ => WorkflowData::Text { text: c.text },
                });
                WorkflowResult::succeeded(data, elapsed, self.escalations, strategy)
            }
            Err(e) => {
                tracing::error!(
                    operation = %operation,
                    error = %e,
                    step = ?e.step(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    escalations = self.escalations,
                    "Workflow failed"
                );
                WorkflowResult::failed(&e, elapsed, self.escalations)
            }
        }
    }

    /// 操作总时长
    ///
    /// 区域点击会在精确点之外再点若干偏移点，每个点各等一次浮层打开时间
    fn budget(&self, operation: Operation, plan: &Plan) -> Duration {
        let base = operation.budget(&self.config.budgets);

        match plan.button {
            Some(button) if self.config.overlay_detection == OverlayDetection::ForegroundChange => {
                let extra_points = ClickArea::new(button, self.config.retry.click_radius_px)
                    .points()
                    .len()
                    .saturating_sub(1) as u32;
                base + self.pacing.overlay_open * extra_points
            }
            _ => base,
        }
    }

    /// 预检，不触碰桌面
    fn prepare(&self, request: &WorkflowRequest) -> AutomationResult<Plan> {
        let operation = request.operation;

        let query = if operation.requires_query() {
            let query = request.query.as_deref().map(str::trim).unwrap_or_default();
            if query.is_empty() {
                return Err(AutomationError::Precondition(
                    "Search query must not be empty".to_string(),
                ));
            }
            Some(query.to_string())
        } else {
            None
        };

        let choreography = Choreography::for_operation(operation, &self.config.timing);

        let button = match &choreography {
            Some(_) => Some(
                self.coordinates
                    .get(PointLabel::Button)
                    .ok_or_else(|| {
                        AutomationError::Configuration(
                            "Extension button is not calibrated".to_string(),
                        )
                    })?
                    .point(),
            ),
            None => None,
        };

        let anchor = self
            .coordinates
            .get(PointLabel::ResponseArea)
            .map(|pair| pair.point());

        let strategies = match choreography.as_ref().and_then(|c| c.capture.as_ref()) {
            Some(capture) => capture
                .strategies
                .iter()
                .map(|kind| kind.build(&self.config.selection, anchor))
                .collect::<AutomationResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Plan {
            choreography,
            query,
            button,
            strategies,
        })
    }

    async fn run(&mut self, plan: &Plan) -> AutomationResult<Option<Captured>> {
        // 宿主窗口
        self.enter(Step::FocusWindow);
        let host = self.focus_host().await?;

        tracing::debug!(app = %host.app_name, window_id = host.window_id, "Host window focused");

        // 关闭残留浮层
        self.enter(Step::DismissOverlay);
        self.press(Step::DismissOverlay, KeyStroke::Escape).await?;
        sleep(self.pacing.dismiss_settle).await;

        let (Some(choreography), Some(button)) = (&plan.choreography, plan.button) else {
            return Ok(None);
        };

        self.enter(Step::OpenOverlay);
        self.open_overlay(button, &host).await?;

        self.enter(Step::NavigateToField);
        self.repeat(Step::NavigateToField, choreography.navigation).await?;
        sleep(self.pacing.field_settle).await;

        if choreography.enter_query
            && let Some(query) = &plan.query
        {
            self.enter(Step::EnterQuery);
            self.type_query(query).await?;
            sleep(self.pacing.field_settle).await;
        }

        self.enter(Step::Submit);
        self.press(Step::Submit, KeyStroke::Enter).await?;
        if let Some(wait) = choreography.post_submit {
            sleep(wait).await;
        }

        if let Some(trigger) = choreography.trigger {
            self.enter(Step::TriggerAnswer);
            self.repeat(Step::TriggerAnswer, trigger).await?;
            self.press(Step::TriggerAnswer, KeyStroke::Enter).await?;
        }

        let captured = match &choreography.capture {
            Some(capture) => Some(self.capture(capture, &plan.strategies).await?),
            None => None,
        };

        self.enter(Step::CloseOverlay);
        self.press(Step::CloseOverlay, KeyStroke::Escape).await?;

        Ok(captured)
    }

    /// 把宿主窗口切到前台并确认
    ///
    /// 每次请求后异步等待 `focus_settle_ms` 再查询前台窗口，尝试次数用尽视为焦点失败
    async fn focus_host(&mut self) -> AutomationResult<WindowInfo> {
        let attempts = self.config.target.focus_attempts.max(1);
        let settle = self.config.target.focus_settle();
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.desktop.focus().request_focus() {
                Ok(window) => {
                    if self.foreground_id() == Some(window.window_id) {
                        return Ok(window);
                    }

                    sleep(settle).await;
                    if self.foreground_id() == Some(window.window_id) {
                        tracing::debug!(attempt, "Host window reached foreground");
                        return Ok(window);
                    }

                    tracing::debug!(attempt, app = %window.app_name, "Host window not yet in foreground");
                }
                Err(e @ InputError::FocusFailed(_)) => {
                    tracing::warn!(attempt, error = %e, "Focus request failed");
                    last_error = Some(e);
                    sleep(settle).await;
                }
                Err(source) if source.is_focus_error() => {
                    return Err(AutomationError::Focus { source });
                }
                Err(e) => return Err(AutomationError::Precondition(e.to_string())),
            }
        }

        let detail = match last_error {
            Some(e) => format!("host window after {} attempts: {}", attempts, e),
            None => format!("host window after {} attempts", attempts),
        };
        Err(AutomationError::Focus {
            source: InputError::FocusFailed(detail),
        })
    }

    /// 点击扩展按钮
    ///
    /// 开启浮层检测时按区域点击顺序逐点尝试，直到前台窗口发生变化
    async fn open_overlay(&mut self, button: ScreenPoint, host: &WindowInfo) -> AutomationResult<()> {
        if self.config.overlay_detection == OverlayDetection::Off {
            self.click(Step::OpenOverlay, button).await?;
            sleep(self.pacing.overlay_open).await;
            return Ok(());
        }

        let area = ClickArea::new(button, self.config.retry.click_radius_px);
        let points = area.points();
        let mut waited = Duration::ZERO;

        for point in &points {
            self.click(Step::OpenOverlay, *point).await?;
            sleep(self.pacing.overlay_open).await;
            waited += self.pacing.overlay_open;

            if self.overlay_opened(host) {
                if *point != button {
                    tracing::info!(%point, calibrated = %button, "Overlay opened at offset point");
                }
                return Ok(());
            }

            tracing::debug!(%point, "No overlay after click");
        }

        Err(AutomationError::Timing {
            step: Step::OpenOverlay,
            waited_ms: waited.as_millis() as u64,
        })
    }

    /// 前台窗口离开宿主窗口即视为浮层已打开
    fn overlay_opened(&mut self, host: &WindowInfo) -> bool {
        matches!(self.foreground_id(), Some(id) if id != host.window_id)
    }

    /// 当前前台窗口，检测失败时返回 `None`
    fn foreground_id(&mut self) -> Option<u32> {
        match self.desktop.focus().foreground() {
            Ok(window) => window.map(|w| w.window_id),
            Err(e) => {
                tracing::warn!(error = %e, "Foreground query failed");
                None
            }
        }
    }

    async fn capture(
        &mut self,
        capture: &Capture,
        strategies: &[Box<dyn SelectionStrategy>],
    ) -> AutomationResult<Captured> {
        let wait_step = capture.wait.step();

        self.enter(wait_step);
        sleep(capture.policy.typical()).await;

        if let Some(navigation) = capture.result_navigation {
            self.enter(Step::NavigateToResult);
            self.repeat(Step::NavigateToResult, navigation).await?;
            sleep(self.pacing.field_settle).await;
        }

        let Some(first) = strategies.first() else {
            return Err(AutomationError::Configuration(
                "No selection strategy configured".to_string(),
            ));
        };

        let mut rejections = Vec::new();

        // 常规等待后只试第一个策略
        self.enter(Step::Extract);
        match self.attempt(first.as_ref(), capture.expected).await? {
            Verdict::Accept(text) => {
                return Ok(Captured {
                    text,
                    strategy: first.name(),
                });
            }
            Verdict::Reject(rejection) => {
                let fatal = rejection.is_fatal();
                rejections.push(StrategyRejection::new(first.name(), rejection));
                if fatal {
                    return Err(AutomationError::Extraction { rejections });
                }
            }
        }

        // 只升级一次
        let delay = capture.policy.escalation_delay();
        tracing::info!(
            wait = ?capture.wait,
            extra_ms = delay.as_millis() as u64,
            "First capture rejected, escalating wait"
        );
        self.escalations = 1;
        self.enter(wait_step);
        sleep(delay).await;

        // 常规等待时结果可能尚未渲染，焦点停在别处
        if let Some(navigation) = capture.result_navigation {
            self.enter(Step::NavigateToResult);
            self.renavigate(navigation).await?;
        }

        self.enter(Step::Extract);
        for strategy in strategies {
            match self.attempt(strategy.as_ref(), capture.expected).await? {
                Verdict::Accept(text) => {
                    return Ok(Captured {
                        text,
                        strategy: strategy.name(),
                    });
                }
                Verdict::Reject(rejection) => {
                    let fatal = rejection.is_fatal();
                    rejections.push(StrategyRejection::new(strategy.name(), rejection));
                    if fatal {
                        break;
                    }
                }
            }
        }

        Err(AutomationError::Extraction { rejections })
    }

    /// 执行一个策略并校验剪贴板
    async fn attempt(
        &mut self,
        strategy: &dyn SelectionStrategy,
        expected: ExpectedContent,
    ) -> AutomationResult<Verdict> {
        let before = match self.desktop.clipboard().snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => return Ok(unavailable(e.to_string())),
        };

        self.clipboard_touched = true;
        if let Err(e) = self.desktop.clipboard().clear() {
            return Ok(unavailable(e.to_string()));
        }

        for action in strategy.plan() {
            self.perform(Step::Extract, action).await?;
        }
        sleep(self.pacing.capture_settle).await;

        let after = match self.desktop.clipboard().snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => return Ok(unavailable(e.to_string())),
        };

        let verdict = self.validator.judge(&before, &after, expected);
        match &verdict {
            Verdict::Accept(text) => {
                tracing::debug!(strategy = strategy.name(), chars = text.chars().count(), "Capture accepted");
            }
            Verdict::Reject(rejection) => {
                tracing::debug!(strategy = strategy.name(), reason = %rejection, "Capture rejected");
            }
        }

        Ok(verdict)
    }

    async fn perform(&mut self, step: Step, action: InputAction) -> AutomationResult<()> {
        match action {
            InputAction::Click(point) => self.click(step, point).await,
            InputAction::MultiClick {
                point,
                count,
                interval,
            } => {
                self.with_retry(step, |desktop, _| {
                    desktop.injector().multi_click(point, count, interval)
                })
                .await
            }
            InputAction::Drag { from, to } => {
                self.with_retry(step, |desktop, _| desktop.injector().drag(from, to))
                    .await
            }
            InputAction::Key(stroke) => self.press(step, stroke).await,
            InputAction::Pause(duration) => {
                sleep(duration).await;
                Ok(())
            }
        }
    }

    async fn click(&mut self, step: Step, point: ScreenPoint) -> AutomationResult<()> {
        self.with_retry(step, |desktop, _| desktop.injector().click(point))
            .await
    }

    async fn press(&mut self, step: Step, stroke: KeyStroke) -> AutomationResult<()> {
        self.with_retry(step, |desktop, _| desktop.injector().key(stroke))
            .await
    }

    async fn repeat(&mut self, step: Step, keys: KeyRepeat) -> AutomationResult<()> {
        for _ in 0..keys.count {
            self.press(step, keys.stroke).await?;
            sleep(self.pacing.key_interval).await;
        }
        Ok(())
    }

    /// 退回导航起点后重新导航
    async fn renavigate(&mut self, navigation: KeyRepeat) -> AutomationResult<()> {
        if let Some(back) = navigation.reversed() {
            self.repeat(Step::NavigateToResult, back).await?;
        }
        self.repeat(Step::NavigateToResult, navigation).await?;
        sleep(self.pacing.field_settle).await;
        Ok(())
    }

    /// 输入搜索词，重试时先全选以覆盖已输入的部分
    async fn type_query(&mut self, query: &str) -> AutomationResult<()> {
        self.with_retry(Step::EnterQuery, |desktop, attempt| {
            if attempt > 1 {
                desktop.injector().key(KeyStroke::SelectAll)?;
            }
            desktop.injector().type_text(query)
        })
        .await
    }

    /// 执行一个输入动作，失败时暂停后重试
    async fn with_retry<F>(&mut self, step: Step, mut action: F) -> AutomationResult<()>
    where
        F: FnMut(&mut D, u32) -> InputResult<()>,
    {
        let attempts = self.config.retry.step_attempts.max(1);
        let mut attempt = 1;

        loop {
            self.injected = true;

            match action(&mut *self.desktop, attempt) {
                Ok(()) => return Ok(()),
                Err(source) if attempt < attempts => {
                    tracing::warn!(step = %step, attempt, error = %source, "Input failed, retrying");
                    attempt += 1;
                    sleep(self.pacing.retry_pause).await;
                }
                Err(source) => return Err(AutomationError::InputInjection { step, source }),
            }
        }
    }

    /// 失败后发送取消键
    async fn cleanup(&mut self) {
        match self.desktop.injector().key(KeyStroke::Escape) {
            Ok(()) => {
                tracing::debug!("Cleanup escape sent");
                sleep(self.pacing.dismiss_settle).await;
            }
            Err(e) => tracing::warn!(error = %e, "Cleanup failed"),
        }
    }

    fn restore_clipboard(&mut self, saved: Option<String>) {
        let clipboard = self.desktop.clipboard();
        let result = match &saved {
            Some(text) => clipboard.write_text(text),
            None => clipboard.clear(),
        };

        match result {
            Ok(()) => tracing::debug!(restored = saved.is_some(), "Clipboard restored"),
            Err(e) => tracing::warn!(error = %e, "Failed to restore clipboard"),
        }
    }

    fn enter(&self, step: Step) {
        tracing::debug!(step = %step, "Entering step");
        if let Err(e) = self.state.advance(step) {
            tracing::warn!(step = %step, error = %e, "Step not recorded");
        }
    }
}

fn unavailable(detail: String) -> Verdict {
    Verdict::Reject(Rejection::ClipboardUnavailable { detail })
}
