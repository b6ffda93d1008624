//! 应用配置模块
//!
//! 调优参数从 `settings.json` 读取，运行期间只读
//!
//! # 配置存储位置
//!
//! - Windows: `%APPDATA%/kinic-driver/settings.json`
//! - macOS: `~/Library/Application Support/kinic-driver/settings.json`
//! - Linux: `~/.config/kinic-driver/settings.json`
//!
//! 文件不存在时使用默认值；每个分节都可以只写一部分字段。
//!
//! # 使用示例
//!
//! ```ignore
//! use kinic_driver_lib::state::config::{ConfigManager, GlobalConfig};
//!
//! let config = ConfigManager::load_default()?;
//! let global = GlobalConfig::new(config);
//! let ai_wait_ms = global.get().timing.ai_typical_ms;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::TargetWindow;

/// 配置目录名
pub const APP_DIR_NAME: &str = "kinic-driver";

/// 调优参数文件名
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 路径错误
    #[error("Path error: {0}")]
    Path(String),
}

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 宿主窗口
    pub target: TargetConfig,
    /// 等待时间
    pub timing: TimingConfig,
    /// 提取校验阈值
    pub validation: ValidationConfig,
    /// 步骤重试与区域点击
    pub retry: RetryConfig,
    /// 请求串行器
    pub serializer: SerializerConfig,
    /// 操作总时长上限
    pub budgets: BudgetConfig,
    /// 选择策略参数
    pub selection: SelectionConfig,
    /// 浮层打开检测
    pub overlay_detection: OverlayDetection,
    /// 操作结束后恢复用户剪贴板
    pub restore_clipboard: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            timing: TimingConfig::default(),
            validation: ValidationConfig::default(),
            retry: RetryConfig::default(),
            serializer: SerializerConfig::default(),
            budgets: BudgetConfig::default(),
            selection: SelectionConfig::default(),
            overlay_detection: OverlayDetection::ForegroundChange,
            restore_clipboard: true,
        }
    }
}

/// 宿主窗口配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// 应用名称（不区分大小写的子串）
    pub app_names: Vec<String>,
    /// 标题过滤
    pub title_contains: Option<String>,
    /// 每次切换请求后等待窗口管理器完成的时间（毫秒）
    pub focus_settle_ms: u64,
    /// 切换前台的尝试次数，计入操作总时长
    pub focus_attempts: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        let window = TargetWindow::default();
        Self {
            app_names: window.app_names,
            title_contains: window.title_contains,
            focus_settle_ms: 500,
            focus_attempts: 3,
        }
    }
}

impl TargetConfig {
    pub fn window(&self) -> TargetWindow {
        TargetWindow {
            app_names: self.app_names.clone(),
            title_contains: self.title_contains.clone(),
        }
    }

    pub fn focus_settle(&self) -> Duration {
        Duration::from_millis(self.focus_settle_ms)
    }
}

/// 等待时间配置（毫秒）
///
/// 扩展界面的渲染延迟不可预测，搜索结果和 AI 回答各有两级等待：
/// 常规值覆盖大多数情况，扩展值是升级后的总等待
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub search_typical_ms: u64,
    pub search_extended_ms: u64,
    pub ai_typical_ms: u64,
    pub ai_extended_ms: u64,
    /// 点击按钮后等待浮层出现
    pub overlay_open_ms: u64,
    /// 连续按键之间
    pub key_interval_ms: u64,
    /// 导航或输入后等待界面响应
    pub field_settle_ms: u64,
    /// 保存提交后等待扩展完成写入
    pub save_commit_ms: u64,
    /// 取消键之后
    pub dismiss_settle_ms: u64,
    /// 复制快捷键之后等待剪贴板更新
    pub capture_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            search_typical_ms: 3_500,
            search_extended_ms: 7_000,
            ai_typical_ms: 10_000,
            ai_extended_ms: 25_000,
            overlay_open_ms: 3_000,
            key_interval_ms: 300,
            field_settle_ms: 1_000,
            save_commit_ms: 2_000,
            dismiss_settle_ms: 500,
            capture_settle_ms: 500,
        }
    }
}

/// 提取校验配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// AI 回答的最小字符数
    pub min_answer_len: usize,
    /// 链接的最小字符数
    pub min_url_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_answer_len: 20,
            min_url_len: 10,
        }
    }
}

/// 步骤重试配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 每个步骤的最多尝试次数（含首次）
    pub step_attempts: u32,
    /// 重试前暂停（毫秒）
    pub retry_pause_ms: u64,
    /// 区域点击的偏移半径（像素）
    pub click_radius_px: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            step_attempts: 2,
            retry_pause_ms: 500,
            click_radius_px: 5,
        }
    }
}

/// 忙碌时的准入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionMode {
    /// 排队等待
    #[default]
    Queue,
    /// 直接拒绝
    Reject,
}

/// 请求串行器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    pub mode: AdmissionMode,
    /// 最多排队的请求数（不含正在执行的）
    pub queue_capacity: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            mode: AdmissionMode::Queue,
            queue_capacity: 4,
        }
    }
}

/// 操作总时长上限（毫秒）
///
/// 开启浮层检测时，区域点击偏移点的额外等待另行计入，不占用这里的时长
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub save_ms: u64,
    pub retrieve_ms: u64,
    pub extract_ms: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            save_ms: 10_000,
            retrieve_ms: 20_000,
            extract_ms: 60_000,
        }
    }
}

/// 选择策略参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// 连击次数
    pub multi_click_count: u32,
    /// 连击间隔（毫秒）
    pub multi_click_interval_ms: u64,
    /// 拖选的水平偏移
    pub drag_dx: i32,
    /// 拖选的垂直偏移
    pub drag_dy: i32,
    /// 上下文菜单中“复制链接地址”之前的下移次数
    pub context_menu_downs: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            multi_click_count: 3,
            multi_click_interval_ms: 20,
            drag_dx: 400,
            drag_dy: 200,
            context_menu_downs: 5,
        }
    }
}

/// 浮层打开检测方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayDetection {
    /// 假定精确点击命中，只点一次
    Off,
    /// 点击后前台窗口变化即视为浮层已打开，未变化时按区域点击继续尝试
    #[default]
    ForegroundChange,
}

/// 配置管理器
///
/// 只负责读取；调优参数由用户手工编辑
pub struct ConfigManager;

impl ConfigManager {
    /// 从指定路径加载配置
    ///
    /// 文件不存在时返回默认配置
    ///
    /// # Errors
    ///
    /// - `ConfigError::Io` - 文件存在但无法读取
    /// - `ConfigError::Json` - 内容不是合法的配置
    pub fn load(path: &Path) -> ConfigResult<AppConfig> {
        tracing::debug!(path = %path.display(), "Loading settings");

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: AppConfig = serde_json::from_str(&content)?;
            tracing::info!(path = %path.display(), "Settings loaded");
            Ok(config)
        } else {
            tracing::info!(path = %path.display(), "Settings file not found, using defaults");
            Ok(AppConfig::default())
        }
    }

    /// 从默认位置加载配置
    pub fn load_default() -> ConfigResult<AppConfig> {
        Self::load(&Self::settings_path()?)
    }

    /// 配置目录
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| ConfigError::Path("No config directory on this platform".to_string()))
    }

    /// 调优参数文件路径
    pub fn settings_path() -> ConfigResult<PathBuf> {
        Ok(Self::config_dir()?.join(SETTINGS_FILE_NAME))
    }
}

/// 全局配置状态
///
/// 使用 ArcSwap 实现无锁读取
pub struct GlobalConfig {
    config: ArcSwap<AppConfig>,
}

impl GlobalConfig {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: ArcSwap::new(Arc::new(config)),
        }
    }

    /// 获取当前配置
    pub fn get(&self) -> Arc<AppConfig> {
        self.config.load_full()
    }

    /// 替换配置
    pub fn update(&self, config: AppConfig) {
        self.config.store(Arc::new(config));
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
