//! 校准坐标存储
//!
//! 两个屏幕绝对坐标：打开扩展的按钮，以及 AI 回答区域。
//! 坐标随分辨率、缩放或窗口布局变化而失效，程序无法察觉，只能重新校准。
//!
//! # 文件格式
//!
//! ```json
//! { "button_x": 962, "button_y": 84, "response_x": 700, "response_y": 520 }
//! ```
//!
//! 旧版文件 `~/.kinic/config.json` 使用 `kinic_x` / `ai_response_x` 等键名，
//! 新文件不存在时会读取旧文件。写入总是落到新位置。

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use super::config::{ConfigError, ConfigManager, ConfigResult};
use crate::input::ScreenPoint;

/// 坐标文件名
pub const COORDINATES_FILE_NAME: &str = "coordinates.json";

/// 坐标用途
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointLabel {
    /// 扩展按钮
    Button,
    /// AI 回答区域
    ResponseArea,
}

impl PointLabel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::ResponseArea => "response_area",
        }
    }
}

/// 带用途的坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatePair {
    pub x: i32,
    pub y: i32,
    pub label: PointLabel,
}

impl CoordinatePair {
    pub fn point(&self) -> ScreenPoint {
        ScreenPoint::new(self.x, self.y)
    }
}

/// 持久化的坐标记录
///
/// 缺失的字段表示尚未校准
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateRecord {
    #[serde(default, alias = "kinic_x", skip_serializing_if = "Option::is_none")]
    pub button_x: Option<i32>,
    #[serde(default, alias = "kinic_y", skip_serializing_if = "Option::is_none")]
    pub button_y: Option<i32>,
    #[serde(default, alias = "ai_response_x", skip_serializing_if = "Option::is_none")]
    pub response_x: Option<i32>,
    #[serde(default, alias = "ai_response_y", skip_serializing_if = "Option::is_none")]
    pub response_y: Option<i32>,
}

impl CoordinateRecord {
    /// 取出指定用途的坐标，x 和 y 都存在才算已校准
    pub fn get(&self, label: PointLabel) -> Option<CoordinatePair> {
        let (x, y) = match label {
            PointLabel::Button => (self.button_x?, self.button_y?),
            PointLabel::ResponseArea => (self.response_x?, self.response_y?),
        };
        Some(CoordinatePair { x, y, label })
    }

    pub fn set(&mut self, label: PointLabel, x: i32, y: i32) {
        match label {
            PointLabel::Button => {
                self.button_x = Some(x);
                self.button_y = Some(y);
            }
            PointLabel::ResponseArea => {
                self.response_x = Some(x);
                self.response_y = Some(y);
            }
        }
    }

    /// 两个坐标是否都已校准
    pub fn is_complete(&self) -> bool {
        self.get(PointLabel::Button).is_some() && self.get(PointLabel::ResponseArea).is_some()
    }
}

/// 坐标存储
///
/// 内存中的记录通过 ArcSwap 无锁读取；更新时整条记录立即写回磁盘
pub struct CoordinateStore {
    path: PathBuf,
    legacy_path: Option<PathBuf>,
    record: ArcSwap<CoordinateRecord>,
    /// 串行化写盘
    write_lock: Mutex<()>,
}

impl CoordinateStore {
    /// 打开指定位置的存储
    ///
    /// # Arguments
    ///
    /// * `path` - 坐标文件
    /// * `legacy_path` - `path` 不存在时读取的旧版文件
    ///
    /// # Errors
    ///
    /// 文件存在但无法读取或解析时返回 `ConfigError`
    pub fn open(path: impl Into<PathBuf>, legacy_path: Option<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let record = Self::read_record(&path, legacy_path.as_deref())?;

        Ok(Self {
            path,
            legacy_path,
            record: ArcSwap::new(Arc::new(record)),
            write_lock: Mutex::new(()),
        })
    }

    /// 打开默认位置的存储
    pub fn open_default() -> ConfigResult<Self> {
        let path = ConfigManager::config_dir()?.join(COORDINATES_FILE_NAME);
        let legacy = dirs::home_dir().map(|home| home.join(".kinic").join("config.json"));
        Self::open(path, legacy)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 当前记录
    pub fn get(&self) -> Arc<CoordinateRecord> {
        self.record.load_full()
    }

    /// 指定用途的坐标
    pub fn point(&self, label: PointLabel) -> Option<CoordinatePair> {
        self.get().get(label)
    }

    /// 更新一个坐标并立即持久化
    ///
    /// 写盘失败时内存中的记录保持不变
    ///
    /// # Errors
    ///
    /// - `ConfigError::Io` - 目录创建、写入或重命名失败
    pub fn update(&self, label: PointLabel, x: i32, y: i32) -> ConfigResult<CoordinateRecord> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ConfigError::Path("Coordinate store lock poisoned".to_string()))?;

        let mut record = (*self.record.load_full()).clone();
        record.set(label, x, y);

        self.persist(&record)?;
        self.record.store(Arc::new(record.clone()));

        tracing::info!(label = label.name(), x, y, path = %self.path.display(), "Coordinate updated");

        Ok(record)
    }

    /// 从磁盘重新加载
    pub fn reload(&self) -> ConfigResult<()> {
        let record = Self::read_record(&self.path, self.legacy_path.as_deref())?;
        self.record.store(Arc::new(record));
        Ok(())
    }

    fn read_record(path: &Path, legacy_path: Option<&Path>) -> ConfigResult<CoordinateRecord> {
        let source = if path.exists() {
            Some(path)
        } else {
            legacy_path.filter(|legacy| legacy.exists())
        };

        let Some(source) = source else {
            tracing::debug!(path = %path.display(), "No coordinate file, starting uncalibrated");
            return Ok(CoordinateRecord::default());
        };

        let content = std::fs::read_to_string(source)?;
        let record: CoordinateRecord = serde_json::from_str(&content)?;

        tracing::debug!(
            path = %source.display(),
            button = record.get(PointLabel::Button).is_some(),
            response = record.get(PointLabel::ResponseArea).is_some(),
            "Coordinates loaded"
        );

        Ok(record)
    }

    /// 先写临时文件再重命名，避免留下半写的文件
    fn persist(&self, record: &CoordinateRecord) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(record)?;

        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}
