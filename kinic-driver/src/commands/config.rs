//! 配置查看命令

use std::path::Path;
use std::process::ExitCode;

use serde_json::json;

use super::print_json;
use crate::input::platform::{self, PlatformCapabilities};
use crate::state::config::{AppConfig, ConfigManager};
use crate::state::CoordinateStore;
use crate::utils::error::AppResult;

/// 输出调优参数、校准坐标和平台能力
pub fn run(
    settings: &AppConfig,
    settings_path: Option<&Path>,
    store: &CoordinateStore,
    request_permission: bool,
) -> AppResult<ExitCode> {
    if request_permission {
        let granted = platform::request_accessibility_permission();
        tracing::info!(granted, "Accessibility permission requested");
    }

    let settings_path = match settings_path {
        Some(path) => Some(path.to_path_buf()),
        None => ConfigManager::settings_path().ok(),
    }
    .map(|path| path.display().to_string());

    print_json(&json!({
        "success": true,
        "settings_path": settings_path,
        "settings": settings,
        "coordinates_path": store.path().display().to_string(),
        "coordinates": *store.get(),
        "calibrated": store.get().is_complete(),
        "platform": PlatformCapabilities::current(),
        "permission": platform::check_accessibility_permission(),
    }))?;

    Ok(ExitCode::SUCCESS)
}
