//! 命令行入口
//!
//! 每个子命令在 stdout 输出一个 JSON 对象，日志写到 stderr。
//! 操作失败时进程以非零状态退出。
//!
//! # 模块结构
//!
//! - `cli` - clap 参数定义
//! - `workflow` - save / retrieve / extract / close
//! - `calibrate` - 记录屏幕坐标
//! - `config` - 输出当前配置与平台能力

pub mod calibrate;
pub mod cli;
pub mod config;
pub mod workflow;

use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;

pub use cli::{CalibrationTarget, Cli, Commands};

use crate::automation::WorkflowRequest;
use crate::state::config::{AppConfig, ConfigManager};
use crate::state::CoordinateStore;
use crate::utils::error::{AppError, AppResult};

/// 执行子命令
///
/// 返回 `Err` 表示命令没能产生结果（配置无法读取、桌面初始化失败等）
pub async fn dispatch(cli: Cli) -> AppResult<ExitCode> {
    let settings = load_settings(cli.settings.as_deref())?;
    let store = open_coordinates(cli.coordinates.as_deref())?;

    match cli.command {
        Commands::Save => workflow::run(settings, store, WorkflowRequest::save()).await,
        Commands::Retrieve { query } => {
            workflow::run(settings, store, WorkflowRequest::retrieve(query)).await
        }
        Commands::Extract { query } => {
            workflow::run(settings, store, WorkflowRequest::extract(query)).await
        }
        Commands::Close => workflow::run(settings, store, WorkflowRequest::dismiss()).await,
        Commands::Calibrate {
            target,
            x,
            y,
            delay,
        } => calibrate::run(&store, target, x.zip(y), delay).await,
        Commands::Config { request_permission } => {
            config::run(&settings, cli.settings.as_deref(), &store, request_permission)
        }
    }
}

/// 把命令层错误作为 JSON 输出
pub fn report_error(error: &AppError) -> ExitCode {
    tracing::error!(error = %error, code = ?error.code(), "Command failed");

    let body = serde_json::json!({
        "success": false,
        "error": error.context(),
    });
    match serde_json::to_string_pretty(&body) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "Failed to serialize error"),
    }

    ExitCode::FAILURE
}

fn load_settings(path: Option<&Path>) -> AppResult<AppConfig> {
    let settings = match path {
        Some(path) => ConfigManager::load(path)?,
        None => ConfigManager::load_default()?,
    };
    Ok(settings)
}

fn open_coordinates(path: Option<&Path>) -> AppResult<CoordinateStore> {
    let store = match path {
        Some(path) => CoordinateStore::open(path, None)?,
        None => CoordinateStore::open_default()?,
    };
    Ok(store)
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}
