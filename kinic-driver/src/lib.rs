//! Kinic driver
//!
//! 通过合成键鼠与剪贴板操作驱动 Kinic 浏览器扩展：保存页面、搜索取回链接、
//! 搜索并提取 AI 回答。

/// Automation: sequencer, validator, serializer
pub mod automation;

/// Command line entry points
pub mod commands;

/// Input, clipboard and window focus
pub mod input;

/// Settings, coordinates and driver state
pub mod state;

/// Utility modules
pub mod utils;

use std::process::ExitCode;

use clap::Parser;

/// 解析命令行并执行
///
/// 所有桌面操作都在同一个线程上串行执行
pub fn run() -> anyhow::Result<ExitCode> {
    utils::logging::init_logging();

    let cli = commands::Cli::parse();
    tracing::debug!(command = ?cli.command, "Parsed command line");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let code = runtime.block_on(async move {
        match commands::dispatch(cli).await {
            Ok(code) => code,
            Err(e) => commands::report_error(&e),
        }
    });

    Ok(code)
}
