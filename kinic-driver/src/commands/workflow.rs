//! 工作流命令

use std::process::ExitCode;

use super::print_json;
use crate::automation::{AutomationContext, WorkflowRequest};
use crate::state::config::AppConfig;
use crate::state::CoordinateStore;
use crate::utils::error::AppResult;

/// 在真实桌面上执行一个请求并输出结果
pub async fn run(
    settings: AppConfig,
    store: CoordinateStore,
    request: WorkflowRequest,
) -> AppResult<ExitCode> {
    let context = AutomationContext::system(settings, store)?;
    let result = context.execute(request).await;

    print_json(&result)?;

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
