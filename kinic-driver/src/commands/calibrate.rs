//! 坐标校准命令
//!
//! 不带坐标时倒计时后读取指针位置，用户在倒计时内把指针移到目标上

use std::process::ExitCode;
use std::time::Duration;

use serde_json::json;

use super::cli::CalibrationTarget;
use super::print_json;
use crate::input::{MouseSimulator, ScreenPoint};
use crate::state::{CoordinateStore, PointLabel};
use crate::utils::error::AppResult;

pub async fn run(
    store: &CoordinateStore,
    target: CalibrationTarget,
    explicit: Option<(i32, i32)>,
    delay_secs: u64,
) -> AppResult<ExitCode> {
    let label = PointLabel::from(target);

    let point = match explicit {
        Some((x, y)) => ScreenPoint::new(x, y),
        None => capture_pointer(label, delay_secs).await?,
    };

    let record = store.update(label, point.x, point.y)?;

    print_json(&json!({
        "success": true,
        "label": label,
        "x": point.x,
        "y": point.y,
        "path": store.path().display().to_string(),
        "calibrated": record.is_complete(),
    }))?;

    Ok(ExitCode::SUCCESS)
}

async fn capture_pointer(label: PointLabel, delay_secs: u64) -> AppResult<ScreenPoint> {
    let mouse = MouseSimulator::new()?;

    eprintln!("Move the pointer over the {} ...", describe(label));
    for remaining in (1..=delay_secs).rev() {
        eprintln!("  {}", remaining);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    let point = mouse.location()?;
    tracing::info!(label = label.name(), %point, "Pointer captured");

    Ok(point)
}

fn describe(label: PointLabel) -> &'static str {
    match label {
        PointLabel::Button => "Kinic extension button",
        PointLabel::ResponseArea => "middle of the AI answer text",
    }
}
