//! 鼠标模拟模块
//!
//! 提供屏幕绝对坐标上的点击、连击和拖拽，以及容忍坐标漂移的区域点击
//!
//! # 区域点击
//!
//! 校准坐标可能因 DPI 或缩放变化偏离几个像素。[`ClickArea`] 先给出精确点，
//! 然后按十字形给出有限个偏移点：
//!
//! ```text
//!             (x, y-r)
//!   (x-r, y)  (x, y)   (x+r, y)
//!             (x, y+r)
//! ```

use std::thread;
use std::time::Duration;

use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use serde::{Deserialize, Serialize};

use super::error::{InputError, InputResult};

/// 按下与释放之间的间隔
pub const CLICK_HOLD_MS: u64 = 10;

/// 指针移动后等待光标稳定的时间
pub const POINTER_SETTLE_MS: u64 = 50;

/// 屏幕绝对坐标点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 返回偏移后的新坐标
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl std::fmt::Display for ScreenPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 有界偏移搜索区域
///
/// 精确点在前，随后是左、右、上、下四个偏移点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickArea {
    center: ScreenPoint,
    radius: i32,
}

impl ClickArea {
    /// 创建区域
    ///
    /// `radius` 为 0 时只包含精确点
    pub fn new(center: ScreenPoint, radius: u32) -> Self {
        Self {
            center,
            radius: i32::try_from(radius).unwrap_or(i32::MAX),
        }
    }

    pub fn center(&self) -> ScreenPoint {
        self.center
    }

    /// 按尝试顺序列出所有候选点
    pub fn points(&self) -> Vec<ScreenPoint> {
        if self.radius == 0 {
            return vec![self.center];
        }

        let r = self.radius;
        vec![
            self.center,
            self.center.offset(-r, 0),
            self.center.offset(r, 0),
            self.center.offset(0, -r),
            self.center.offset(0, r),
        ]
    }
}

/// 鼠标模拟器
///
/// 封装 enigo 库的指针操作
pub struct MouseSimulator {
    enigo: Enigo,
}

impl MouseSimulator {
    /// 创建新的鼠标模拟器
    ///
    /// # Errors
    ///
    /// - `InputError::MouseSimulationFailed` - 初始化失败
    pub fn new() -> InputResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            InputError::MouseSimulationFailed(format!("Failed to initialize: {}", e))
        })?;

        tracing::debug!("Mouse simulator initialized");

        Ok(Self { enigo })
    }

    /// 当前指针位置
    ///
    /// 校准时用于记录用户悬停的位置
    pub fn location(&self) -> InputResult<ScreenPoint> {
        let (x, y) = self
            .enigo
            .location()
            .map_err(|e| InputError::MouseSimulationFailed(format!("Failed to read location: {}", e)))?;

        Ok(ScreenPoint::new(x, y))
    }

    /// 移动指针到绝对坐标
    pub fn move_to(&mut self, point: ScreenPoint) -> InputResult<()> {
        self.enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(|e| InputError::MouseSimulationFailed(format!("Failed to move to {}: {}", point, e)))
    }

    /// 在指定坐标单击左键
    pub fn click_at(&mut self, point: ScreenPoint) -> InputResult<()> {
        tracing::debug!(x = point.x, y = point.y, "Clicking");

        self.move_to(point)?;
        thread::sleep(Duration::from_millis(POINTER_SETTLE_MS));
        self.click()
    }

    /// 在指定坐标快速连击
    ///
    /// 三连击用于选中整段文本，两次点击之间的间隔必须足够短
    pub fn multi_click_at(
        &mut self,
        point: ScreenPoint,
        count: u32,
        interval: Duration,
    ) -> InputResult<()> {
        tracing::debug!(x = point.x, y = point.y, count, "Multi-clicking");

        self.move_to(point)?;
        thread::sleep(Duration::from_millis(POINTER_SETTLE_MS));

        for i in 0..count {
            if i > 0 {
                thread::sleep(interval);
            }
            self.click()?;
        }

        Ok(())
    }

    /// 从 `from` 按住左键拖到 `to`
    ///
    /// 拖拽失败时仍会尝试释放左键
    pub fn drag(&mut self, from: ScreenPoint, to: ScreenPoint) -> InputResult<()> {
        tracing::debug!(%from, %to, "Dragging");

        self.move_to(from)?;
        thread::sleep(Duration::from_millis(POINTER_SETTLE_MS));
        self.button(Direction::Press)?;

        let moved = self.move_to(to);
        thread::sleep(Duration::from_millis(POINTER_SETTLE_MS));
        let released = self.button(Direction::Release);

        moved.and(released)
    }

    /// 单击：按下、短暂保持、释放
    fn click(&mut self) -> InputResult<()> {
        self.button(Direction::Press)?;
        thread::sleep(Duration::from_millis(CLICK_HOLD_MS));
        self.button(Direction::Release)
    }

    fn button(&mut self, direction: Direction) -> InputResult<()> {
        self.enigo
            .button(Button::Left, direction)
            .map_err(|e| InputError::MouseSimulationFailed(format!("Failed to {:?} left button: {}", direction, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_point_offset() {
        let p = ScreenPoint::new(100, 200);
        assert_eq!(p.offset(-2, 3), ScreenPoint::new(98, 203));
        assert_eq!(p.to_string(), "(100, 200)");
    }

    #[test]
    fn test_click_area_cross_pattern() {
        let area = ClickArea::new(ScreenPoint::new(10, 10), 2);
        let points = area.points();

        assert_eq!(points.len(), 5);
        assert_eq!(points[0], ScreenPoint::new(10, 10));
        assert_eq!(points[1], ScreenPoint::new(8, 10));
        assert_eq!(points[2], ScreenPoint::new(12, 10));
        assert_eq!(points[3], ScreenPoint::new(10, 8));
        assert_eq!(points[4], ScreenPoint::new(10, 12));
    }

    #[test]
    fn test_click_area_zero_radius() {
        let area = ClickArea::new(ScreenPoint::new(5, 5), 0);
        assert_eq!(area.points(), vec![ScreenPoint::new(5, 5)]);
    }

    #[test]
    fn test_mouse_simulator_new() {
        // 无头环境中可能失败，仅保证不会 panic
        if let Err(e) = MouseSimulator::new() {
            assert!(e.to_string().contains("Mouse simulation failed"));
        }
    }
}
