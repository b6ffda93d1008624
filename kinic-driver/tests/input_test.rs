//! 输入模块集成测试
//!
//! 依赖显示服务器的部分在无头环境中只验证错误类型

use kinic_driver_lib::input::{
    ClickArea, ClipboardManager, InputError, KeyStroke, KeyboardSimulator, ScreenPoint,
    TargetWindow, WindowInfo,
};

fn window(app_name: &str, exec_name: &str, title: &str) -> WindowInfo {
    WindowInfo {
        app_name: app_name.to_string(),
        title: title.to_string(),
        process_id: 1,
        exec_name: exec_name.to_string(),
        window_id: 1,
    }
}

// ==================== 坐标测试 ====================

#[test]
fn test_click_area_order() {
    let center = ScreenPoint::new(100, 200);
    let points = ClickArea::new(center, 5).points();

    assert_eq!(points.len(), 5);
    assert_eq!(points[0], center);
    assert_eq!(points[1], ScreenPoint::new(95, 200));
    assert_eq!(points[2], ScreenPoint::new(105, 200));
    assert_eq!(points[3], ScreenPoint::new(100, 195));
    assert_eq!(points[4], ScreenPoint::new(100, 205));
}

#[test]
fn test_click_area_zero_radius() {
    let center = ScreenPoint::new(-40, 10);
    assert_eq!(ClickArea::new(center, 0).points(), vec![center]);
}

#[test]
fn test_screen_point_display() {
    assert_eq!(ScreenPoint::new(-1920, 84).to_string(), "(-1920, 84)");
}

#[test]
fn test_offset_saturates() {
    let point = ScreenPoint::new(i32::MAX, 0).offset(10, -10);
    assert_eq!(point, ScreenPoint::new(i32::MAX, -10));
}

// ==================== 按键测试 ====================

#[test]
fn test_key_stroke_names() {
    assert_eq!(KeyStroke::ShiftTab.name(), "shift+tab");
    assert_eq!(KeyStroke::ContextMenu.name(), "shift+f10");
    assert!(KeyStroke::Copy.is_chord());
    assert!(!KeyStroke::Escape.is_chord());
}

#[test]
fn test_key_stroke_serialization() {
    let json = serde_json::to_string(&KeyStroke::SelectAll).unwrap();
    assert_eq!(json, "\"select_all\"");
}

// ==================== 宿主窗口匹配测试 ====================

#[test]
fn test_default_target_matches_chrome() {
    let target = TargetWindow::default();

    assert!(target.matches(&window("Google Chrome", "chrome", "Kinic")));
    assert!(target.matches(&window("Chromium", "chromium-browser", "New Tab")));
    assert!(!target.matches(&window("Firefox", "firefox", "Kinic")));
}

#[test]
fn test_target_matches_exec_name() {
    let target = TargetWindow::default();
    assert!(target.matches(&window("", "chrome.exe", "")));
}

#[test]
fn test_target_title_filter() {
    let target = TargetWindow {
        title_contains: Some("kinic".to_string()),
        ..TargetWindow::default()
    };

    assert!(target.matches(&window("Google Chrome", "chrome", "My Kinic Library")));
    assert!(!target.matches(&window("Google Chrome", "chrome", "Inbox")));
    assert!(target.describe().contains("title contains 'kinic'"));
}

// ==================== 错误类型测试 ====================

#[test]
fn test_focus_errors() {
    assert!(InputError::PermissionDenied.is_focus_error());
    assert!(InputError::TargetWindowNotFound("chrome".to_string()).is_focus_error());
    assert!(InputError::FocusFailed("timeout".to_string()).is_focus_error());
    assert!(!InputError::ClipboardFailed("locked".to_string()).is_focus_error());
    assert!(!InputError::KeyboardSimulationFailed("x".to_string()).is_focus_error());
}

#[test]
fn test_error_display() {
    let error = InputError::TargetWindowNotFound("chrome|chromium".to_string());
    assert!(error.to_string().contains("chrome|chromium"));
}

// ==================== 系统设备测试 ====================

#[test]
fn test_keyboard_simulator_creation() {
    // 在没有显示服务器的环境下可能失败
    match KeyboardSimulator::new() {
        Ok(_keyboard) => {}
        Err(e) => assert!(
            matches!(e, InputError::KeyboardSimulationFailed(_)),
            "Unexpected error type: {:?}",
            e
        ),
    }
}

#[test]
fn test_clipboard_manager_creation() {
    match ClipboardManager::new() {
        Ok(_clipboard) => {}
        Err(e) => assert!(
            matches!(e, InputError::ClipboardFailed(_)),
            "Unexpected error type: {:?}",
            e
        ),
    }
}
