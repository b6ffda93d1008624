//! 设置与坐标持久化集成测试

use std::fs;

use kinic_driver_lib::state::config::{AdmissionMode, AppConfig, ConfigManager, OverlayDetection};
use kinic_driver_lib::state::{CoordinateStore, PointLabel};

// ==================== 坐标存储测试 ====================

#[test]
fn test_update_then_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coordinates.json");

    let store = CoordinateStore::open(&path, None).unwrap();
    assert!(!store.get().is_complete());

    store.update(PointLabel::Button, 962, 84).unwrap();
    store.update(PointLabel::ResponseArea, -1200, 520).unwrap();
    drop(store);

    let reopened = CoordinateStore::open(&path, None).unwrap();
    let button = reopened.point(PointLabel::Button).unwrap();
    let response = reopened.point(PointLabel::ResponseArea).unwrap();

    assert_eq!((button.x, button.y), (962, 84));
    // 多显示器下坐标可以为负
    assert_eq!((response.x, response.y), (-1200, 520));
}

#[test]
fn test_update_keeps_other_label() {
    let dir = tempfile::tempdir().unwrap();
    let store = CoordinateStore::open(dir.path().join("coordinates.json"), None).unwrap();

    store.update(PointLabel::Button, 1, 2).unwrap();
    let record = store.update(PointLabel::ResponseArea, 3, 4).unwrap();

    assert_eq!(record.button_x, Some(1));
    assert_eq!(record.response_y, Some(4));
}

#[test]
fn test_legacy_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("legacy").join("config.json");
    fs::create_dir_all(legacy.parent().unwrap()).unwrap();
    fs::write(
        &legacy,
        r#"{"kinic_x": 900, "kinic_y": 80, "ai_response_x": 650, "ai_response_y": 500}"#,
    )
    .unwrap();

    let path = dir.path().join("coordinates.json");
    let store = CoordinateStore::open(&path, Some(legacy.clone())).unwrap();

    assert!(store.get().is_complete());
    assert_eq!(store.point(PointLabel::Button).unwrap().x, 900);

    // 写入落到新位置，旧文件不变
    store.update(PointLabel::Button, 901, 81).unwrap();
    assert!(path.exists());
    let legacy_content = fs::read_to_string(&legacy).unwrap();
    assert!(legacy_content.contains("\"kinic_x\": 900"));
}

#[test]
fn test_new_file_takes_precedence_over_legacy() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("config.json");
    fs::write(&legacy, r#"{"kinic_x": 1, "kinic_y": 1}"#).unwrap();

    let path = dir.path().join("coordinates.json");
    fs::write(&path, r#"{"button_x": 2, "button_y": 2}"#).unwrap();

    let store = CoordinateStore::open(&path, Some(legacy)).unwrap();
    assert_eq!(store.point(PointLabel::Button).unwrap().x, 2);
}

#[test]
fn test_corrupt_coordinate_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coordinates.json");
    fs::write(&path, "not json").unwrap();

    assert!(CoordinateStore::open(&path, None).is_err());
}

#[test]
fn test_reload_picks_up_external_edit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coordinates.json");
    let store = CoordinateStore::open(&path, None).unwrap();

    fs::write(&path, r#"{"button_x": 10, "button_y": 20}"#).unwrap();
    store.reload().unwrap();

    assert_eq!(store.point(PointLabel::Button).unwrap().y, 20);
}

// ==================== 调优参数测试 ====================

#[test]
fn test_missing_settings_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let settings = ConfigManager::load(&dir.path().join("settings.json")).unwrap();

    assert_eq!(settings, AppConfig::default());
}

#[test]
fn test_partial_settings_fill_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{
            "timing": { "ai_extended_ms": 40000 },
            "serializer": { "mode": "reject" },
            "overlay_detection": "off"
        }"#,
    )
    .unwrap();

    let settings = ConfigManager::load(&path).unwrap();
    let defaults = AppConfig::default();

    assert_eq!(settings.timing.ai_extended_ms, 40_000);
    assert_eq!(settings.timing.ai_typical_ms, defaults.timing.ai_typical_ms);
    assert_eq!(settings.serializer.mode, AdmissionMode::Reject);
    assert_eq!(
        settings.serializer.queue_capacity,
        defaults.serializer.queue_capacity
    );
    assert_eq!(settings.overlay_detection, OverlayDetection::Off);
    assert_eq!(settings.budgets, defaults.budgets);
}

#[test]
fn test_invalid_settings_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "timing": { "ai_typical_ms": "slow" } }"#).unwrap();

    assert!(ConfigManager::load(&path).is_err());
}
