//! End-to-end replay tests
//!
//! These tests verify that:
//! - JSON scripts drive every recognizer kind
//! - Configuration files change recognizer behavior
//! - Reports serialize for `--json` output

use gestura_cli::{run, GesturaConfig, RecognizerKind, ReplayScript};
use std::fs;

const HOVER_SCRIPT: &str = r#"{
    "until": 3000,
    "steps": [
        { "timestamp": 0, "type": "pointer_enter", "position": { "x": 5, "y": 5 } },
        { "timestamp": 40, "type": "pointer_move", "position": { "x": 7, "y": 6 } },
        { "timestamp": 1000, "type": "content_enter" },
        { "timestamp": 1010, "type": "pointer_leave" },
        { "timestamp": 2000, "type": "content_leave" }
    ]
}"#;

/// Hover opens after settling and closes after leaving the content
#[test]
fn test_hover_script_timeline() {
    let script = ReplayScript::from_json(HOVER_SCRIPT).unwrap();
    let report = run(RecognizerKind::HoverIntent, &GesturaConfig::default(), &script);

    let open: Vec<u64> = report.events_named("open").map(|e| e.at).collect();
    let close: Vec<u64> = report.events_named("close").map(|e| e.at).collect();
    assert_eq!(open, vec![400]);
    assert_eq!(close, vec![2100]);
}

/// A swipe script fires the generic then the directional callback
#[test]
fn test_swipe_script_order() {
    let script = ReplayScript::from_json(
        r#"{
            "steps": [
                { "timestamp": 0, "type": "pointer_down", "position": { "x": 200, "y": 100 }, "pointer": "touch" },
                { "timestamp": 60, "type": "pointer_move", "position": { "x": 150, "y": 104 }, "pointer": "touch" },
                { "timestamp": 90, "type": "pointer_up", "position": { "x": 120, "y": 105 }, "pointer": "touch" }
            ]
        }"#,
    )
    .unwrap();
    let report = run(RecognizerKind::Swipe, &GesturaConfig::default(), &script);

    let names: Vec<&str> = report
        .entries
        .iter()
        .map(|e| e.event.as_str())
        .filter(|name| name.starts_with("swipe"))
        .collect();
    assert_eq!(names, vec!["swipe_start", "swipe", "swipe_left", "swipe_end"]);
    assert_eq!(report.until, 90 + 5_000);
}

/// A longer threshold from a config file delays completion
#[test]
fn test_config_file_changes_threshold() {
    let dir = std::env::temp_dir().join(format!("gestura-replay-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("gestura.toml"),
        "[long_press]\nthreshold_ms = 900\nready_delay_ms = 700\n\n[replay]\nhaptics = false\n",
    )
    .unwrap();
    let config = GesturaConfig::load(&dir).unwrap();
    fs::remove_dir_all(&dir).ok();

    let script = ReplayScript::from_json(
        r#"{ "until": 2000, "steps": [ { "timestamp": 100, "type": "key_down", "key": "enter" } ] }"#,
    )
    .unwrap();
    let report = run(RecognizerKind::LongPress, &config, &script);

    let complete: Vec<u64> = report.events_named("complete").map(|e| e.at).collect();
    assert_eq!(complete, vec![1_000]);
    assert_eq!(report.events_named("haptic").count(), 0);
}

/// A rejected confirmation springs back and reports the error
#[test]
fn test_drag_confirm_rejection() {
    let script = ReplayScript::from_json(
        r#"{
            "until": 4000,
            "steps": [
                { "timestamp": 0, "type": "pointer_down", "position": { "x": 0, "y": 0 } },
                { "timestamp": 500, "type": "pointer_move", "position": { "x": 240, "y": 0 } },
                { "timestamp": 500, "type": "pointer_up", "position": { "x": 240, "y": 0 } },
                { "timestamp": 800, "type": "settle", "ok": false }
            ]
        }"#,
    )
    .unwrap();
    let report = run(RecognizerKind::DragConfirm, &GesturaConfig::default(), &script);

    assert_eq!(report.events_named("confirm").count(), 1);
    assert_eq!(report.events_named("error").map(|e| e.at).collect::<Vec<_>>(), vec![800]);
    assert_eq!(report.events_named("complete").count(), 0);
    assert!(report.final_state.contains("Idle"), "{}", report.final_state);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["recognizer"], "drag-confirm");
}
