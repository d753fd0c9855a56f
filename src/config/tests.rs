use super::validation::sanitize_binary;
use super::{AppConfig, DEFAULT_PORT, DEFAULT_THRESHOLD};
use crate::engine::{Panel, Section};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let path = std::env::temp_dir().join(format!(
        "gazekey-config-{name}-{}-{nanos}.yaml",
        std::process::id()
    ));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn defaults_validate() {
    let mut cfg = AppConfig::parse_from(["test-app"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.threshold, DEFAULT_THRESHOLD);
    assert!(cfg.port == DEFAULT_PORT || std::env::var("GAZEKEY_PORT").is_ok());
    assert!(cfg.layout.is_none() || std::env::var("GAZEKEY_LAYOUT").is_ok());
}

#[test]
fn rejects_threshold_out_of_bounds() {
    let mut cfg = AppConfig::parse_from(["test-app", "--threshold", "0"]);
    assert!(cfg.validate().is_err());

    let mut cfg = AppConfig::parse_from(["test-app", "--threshold", "21"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_threshold_bounds() {
    let mut cfg = AppConfig::parse_from(["test-app", "--threshold", "1"]);
    assert!(cfg.validate().is_ok());

    let mut cfg = AppConfig::parse_from(["test-app", "--threshold", "20"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_inverted_radii() {
    let mut cfg = AppConfig::parse_from([
        "test-app",
        "--inner-radius",
        "0.4",
        "--outer-radius",
        "0.3",
    ]);
    let err = cfg.validate().unwrap_err();
    assert!(format!("{err:#}").contains("--inner-radius"));
}

#[test]
fn rejects_ring_past_canvas_corner() {
    let mut cfg = AppConfig::parse_from(["test-app", "--outer-radius", "0.8"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_custom_radii() {
    let mut cfg = AppConfig::parse_from([
        "test-app",
        "--inner-radius",
        "0.2",
        "--outer-radius",
        "0.5",
    ]);
    assert!(cfg.validate().is_ok());
    let table = cfg.region_table().unwrap();
    assert_eq!(table.inner_radius(), 0.2);
    assert_eq!(table.outer_radius(), 0.5);
}

#[test]
fn rejects_missing_layout_file() {
    let mut cfg = AppConfig::parse_from([
        "test-app",
        "--layout",
        "/definitely/not/here/layout.yaml",
    ]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_invalid_layout_file() {
    let path = temp_file("invalid", "main:\n  top: [1, 1]\n");
    let mut cfg = AppConfig::parse_from(["test-app", "--layout", path.to_str().unwrap()]);
    let err = cfg.validate().unwrap_err();
    assert!(format!("{err:#}").contains("--layout"));
    let _ = fs::remove_file(path);
}

#[test]
fn layout_file_drives_selection_engine() {
    let path = temp_file("valid", "main:\n  top: [1]\n  right: [19, 20, 2]\n");
    let mut cfg = AppConfig::parse_from([
        "test-app",
        "--layout",
        path.to_str().unwrap(),
        "--threshold",
        "2",
    ]);
    cfg.validate().unwrap();
    assert!(cfg.layout.as_ref().is_some_and(|p| p.is_absolute()));

    let mut engine = cfg.selection_engine(7).unwrap();
    engine.process("1");
    engine.process("1");
    assert_eq!(engine.panel(), Panel::Section(Section::Top));
    let _ = fs::remove_file(path);
}

#[test]
fn rejects_directory_as_calibration_file() {
    let mut cfg = AppConfig::parse_from([
        "test-app",
        "--calibration-file",
        std::env::temp_dir().to_str().unwrap(),
    ]);
    assert!(cfg.validate().is_err());
}

#[test]
fn logging_flags_combine() {
    let cfg = AppConfig::parse_from(["test-app", "--logs"]);
    assert!(cfg.logging_enabled());
    let cfg = AppConfig::parse_from(["test-app", "--logs", "--no-logs"]);
    assert!(!cfg.logging_enabled());
    let cfg = AppConfig::parse_from(["test-app", "--log-timings"]);
    assert!(cfg.logging_enabled());
}

#[test]
fn sanitize_binary_accepts_allowlist_case_insensitively() {
    let value = sanitize_binary("ESPEAK", "--speak-cmd", &["espeak", "say"]).unwrap();
    assert_eq!(value, "espeak");
}

#[test]
fn sanitize_binary_rejects_unknown_name_and_empty() {
    assert!(sanitize_binary("rm", "--speak-cmd", &["espeak"]).is_err());
    assert!(sanitize_binary("   ", "--speak-cmd", &["espeak"]).is_err());
}

#[cfg(unix)]
#[test]
fn sanitize_binary_rejects_non_executable_path() {
    let path = temp_file("not-executable", "echo hi\n");
    let err = sanitize_binary(path.to_str().unwrap(), "--speak-cmd", &["espeak"]).unwrap_err();
    assert!(err.to_string().contains("not executable"));
    let _ = fs::remove_file(path);
}
