use super::*;
use std::fs;

#[test]
fn debug_log_respects_content_flag() {
    let marker = format!("gazekey-log-marker-{}", std::process::id());
    set_logging_for_tests(true, false);
    log_debug(&format!("{marker} plain"));
    log_debug_content(&format!("{marker} secret"));
    set_logging_for_tests(false, false);
    log_debug(&format!("{marker} after-disable"));

    let contents = fs::read_to_string(log_file_path()).unwrap_or_default();
    assert!(contents.contains(&format!("{marker} plain")));
    assert!(!contents.contains(&format!("{marker} secret")));
    assert!(!contents.contains(&format!("{marker} after-disable")));
}

#[test]
fn log_paths_live_in_temp_dir_by_default() {
    if std::env::var("GAZEKEY_DEBUG_LOG").is_err() {
        assert!(log_file_path().starts_with(std::env::temp_dir()));
    }
    assert!(crash_log_path().ends_with("gazekey_crash.log"));
}
