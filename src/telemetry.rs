use crate::config::AppConfig;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Structured event sources, one per subsystem.
pub const TRACE_TARGETS: [&str; 6] = [
    "gazekey::calibration",
    "gazekey::engine",
    "gazekey::producer",
    "gazekey::session",
    "gazekey::speech",
    "gazekey::stream",
];

/// JSON-lines trace file, overridable with `GAZEKEY_TRACE_LOG`.
pub fn tracing_log_path() -> PathBuf {
    env::var("GAZEKEY_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("gazekey_trace.jsonl"))
}

/// Only our own subsystems reach the trace file. `--log-timings` adds debug events.
pub fn trace_filter(config: &AppConfig) -> Targets {
    let level = if config.log_timings {
        Level::DEBUG
    } else {
        Level::INFO
    };
    TRACE_TARGETS
        .into_iter()
        .fold(Targets::new(), |targets, target| {
            targets.with_target(target, level)
        })
}

/// Install the structured subscriber once, only when logging is enabled.
pub fn init_tracing(config: &AppConfig) {
    if !config.logging_enabled() {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let path = tracing_log_path();
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(err) => {
                crate::log_debug(&format!(
                    "trace log {} unavailable: {err}",
                    path.display()
                ));
                return;
            }
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_target(true)
            .with_current_span(false)
            .with_span_list(false)
            .finish()
            .with(trace_filter(config));
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn filter_keeps_gazekey_targets_only() {
        let config = AppConfig::parse_from(["test-app", "--logs"]);
        let filter = trace_filter(&config);
        assert!(filter.would_enable("gazekey::engine", &Level::INFO));
        assert!(filter.would_enable("gazekey::stream", &Level::WARN));
        assert!(!filter.would_enable("gazekey::engine", &Level::DEBUG));
        assert!(!filter.would_enable("mio::poll", &Level::WARN));
    }

    #[test]
    fn log_timings_lowers_the_level() {
        let config = AppConfig::parse_from(["test-app", "--log-timings"]);
        let filter = trace_filter(&config);
        assert!(filter.would_enable("gazekey::producer", &Level::DEBUG));
    }
}
