//! Dwell keyboard display: listens for zone labels, drives the selection
//! engine, and renders the panel state.
//!
//! # Architecture
//!
//! - Transport thread(s): accept the gaze sender over TCP (or read stdin)
//! - Main thread: feeds labels to the engine in arrival order
//! - Sinks: status line or JSON events on stdout, optional speech command

mod config;

use anyhow::Result;
use clap::Parser;
use gazekey::doctor::base_doctor_report;
use gazekey::ipc::{run_receiver, JsonLinesSink, SinkSet, StatusLineSink};
use gazekey::speech::SpeechHook;
use gazekey::telemetry::init_tracing;
use gazekey::{init_logging, install_panic_hook, log_debug, log_file_path};

use crate::config::ReceiverConfig;

fn main() -> Result<()> {
    let mut config = ReceiverConfig::parse();
    if config.app.doctor {
        let mut report = base_doctor_report(&config.app, "gazekey");
        report.section("Receiver");
        report.push_kv(
            "input",
            if config.stdin {
                "stdin".to_string()
            } else {
                format!("tcp://{}", config.listen_addr())
            },
        );
        report.push_kv("max_display_chars", config.max_display_chars);
        report.push_kv("queue_capacity", config.queue_capacity);
        report.push_kv(
            "output",
            if config.json_events {
                "json-events"
            } else {
                "status-line"
            },
        );
        report.push_kv("speak_cmd", config.speak_cmd.as_deref().unwrap_or("disabled"));
        println!("{}", report.render());
        return Ok(());
    }

    config.validate()?;
    init_logging(&config.app);
    init_tracing(&config.app);
    install_panic_hook();
    log_debug("=== gazekey display started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let engine = config.app.selection_engine(config.max_display_chars)?;
    let mut sinks = SinkSet::new();
    if config.json_events {
        sinks.push(JsonLinesSink::stdout());
    } else {
        sinks.push(StatusLineSink::stdout());
    }
    if let Some(cmd) = config.speak_cmd.as_deref() {
        log_debug(&format!("speech enabled via {cmd}"));
        sinks.push(SpeechHook::new(cmd));
    }

    let (engine, summary) = run_receiver(engine, &config.receiver_options(), &mut sinks)?;
    log_debug(&format!(
        "session ended: {} labels, {} connections, {} chars typed",
        summary.labels,
        summary.connections,
        engine.text().chars().count()
    ));
    Ok(())
}
