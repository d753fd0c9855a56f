//! Gaze producer: reads raw tracker samples on stdin, maps them through the
//! stored calibration, and streams zone labels to the display.
//!
//! Samples are one `x y` (or `x,y`) pair per line, normalized to the camera
//! frame. `--calibrate` runs the guided five-point capture instead.

use anyhow::{bail, Context, Result};
use clap::Parser;
use gazekey::calibration::ReferencePoint;
use gazekey::config::AppConfig;
use gazekey::doctor::base_doctor_report;
use gazekey::gaze::{
    run_calibration, run_producer, GazePipeline, GazeSource, LineGazeSource, ProducerOptions,
    Smoothed, DEFAULT_SMOOTHING_WINDOW,
};
use gazekey::label_stream::LabelSender;
use gazekey::telemetry::init_tracing;
use gazekey::{init_logging, install_panic_hook, log_debug};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

const MAX_SMOOTHING_WINDOW: usize = 30;

#[derive(Debug, Parser, Clone)]
#[command(about = "gazekey gaze sender", author, version)]
struct SenderConfig {
    #[command(flatten)]
    app: AppConfig,

    /// Host running the gazekey display
    #[arg(long, env = "GAZEKEY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Capture a new five-point calibration and exit
    #[arg(long, default_value_t = false)]
    calibrate: bool,

    /// Time given to settle on each calibration target (ms)
    #[arg(long = "capture-countdown-ms", default_value_t = 3000)]
    capture_countdown_ms: u64,

    /// Delay between reconnect attempts (ms)
    #[arg(long = "reconnect-delay-ms", default_value_t = 2000)]
    reconnect_delay_ms: u64,

    /// Minimum spacing between sent labels (ms)
    #[arg(long = "send-interval-ms", default_value_t = 500)]
    send_interval_ms: u64,

    /// Samples averaged before classification
    #[arg(long = "smoothing-window", default_value_t = DEFAULT_SMOOTHING_WINDOW)]
    smoothing_window: usize,

    /// Print labels to stdout instead of sending them
    #[arg(long = "dry-run", default_value_t = false)]
    dry_run: bool,
}

impl SenderConfig {
    fn validate(&mut self) -> Result<()> {
        self.app.validate()?;
        if !(1..=MAX_SMOOTHING_WINDOW).contains(&self.smoothing_window) {
            bail!("--smoothing-window must be between 1 and {MAX_SMOOTHING_WINDOW}");
        }
        if self.reconnect_delay_ms == 0 {
            bail!("--reconnect-delay-ms must be greater than zero");
        }
        if self.host.trim().is_empty() {
            bail!("--host cannot be empty");
        }
        Ok(())
    }

    fn display_addr(&self) -> String {
        format!("{}:{}", self.host.trim(), self.app.port)
    }

    fn producer_options(&self) -> ProducerOptions {
        ProducerOptions {
            addr: self.display_addr(),
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
            send_interval: Duration::from_millis(self.send_interval_ms),
        }
    }
}

/// Which stage failed, so the operator knows what to fix.
enum Failure {
    Config(anyhow::Error),
    Transport(anyhow::Error),
}

fn main() -> ExitCode {
    let mut config = SenderConfig::parse();
    if config.app.doctor {
        let mut report = base_doctor_report(&config.app, "gaze_sender");
        report.section("Sender");
        report.push_kv("display", config.display_addr());
        report.push_kv("smoothing_window", config.smoothing_window);
        report.push_kv("send_interval_ms", config.send_interval_ms);
        report.push_kv("reconnect_delay_ms", config.reconnect_delay_ms);
        report.push_kv("capture_countdown_ms", config.capture_countdown_ms);
        println!("{}", report.render());
        return ExitCode::SUCCESS;
    }

    match run(&mut config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Config(err)) => {
            eprintln!("gaze_sender: configuration error: {err:#}");
            ExitCode::from(2)
        }
        Err(Failure::Transport(err)) => {
            eprintln!("gaze_sender: transport error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &mut SenderConfig) -> Result<(), Failure> {
    config.validate().map_err(Failure::Config)?;
    init_logging(&config.app);
    init_tracing(&config.app);
    install_panic_hook();
    log_debug("=== gaze_sender started ===");

    let store = config.app.calibration_store().map_err(Failure::Config)?;
    let table = config.app.region_table().map_err(Failure::Config)?;
    let mut pipeline = GazePipeline::new(store, table);
    let stdin = io::stdin();

    if config.calibrate {
        let mut source = LineGazeSource::new(stdin.lock());
        return calibrate(config, &mut pipeline, &mut source);
    }

    if !pipeline.store().is_loaded() {
        return Err(Failure::Config(anyhow::anyhow!(
            "no calibration at {} (run gaze_sender --calibrate first)",
            pipeline.store().path().display()
        )));
    }

    let mut source = Smoothed::new(LineGazeSource::new(stdin.lock()), config.smoothing_window);
    if config.dry_run {
        return print_labels(&pipeline, &mut source).map_err(Failure::Transport);
    }

    let stop = AtomicBool::new(false);
    let stats = run_producer(&pipeline, &mut source, &config.producer_options(), &stop)
        .map_err(Failure::Transport)?;
    log_debug(&format!(
        "producer finished: {} samples, {} sent, {} dropped, {} reconnects",
        stats.samples, stats.sent, stats.dropped, stats.reconnects
    ));
    Ok(())
}

/// Capture problems (no samples, off-screen points, an unwritable file) are
/// configuration errors; the cue socket is best effort and never fails the run.
fn calibrate<S: GazeSource>(
    config: &SenderConfig,
    pipeline: &mut GazePipeline,
    source: &mut S,
) -> Result<(), Failure> {
    let mut display = match LabelSender::connect(&config.display_addr()) {
        Ok(sender) => Some(sender),
        Err(err) => {
            log_debug(&format!("calibration cues disabled: {err}"));
            None
        }
    };
    let countdown = Duration::from_millis(config.capture_countdown_ms);
    let announce = |reference: ReferencePoint| {
        eprintln!(
            "{} ({:.1}s)",
            reference.prompt(),
            countdown.as_secs_f64()
        );
        if let Some(sender) = display.as_mut() {
            if let Err(err) = sender.send_line(reference.label()) {
                log_debug(&format!("calibration cue {reference} not sent: {err}"));
            }
        }
    };
    let profile = run_calibration(pipeline.store_mut(), source, countdown, announce)
        .context("calibration failed")
        .map_err(Failure::Config)?;
    if let Some(sender) = display.as_mut() {
        sender.close();
    }

    eprintln!("Calibration saved to {}", pipeline.store().path().display());
    for reference in ReferencePoint::CAPTURE_ORDER {
        let point = profile.point(reference);
        eprintln!("  {reference}: ({:.3}, {:.3})", point.x, point.y);
    }
    Ok(())
}

fn print_labels<S: GazeSource>(pipeline: &GazePipeline, source: &mut S) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    while let Some(raw) = source.next_sample()? {
        let zone = pipeline.classify(raw)?;
        writeln!(out, "{zone}")?;
    }
    out.flush()?;
    Ok(())
}
