use super::{GazeSource, Point};
use crate::calibration::{CalibrationError, CalibrationProfile, CalibrationStore, ReferencePoint};
use crate::label_stream::{connect_with_retry, DEFAULT_RECONNECT_DELAY};
use crate::log_debug;
use crate::region::{RegionTable, Zone};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Calibration transform followed by region classification.
#[derive(Debug)]
pub struct GazePipeline {
    store: CalibrationStore,
    table: RegionTable,
}

impl GazePipeline {
    pub fn new(store: CalibrationStore, table: RegionTable) -> Self {
        Self { store, table }
    }

    pub fn store(&self) -> &CalibrationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CalibrationStore {
        &mut self.store
    }

    pub fn table(&self) -> &RegionTable {
        &self.table
    }

    /// Canonical point for a raw sample.
    pub fn canonical(&self, raw: Point) -> Result<Point, CalibrationError> {
        self.store.transform(raw.x, raw.y)
    }

    pub fn classify(&self, raw: Point) -> Result<Zone, CalibrationError> {
        let point = self.canonical(raw)?;
        Ok(self.table.classify(point.x, point.y))
    }
}

/// Guided five-point capture. `announce` runs before each target so the caller
/// can prompt the operator and cue the display; `countdown` of live samples is
/// consumed before the capture so the reading reflects where the eye settled.
pub fn run_calibration<S, F>(
    store: &mut CalibrationStore,
    source: &mut S,
    countdown: Duration,
    mut announce: F,
) -> Result<CalibrationProfile, CalibrationError>
where
    S: GazeSource + ?Sized,
    F: FnMut(ReferencePoint),
{
    store.begin_recalibration()?;
    while let Some(reference) = store.next_reference() {
        announce(reference);
        settle(source, countdown)?;
        store.capture(source, reference)?;
    }
    Ok(store.save()?.clone())
}

fn settle<S: GazeSource + ?Sized>(source: &mut S, countdown: Duration) -> std::io::Result<()> {
    if countdown.is_zero() {
        return Ok(());
    }
    let deadline = Instant::now() + countdown;
    while Instant::now() < deadline {
        if source.next_sample()?.is_none() {
            break;
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ProducerOptions {
    /// `host:port` of the display.
    pub addr: String,
    pub reconnect_delay: Duration,
    /// Minimum spacing between labels; zero sends one per sample.
    pub send_interval: Duration,
}

impl ProducerOptions {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            send_interval: Duration::ZERO,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProducerStats {
    pub samples: u64,
    pub sent: u64,
    pub dropped: u64,
    pub reconnects: u64,
}

/// Classify samples and stream labels until the source ends or `stop` is set.
/// A label whose write fails is dropped; the connection is re-established with
/// a fixed delay and streaming resumes with the next sample.
pub fn run_producer<S>(
    pipeline: &GazePipeline,
    source: &mut S,
    options: &ProducerOptions,
    stop: &AtomicBool,
) -> Result<ProducerStats>
where
    S: GazeSource + ?Sized,
{
    let mut stats = ProducerStats::default();
    let Some(mut sender) = connect_with_retry(&options.addr, options.reconnect_delay, stop) else {
        return Ok(stats);
    };
    let mut last_sent: Option<Instant> = None;

    while !stop.load(Ordering::Relaxed) {
        let Some(raw) = source.next_sample()? else {
            break;
        };
        stats.samples += 1;
        if last_sent.is_some_and(|at| at.elapsed() < options.send_interval) {
            continue;
        }
        let zone = pipeline.classify(raw)?;
        last_sent = Some(Instant::now());

        match sender.send_line(zone.label()) {
            Ok(()) => stats.sent += 1,
            Err(err) => {
                stats.dropped += 1;
                tracing::warn!(
                    target: "gazekey::producer",
                    label = %zone,
                    error = %err,
                    "label dropped; reconnecting"
                );
                log_debug(&format!("label {zone} dropped: {err}"));
                match connect_with_retry(&options.addr, options.reconnect_delay, stop) {
                    Some(fresh) => {
                        sender = fresh;
                        stats.reconnects += 1;
                    }
                    None => break,
                }
            }
        }
    }
    sender.close();
    Ok(stats)
}
