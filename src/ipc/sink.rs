use crate::engine::{EngineEvent, PanelSnapshot};
use crate::log_debug;
use std::io::{self, Write};

/// Receives engine events in order. Sinks run on the engine worker thread, so
/// anything slow belongs on its own thread.
pub trait EventSink: Send {
    fn emit(&mut self, event: &EngineEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&EngineEvent) + Send,
{
    fn emit(&mut self, event: &EngineEvent) {
        self(event)
    }
}

/// One JSON object per line: `{"event": "...", ...}`.
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: &EngineEvent) {
        match serde_json::to_string(event) {
            Ok(json) => {
                let _ = writeln!(self.writer, "{json}");
                let _ = self.writer.flush();
            }
            Err(err) => log_debug(&format!("failed to encode event: {err}")),
        }
    }
}

/// Human-readable view: a status line per change plus spoken text.
pub struct StatusLineSink<W> {
    writer: W,
    last_status: Option<String>,
}

impl<W: Write + Send> StatusLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last_status: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.writer, "{line}");
        let _ = self.writer.flush();
    }
}

impl StatusLineSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> EventSink for StatusLineSink<W> {
    fn emit(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::Snapshot(snapshot) => {
                let status = format_status(snapshot);
                if self.last_status.as_deref() != Some(status.as_str()) {
                    self.write_line(&status);
                    self.last_status = Some(status);
                }
            }
            EngineEvent::SpeakRequested { text } => self.write_line(&format!("speak: {text}")),
            EngineEvent::Ready { source, .. } => {
                self.write_line(&format!("gazekey ready ({source})"))
            }
            EngineEvent::ProducerConnected { peer } => {
                self.write_line(&format!("producer connected: {peer}"))
            }
            EngineEvent::ProducerDisconnected { peer } => {
                self.write_line(&format!("producer disconnected: {peer}"))
            }
            EngineEvent::CalibrationCue { point } => {
                self.write_line(&format!("calibration: look at {point}"))
            }
            _ => {}
        }
    }
}

/// `[PANEL] text_ | h 2/4`
pub fn format_status(snapshot: &PanelSnapshot) -> String {
    let mut line = format!("[{}] {}_", snapshot.panel, snapshot.display_text);
    if !snapshot.progress.is_empty() {
        line.push_str(" |");
        for entry in &snapshot.progress {
            line.push_str(&format!(
                " {} {}/{}",
                entry.candidate, entry.count, snapshot.threshold
            ));
        }
    }
    line
}

/// Fan one event out to several sinks, in order.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn EventSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for SinkSet {
    fn emit(&mut self, event: &EngineEvent) {
        for sink in &mut self.sinks {
            sink.emit(event);
        }
    }
}
