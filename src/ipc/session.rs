use super::sink::EventSink;
use crate::engine::{EngineEvent, SelectionEngine};
use crate::label_stream::{spawn_line_reader, LabelServer, ServerHandle, StreamEvent};
use crate::log_debug;
use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io;
use std::thread::{self, JoinHandle};

pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Counters reported when a session ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub labels: u64,
    pub connections: u64,
    pub shutdown_requested: bool,
}

/// Drain `rx` into the engine, strictly in arrival order, until every sender
/// is gone or a producer sends `exit`. A snapshot follows each label.
pub fn run_engine_loop(
    engine: &mut SelectionEngine,
    rx: &Receiver<StreamEvent>,
    sink: &mut dyn EventSink,
) -> SessionSummary {
    let mut summary = SessionSummary::default();
    for message in rx.iter() {
        match message {
            StreamEvent::Connected(peer) => {
                summary.connections += 1;
                sink.emit(&EngineEvent::ProducerConnected { peer });
            }
            StreamEvent::Disconnected(peer) => {
                sink.emit(&EngineEvent::ProducerDisconnected { peer });
            }
            StreamEvent::Line(label) => {
                summary.labels += 1;
                let events = engine.process(&label);
                let shutdown = events.contains(&EngineEvent::Shutdown);
                for event in &events {
                    sink.emit(event);
                }
                if shutdown {
                    summary.shutdown_requested = true;
                    log_debug("shutdown requested over the label stream");
                    break;
                }
                sink.emit(&EngineEvent::Snapshot(engine.snapshot()));
            }
        }
    }
    summary
}

/// An engine running on its own worker thread, fed through a bounded queue.
pub struct EngineHandle {
    tx: Sender<StreamEvent>,
    worker: JoinHandle<(SelectionEngine, SessionSummary)>,
}

impl EngineHandle {
    pub fn spawn<S>(engine: SelectionEngine, sink: S, capacity: usize) -> io::Result<Self>
    where
        S: EventSink + 'static,
    {
        let (tx, rx) = bounded(capacity.max(1));
        let worker = thread::Builder::new()
            .name("gazekey-engine".to_string())
            .spawn(move || {
                let mut engine = engine;
                let mut sink = sink;
                let summary = run_engine_loop(&mut engine, &rx, &mut sink);
                (engine, summary)
            })?;
        Ok(Self { tx, worker })
    }

    /// Queue one label. Blocks while the queue is full; `false` once the
    /// worker has stopped.
    pub fn on_zone_label(&self, label: impl Into<String>) -> bool {
        self.tx.send(StreamEvent::Line(label.into())).is_ok()
    }

    /// Another producer handle into the same queue.
    pub fn sender(&self) -> Sender<StreamEvent> {
        self.tx.clone()
    }

    /// Close this handle's side of the queue and wait for the worker.
    pub fn join(self) -> Result<(SelectionEngine, SessionSummary)> {
        let Self { tx, worker } = self;
        drop(tx);
        worker
            .join()
            .map_err(|_| anyhow!("engine worker panicked"))
    }
}

/// Where the receiver takes labels from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelInput {
    /// `host:port` to listen on.
    Tcp(String),
    Stdin,
}

#[derive(Debug, Clone)]
pub struct ReceiverOptions {
    pub input: LabelInput,
    pub queue_capacity: usize,
}

/// Start the transport, announce readiness, and run the engine on the
/// calling thread until the input closes or `exit` arrives.
pub fn run_receiver(
    mut engine: SelectionEngine,
    options: &ReceiverOptions,
    sink: &mut dyn EventSink,
) -> Result<(SelectionEngine, SessionSummary)> {
    let (tx, rx) = bounded(options.queue_capacity.max(1));
    let (source, _server) = match &options.input {
        LabelInput::Stdin => {
            spawn_stdin_reader(tx).context("failed to start stdin reader")?;
            ("stdin".to_string(), None)
        }
        LabelInput::Tcp(addr) => {
            let server = LabelServer::bind(addr.as_str())
                .with_context(|| format!("failed to listen for labels on {addr}"))?;
            let local = server.local_addr();
            let handle: ServerHandle = server.spawn(tx).context("failed to start label server")?;
            (format!("tcp://{local}"), Some(handle))
        }
    };

    sink.emit(&EngineEvent::Ready {
        version: env!("CARGO_PKG_VERSION"),
        source,
        threshold: engine.config().threshold,
    });
    let summary = run_engine_loop(&mut engine, &rx, sink);
    tracing::info!(
        target: "gazekey::session",
        labels = summary.labels,
        connections = summary.connections,
        shutdown = summary.shutdown_requested,
        "session ended"
    );
    Ok((engine, summary))
}

/// Treat stdin as a single producer, one label per line.
pub fn spawn_stdin_reader(tx: Sender<StreamEvent>) -> io::Result<JoinHandle<()>> {
    spawn_line_reader(io::stdin(), "stdin".to_string(), tx)
}
