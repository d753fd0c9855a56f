//! Display-side session: label queue, engine worker, and event output.
//!
//! Architecture:
//! - Transport threads (TCP readers or stdin) push labels into one bounded queue
//! - A single consumer owns the `SelectionEngine` and applies labels in order
//! - Events go to an `EventSink`: JSON lines, a status line, speech, or all three
//!
//! Protocol out:
//! - Each line is a JSON object tagged `{"event": "...", ...}`

mod session;
mod sink;


pub use session::{
    run_engine_loop, run_receiver, spawn_stdin_reader, EngineHandle, LabelInput,
    ReceiverOptions, SessionSummary, DEFAULT_QUEUE_CAPACITY,
};
pub use sink::{format_status, EventSink, JsonLinesSink, SinkSet, StatusLineSink};
