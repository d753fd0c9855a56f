//! Newline-delimited label transport between the gaze producer and the display.
//!
//! Each message is one UTF-8 zone label followed by `\n`. The display listens,
//! the producer connects (and reconnects). Labels are never reordered, and a
//! label whose write fails is dropped rather than retried.

mod client;
mod framing;
mod server;

pub use client::{connect_with_retry, LabelSender, DEFAULT_RECONNECT_DELAY};
pub use framing::{LineFramer, LineReader, MAX_LINE_BYTES};
pub use server::{spawn_line_reader, LabelServer, ServerHandle, StreamEvent};

pub const DEFAULT_PORT: u16 = 5051;
