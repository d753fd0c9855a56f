//! Gaze-driven keyboard: calibrated eye position in, dwell-selected text out.
//!
//! The producer (`gaze_sender`) turns raw gaze samples into zone labels and
//! streams them over TCP; the display (`gazekey`) turns runs of labels into
//! panel changes, typed characters, and speech.

mod app;
pub mod calibration;
pub mod config;
pub mod doctor;
pub mod engine;
pub mod gaze;
pub mod ipc;
pub mod label_stream;
pub mod region;
pub mod speech;
pub mod telemetry;

pub use app::{
    crash_log_path, init_logging, install_panic_hook, log_debug, log_debug_content,
    log_file_path, log_panic,
};
