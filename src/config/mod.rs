//! Command-line parsing and validation helpers.

mod defaults;
#[cfg(test)]
mod tests;
mod validation;

use clap::Parser;
use std::path::PathBuf;

pub use defaults::{
    DEFAULT_CALIBRATION_FILE, DEFAULT_INNER_RADIUS, DEFAULT_OUTER_RADIUS, DEFAULT_PORT,
    DEFAULT_THRESHOLD, MAX_THRESHOLD, MIN_THRESHOLD,
};
pub use validation::sanitize_binary;

/// Options shared by the display and the gaze sender.
#[derive(Debug, Parser, Clone)]
#[command(about = "gazekey", author, version)]
pub struct AppConfig {
    /// TCP port of the label stream
    #[arg(long, env = "GAZEKEY_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Consecutive matching labels needed to commit a selection
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: u8,

    /// Radius of the center zone (canonical units)
    #[arg(long = "inner-radius", default_value_t = DEFAULT_INNER_RADIUS)]
    pub inner_radius: f64,

    /// Outer radius of the sector ring (canonical units)
    #[arg(long = "outer-radius", default_value_t = DEFAULT_OUTER_RADIUS)]
    pub outer_radius: f64,

    /// Where the five-point calibration profile is stored
    #[arg(
        long = "calibration-file",
        env = "GAZEKEY_CALIBRATION",
        default_value = DEFAULT_CALIBRATION_FILE
    )]
    pub calibration_file: PathBuf,

    /// YAML panel layout overriding the standard sector assignments
    #[arg(long, env = "GAZEKEY_LAYOUT")]
    pub layout: Option<PathBuf>,

    /// Print environment diagnostics and exit
    #[arg(long = "doctor", default_value_t = false)]
    pub doctor: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "GAZEKEY_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "GAZEKEY_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging typed text (debug log only)
    #[arg(
        long = "log-content",
        env = "GAZEKEY_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,
}

impl AppConfig {
    pub fn logging_enabled(&self) -> bool {
        (self.logs || self.log_timings) && !self.no_logs
    }
}
