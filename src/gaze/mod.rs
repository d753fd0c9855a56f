//! Producer side: raw gaze samples in, zone labels out.
//!
//! Pupil detection lives outside this crate; the external tracker hands us
//! normalized `x y` pairs (usually over a pipe) and everything from there on
//! happens here: smoothing, calibration transform, classification, and
//! shipping labels to the display.

mod pipeline;
mod smoothing;
mod source;

pub use pipeline::{run_calibration, run_producer, GazePipeline, ProducerOptions, ProducerStats};
pub use smoothing::{Smoothed, Smoother, DEFAULT_SMOOTHING_WINDOW};
pub use source::{parse_sample, LineGazeSource};

use serde::{Deserialize, Serialize};
use std::io;

/// A 2D gaze coordinate. Raw samples and canonical points share this type.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn in_unit_square(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Anything that yields raw gaze samples one at a time.
pub trait GazeSource {
    /// `Ok(None)` once the source is exhausted.
    fn next_sample(&mut self) -> io::Result<Option<Point>>;
}

impl<S: GazeSource + ?Sized> GazeSource for Box<S> {
    fn next_sample(&mut self) -> io::Result<Option<Point>> {
        (**self).next_sample()
    }
}
