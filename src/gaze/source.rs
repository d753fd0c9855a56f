use super::{GazeSource, Point};
use crate::log_debug;
use std::io::{self, BufRead};

/// Reads one sample per line from the external tracker, e.g. `0.43 0.61` or `0.43,0.61`.
/// Blank lines and `#` comments are ignored; malformed lines are logged and skipped.
pub struct LineGazeSource<R> {
    reader: R,
    line: String,
    skipped: u64,
}

impl<R: BufRead> LineGazeSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            skipped: 0,
        }
    }

    /// Lines dropped because they did not parse.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<R: BufRead> GazeSource for LineGazeSource<R> {
    fn next_sample(&mut self) -> io::Result<Option<Point>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let trimmed = self.line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match parse_sample(trimmed) {
                Some(point) => return Ok(Some(point)),
                None => {
                    self.skipped += 1;
                    log_debug(&format!("skipping malformed gaze sample: {trimmed:?}"));
                }
            }
        }
    }
}

/// Parse `x y`, `x,y`, or `x, y` into a finite point.
pub fn parse_sample(text: &str) -> Option<Point> {
    let mut parts = text
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|part| !part.is_empty());
    let x: f64 = parts.next()?.parse().ok()?;
    let y: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Point { x, y })
}
