use super::{GazeSource, Point};
use std::collections::VecDeque;
use std::io;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Moving average over the most recent raw samples.
#[derive(Debug, Clone)]
pub struct Smoother {
    window: usize,
    samples: VecDeque<Point>,
}

impl Smoother {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            samples: VecDeque::with_capacity(window),
        }
    }

    pub fn push(&mut self, sample: Point) -> Point {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        let count = self.samples.len() as f64;
        let (sum_x, sum_y) = self
            .samples
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point {
            x: sum_x / count,
            y: sum_y / count,
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Wraps a source so every sample comes out averaged.
pub struct Smoothed<S> {
    inner: S,
    smoother: Smoother,
}

impl<S: GazeSource> Smoothed<S> {
    pub fn new(inner: S, window: usize) -> Self {
        Self {
            inner,
            smoother: Smoother::new(window),
        }
    }
}

impl<S: GazeSource> GazeSource for Smoothed<S> {
    fn next_sample(&mut self) -> io::Result<Option<Point>> {
        Ok(self
            .inner
            .next_sample()?
            .map(|sample| self.smoother.push(sample)))
    }
}
