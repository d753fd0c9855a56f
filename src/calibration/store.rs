use super::{CalibrationError, CalibrationProfile, ReferencePoint};
use crate::gaze::{GazeSource, Point};
use crate::log_debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Holds the active profile plus any in-progress capture.
#[derive(Debug)]
pub struct CalibrationStore {
    path: PathBuf,
    profile: Option<CalibrationProfile>,
    captured: Vec<(ReferencePoint, Point)>,
}

impl CalibrationStore {
    /// A store bound to `path` with nothing loaded yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            profile: None,
            captured: Vec::new(),
        }
    }

    /// Load `path` if it exists. A missing file is not an error; a broken one is.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CalibrationError> {
        let mut store = Self::new(path);
        if store.path.exists() {
            store.load()?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> Option<&CalibrationProfile> {
        self.profile.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.profile.is_some()
    }

    pub fn load(&mut self) -> Result<&CalibrationProfile, CalibrationError> {
        let text = fs::read_to_string(&self.path)?;
        let profile = CalibrationProfile::from_json(&text)?;
        log_debug(&format!("calibration loaded from {}", self.path.display()));
        Ok(self.profile.insert(profile))
    }

    /// Forget the current profile and delete the file so a half-finished run
    /// can never be mistaken for a valid one.
    pub fn begin_recalibration(&mut self) -> Result<(), CalibrationError> {
        self.captured.clear();
        self.profile = None;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            log_debug(&format!(
                "removed previous calibration file {}",
                self.path.display()
            ));
        }
        Ok(())
    }

    /// The reference point the next `capture` call must name.
    pub fn next_reference(&self) -> Option<ReferencePoint> {
        ReferencePoint::CAPTURE_ORDER
            .get(self.captured.len())
            .copied()
    }

    /// Pull the next raw sample from `source` and record it for `reference`.
    pub fn capture<S>(
        &mut self,
        source: &mut S,
        reference: ReferencePoint,
    ) -> Result<Point, CalibrationError>
    where
        S: GazeSource + ?Sized,
    {
        let expected = self
            .next_reference()
            .ok_or(CalibrationError::AlreadyCaptured)?;
        if expected != reference {
            return Err(CalibrationError::OutOfOrder {
                expected,
                got: reference,
            });
        }
        let sample = source
            .next_sample()?
            .ok_or(CalibrationError::SourceExhausted(reference))?;
        if !sample.in_unit_square() {
            return Err(CalibrationError::OutOfRange {
                label: reference.label().to_string(),
                x: sample.x,
                y: sample.y,
            });
        }
        self.captured.push((reference, sample));
        tracing::info!(
            target: "gazekey::calibration",
            point = reference.label(),
            x = sample.x,
            y = sample.y,
            "reference captured"
        );
        Ok(sample)
    }

    /// Persist the captured points (full rewrite) and make them the active profile.
    pub fn save(&mut self) -> Result<&CalibrationProfile, CalibrationError> {
        let profile = CalibrationProfile::from_points(self.captured.iter().copied())?;
        self.write(&profile)?;
        self.captured.clear();
        Ok(self.profile.insert(profile))
    }

    /// Replace the active profile wholesale and persist it.
    pub fn replace(&mut self, profile: CalibrationProfile) -> Result<(), CalibrationError> {
        self.write(&profile)?;
        self.captured.clear();
        self.profile = Some(profile);
        Ok(())
    }

    pub fn transform(&self, raw_x: f64, raw_y: f64) -> Result<Point, CalibrationError> {
        let profile = self.profile.as_ref().ok_or(CalibrationError::NotLoaded)?;
        Ok(profile.transform(Point { x: raw_x, y: raw_y }))
    }

    fn write(&self, profile: &CalibrationProfile) -> Result<(), CalibrationError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, profile.to_json()?)?;
        log_debug(&format!("calibration saved to {}", self.path.display()));
        Ok(())
    }
}
