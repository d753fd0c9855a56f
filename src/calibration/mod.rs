//! Five-point calibration: reference gaze samples and the raw → canonical transform.
//!
//! The operator looks at five markers in a fixed order (`center`, `top_mid`,
//! `left_mid`, `bottom_mid`, `right_mid`). A raw sample's offset from the center
//! reference is divided by the offset of the edge reference on the same side,
//! then re-centered into the unit square.

mod store;

pub use store::CalibrationStore;

use crate::gaze::Point;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io;

pub const DEFAULT_CALIBRATION_FILE: &str = "calibration_data.json";

/// Below this a reference offset is treated as degenerate.
const MIN_REFERENCE_SPAN: f64 = 1e-9;

/// Calibration marker, in capture order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferencePoint {
    Center,
    TopMid,
    LeftMid,
    BottomMid,
    RightMid,
}

impl ReferencePoint {
    pub const CAPTURE_ORDER: [ReferencePoint; 5] = [
        ReferencePoint::Center,
        ReferencePoint::TopMid,
        ReferencePoint::LeftMid,
        ReferencePoint::BottomMid,
        ReferencePoint::RightMid,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReferencePoint::Center => "center",
            ReferencePoint::TopMid => "top_mid",
            ReferencePoint::LeftMid => "left_mid",
            ReferencePoint::BottomMid => "bottom_mid",
            ReferencePoint::RightMid => "right_mid",
        }
    }

    /// Case-insensitive, matching what the display accepts on the wire.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::CAPTURE_ORDER
            .into_iter()
            .find(|point| point.label().eq_ignore_ascii_case(label))
    }

    /// Operator prompt shown before capture.
    pub fn prompt(self) -> String {
        format!("Look at the {}", self.label().replace('_', " "))
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ReferencePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ReferencePoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("calibration profile is incomplete; missing {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },

    #[error("no calibration profile loaded; run calibration first")]
    NotLoaded,

    #[error("expected to capture '{expected}' next, got '{got}'")]
    OutOfOrder {
        expected: ReferencePoint,
        got: ReferencePoint,
    },

    #[error("all reference points are already captured; save or restart calibration")]
    AlreadyCaptured,

    #[error("reference point '{label}' is outside [0, 1]: ({x}, {y})")]
    OutOfRange { label: String, x: f64, y: f64 },

    #[error("unknown reference point '{0}' in calibration file")]
    UnknownLabel(String),

    #[error("gaze source ended before '{0}' was captured")]
    SourceExhausted(ReferencePoint),

    #[error("calibration I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("calibration file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk layout; field order is the capture order.
#[derive(Serialize)]
struct ProfileFile {
    center: Point,
    top_mid: Point,
    left_mid: Point,
    bottom_mid: Point,
    right_mid: Point,
}

/// A complete set of reference points. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationProfile {
    points: [Point; 5],
}

impl CalibrationProfile {
    /// Build from captured points; every reference label must be present.
    pub fn from_points<I>(points: I) -> Result<Self, CalibrationError>
    where
        I: IntoIterator<Item = (ReferencePoint, Point)>,
    {
        let mut slots: [Option<Point>; 5] = [None; 5];
        for (reference, point) in points {
            if !point.in_unit_square() {
                return Err(CalibrationError::OutOfRange {
                    label: reference.label().to_string(),
                    x: point.x,
                    y: point.y,
                });
            }
            slots[reference.index()] = Some(point);
        }

        let missing: Vec<&'static str> = ReferencePoint::CAPTURE_ORDER
            .into_iter()
            .filter(|reference| slots[reference.index()].is_none())
            .map(ReferencePoint::label)
            .collect();
        if !missing.is_empty() {
            return Err(CalibrationError::Incomplete { missing });
        }

        let mut points = [Point::default(); 5];
        for (slot, value) in points.iter_mut().zip(slots) {
            *slot = value.unwrap_or_default();
        }
        Ok(Self { points })
    }

    pub fn point(&self, reference: ReferencePoint) -> Point {
        self.points[reference.index()]
    }

    /// Map a raw sample into the canonical unit square.
    pub fn transform(&self, raw: Point) -> Point {
        let center = self.point(ReferencePoint::Center);
        let top = self.point(ReferencePoint::TopMid);
        let left = self.point(ReferencePoint::LeftMid);
        let bottom = self.point(ReferencePoint::BottomMid);
        let right = self.point(ReferencePoint::RightMid);

        let dx = raw.x - center.x;
        let dy = raw.y - center.y;

        let ref_x = if dx >= 0.0 {
            right.x - center.x
        } else {
            -(left.x - center.x)
        };
        let ref_y = if dy > 0.0 {
            top.y - center.y
        } else {
            -(bottom.y - center.y)
        };

        Point {
            x: recenter(ratio(dx, ref_x)),
            y: recenter(ratio(dy, ref_y)),
        }
    }

    pub fn to_json(&self) -> Result<String, CalibrationError> {
        let file = ProfileFile {
            center: self.point(ReferencePoint::Center),
            top_mid: self.point(ReferencePoint::TopMid),
            left_mid: self.point(ReferencePoint::LeftMid),
            bottom_mid: self.point(ReferencePoint::BottomMid),
            right_mid: self.point(ReferencePoint::RightMid),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn from_json(text: &str) -> Result<Self, CalibrationError> {
        let raw: HashMap<String, Point> = serde_json::from_str(text)?;
        let mut points = Vec::with_capacity(raw.len());
        for (label, point) in raw {
            let reference =
                ReferencePoint::parse(&label).ok_or(CalibrationError::UnknownLabel(label))?;
            points.push((reference, point));
        }
        Self::from_points(points)
    }
}

fn ratio(offset: f64, reference: f64) -> f64 {
    if reference.abs() < MIN_REFERENCE_SPAN {
        0.0
    } else {
        offset / reference
    }
}

fn recenter(norm: f64) -> f64 {
    (0.5 + norm / 2.0).clamp(0.0, 1.0)
}
