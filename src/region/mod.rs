//! Zone geometry for the circular keyboard.
//!
//! The canonical unit square is split into a center disc, a ring of 20
//! angular sectors, and four corner zones outside the ring. Canonical y grows
//! toward the `top_mid` calibration point, so angle 90° is "up".


use anyhow::{bail, Result};
use serde::{Serialize, Serializer};
use std::fmt;

pub const SECTOR_COUNT: usize = 20;
pub const DEFAULT_INNER_RADIUS: f64 = 0.25;
pub const DEFAULT_OUTER_RADIUS: f64 = 0.47;
/// Largest distance from the center inside the unit square.
pub const MAX_RADIUS: f64 = std::f64::consts::FRAC_1_SQRT_2;

const SEVENTH: f64 = 360.0 / 7.0;

/// Sector start angles in degrees; each sector ends where the next begins.
const SECTOR_STARTS: [f64; SECTOR_COUNT] = [
    0.0,
    36.0,
    45.0,
    SEVENTH,
    72.0,
    2.0 * SEVENTH,
    108.0,
    135.0,
    144.0,
    3.0 * SEVENTH,
    180.0,
    4.0 * SEVENTH,
    216.0,
    225.0,
    252.0,
    5.0 * SEVENTH,
    288.0,
    6.0 * SEVENTH,
    315.0,
    324.0,
];

const SECTOR_LABELS: [&str; SECTOR_COUNT] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20",
];

/// Outer zones, named by where they sit on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Corner {
    /// x < 0.5, y ≥ 0.5
    TopLeft,
    /// x ≥ 0.5, y ≥ 0.5
    TopRight,
    /// x < 0.5, y < 0.5
    BottomLeft,
    /// x ≥ 0.5, y < 0.5
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    fn from_point(x: f64, y: f64) -> Self {
        match (x < 0.5, y < 0.5) {
            (true, true) => Corner::BottomLeft,
            (false, true) => Corner::BottomRight,
            (true, false) => Corner::TopLeft,
            (false, false) => Corner::TopRight,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Corner::TopLeft => "21",
            Corner::TopRight => "22",
            Corner::BottomLeft => "23",
            Corner::BottomRight => "24",
        }
    }
}

/// A classified gaze zone. Its wire form is the decimal label `"1"`..`"25"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Zone {
    /// Ring sector, 1..=20 counted from angle 0 toward 90°.
    Sector(u8),
    Center,
    Corner(Corner),
}

impl Zone {
    pub const CENTER_LABEL: &'static str = "25";

    pub fn label(self) -> &'static str {
        match self {
            Zone::Sector(n) => SECTOR_LABELS
                .get(usize::from(n).wrapping_sub(1))
                .copied()
                .unwrap_or("?"),
            Zone::Center => Self::CENTER_LABEL,
            Zone::Corner(corner) => corner.label(),
        }
    }

    /// Parse a wire label. Anything outside `"1"`..`"25"` yields `None`.
    pub fn parse(label: &str) -> Option<Self> {
        let value: u8 = label.trim().parse().ok()?;
        match value {
            1..=20 => Some(Zone::Sector(value)),
            21 => Some(Zone::Corner(Corner::TopLeft)),
            22 => Some(Zone::Corner(Corner::TopRight)),
            23 => Some(Zone::Corner(Corner::BottomLeft)),
            24 => Some(Zone::Corner(Corner::BottomRight)),
            25 => Some(Zone::Center),
            _ => None,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Zone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One angular bucket of the middle ring, `[start, end)` in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub start: f64,
    pub end: f64,
    pub zone: Zone,
}

/// Ring radii plus the sector partition.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTable {
    inner_radius: f64,
    outer_radius: f64,
    sectors: Vec<Sector>,
}

impl Default for RegionTable {
    fn default() -> Self {
        Self {
            inner_radius: DEFAULT_INNER_RADIUS,
            outer_radius: DEFAULT_OUTER_RADIUS,
            sectors: standard_sectors(),
        }
    }
}

impl RegionTable {
    /// Bumped whenever the sector boundaries change.
    pub const VERSION: u32 = 2;

    pub fn with_radii(inner_radius: f64, outer_radius: f64) -> Result<Self> {
        if !(inner_radius > 0.0 && inner_radius < outer_radius) {
            bail!(
                "inner radius must be > 0 and below the outer radius, got {inner_radius} / {outer_radius}"
            );
        }
        if outer_radius > MAX_RADIUS {
            bail!("outer radius must be <= {MAX_RADIUS:.3}, got {outer_radius}");
        }
        Ok(Self {
            inner_radius,
            outer_radius,
            sectors: standard_sectors(),
        })
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Map a canonical point to its zone. Total over every input.
    pub fn classify(&self, x: f64, y: f64) -> Zone {
        let dx = x - 0.5;
        let dy = y - 0.5;
        let dist = dx.hypot(dy);
        if dist <= self.inner_radius {
            Zone::Center
        } else if dist <= self.outer_radius {
            self.sector_at(angle_degrees(dx, dy)).zone
        } else {
            Zone::Corner(Corner::from_point(x, y))
        }
    }

    /// Sector containing `angle` (degrees in `[0, 360)`).
    pub fn sector_at(&self, angle: f64) -> &Sector {
        // sectors[0] starts at 0, so the index is always in range.
        let after = self.sectors.partition_point(|sector| sector.start <= angle);
        &self.sectors[after.saturating_sub(1)]
    }

    /// Confirm the sectors cover `[0, 360)` exactly once.
    pub fn check_partition(&self) -> Result<()> {
        let Some(first) = self.sectors.first() else {
            bail!("region table has no sectors");
        };
        if first.start != 0.0 {
            bail!("first sector starts at {} instead of 0", first.start);
        }
        for pair in self.sectors.windows(2) {
            if pair[0].end != pair[1].start {
                bail!(
                    "gap or overlap between sector {} and {}",
                    pair[0].zone,
                    pair[1].zone
                );
            }
            if pair[0].start >= pair[0].end {
                bail!("sector {} is empty or reversed", pair[0].zone);
            }
        }
        if let Some(last) = self.sectors.last() {
            if last.end != 360.0 || last.start >= last.end {
                bail!("last sector must end at 360, ends at {}", last.end);
            }
        }
        Ok(())
    }
}

fn standard_sectors() -> Vec<Sector> {
    (0..SECTOR_COUNT)
        .map(|index| Sector {
            start: SECTOR_STARTS[index],
            end: SECTOR_STARTS.get(index + 1).copied().unwrap_or(360.0),
            zone: Zone::Sector(index as u8 + 1),
        })
        .collect()
}

/// atan2 in degrees, folded into `[0, 360)`.
pub fn angle_degrees(dx: f64, dy: f64) -> f64 {
    let angle = dy.atan2(dx).to_degrees().rem_euclid(360.0);
    // rem_euclid can round tiny negative angles up to exactly 360.
    if angle >= 360.0 {
        0.0
    } else {
        angle
    }
}
