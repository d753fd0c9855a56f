pub use crate::calibration::DEFAULT_CALIBRATION_FILE;
pub use crate::engine::{DEFAULT_THRESHOLD, MAX_THRESHOLD};
pub use crate::label_stream::DEFAULT_PORT;
pub use crate::region::{DEFAULT_INNER_RADIUS, DEFAULT_OUTER_RADIUS};

pub const MIN_THRESHOLD: u8 = 1;

// Layout files are a few hundred bytes; refuse anything that is clearly not one.
pub(super) const MAX_LAYOUT_BYTES: u64 = 64 * 1024;
