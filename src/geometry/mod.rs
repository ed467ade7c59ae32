//! Inches to pixels conversion and rotated-box math shared by every consumer of view geometry.

pub mod bounds;
pub mod units;
