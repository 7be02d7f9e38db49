//! Coordinate representations for rendered ephemeris output

pub mod polar;

pub use self::polar::{normalize_angle, PolarState};
