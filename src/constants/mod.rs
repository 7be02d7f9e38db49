//! Constants module for ephemeris decoding and coordinate rendering

use std::f64::consts::PI;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// First day of Gregorian calendar in Julian day number (1582-10-15)
pub const GREGORIAN_START: i32 = 2_299_161;

// Angles
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;

// Astronomical distances
/// Astronomical Unit in kilometers
pub const AU_KM: f64 = 149_597_870.700;

// Ephemeris file layout
/// Size in bytes of every record in a DE binary file, header included
pub const RECORD_SIZE: usize = 8144;
/// Number of double-precision coefficients decoded from each data record
pub const COEFF_COUNT: usize = 1018;
/// Size of a double-precision value (bytes)
pub const DOUBLE_SIZE: usize = 8;
/// Size of a 32-bit integer field (bytes)
pub const INT_SIZE: usize = 4;
/// Number of body slots in the header layout table
pub const LAYOUT_SLOTS: usize = 13;
/// Number of rows (offset, count, sub-intervals) in the header layout table
pub const LAYOUT_ROWS: usize = 3;

// Path resolution
/// Environment variable naming a directory that holds ephemeris files
pub const EPHE_PATH_ENV: &str = "SE_EPHE_PATH";
/// Relative directory searched after the environment variable
pub const DEFAULT_EPHE_DIR: &str = "./ephe";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_holds_all_coefficients() {
        assert_eq!(COEFF_COUNT * DOUBLE_SIZE, RECORD_SIZE);
    }

    #[test]
    fn test_angle_factors() {
        assert!((PI * RAD2DEG - 180.0).abs() < 1e-12);
        assert!((TAU - 2.0 * PI).abs() < 1e-15);
    }
}
