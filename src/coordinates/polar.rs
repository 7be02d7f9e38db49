//! # Polar State Module
//!
//! Conversions between Cartesian position/velocity pairs and the polar form
//! `[lon, lat, r, dlon, dlat, dr]` used for rendered ephemeris output.
//!
//! ## Conventions
//!
//! - **lon**: angle in the x-y plane from the +x axis, normalized to `[0, 2π)`
//! - **lat**: angle above the x-y plane, in `[-π/2, π/2]`
//! - **r**: distance from the origin, in the unit of the Cartesian input
//! - rates are per unit time of the Cartesian velocity (per day for ephemerides)
//!
//! Angles are held in radians; [`PolarState::to_degrees`] produces the degree
//! form for display. Distance and its rate are never unit-converted.
//!
//! ## Degenerate Positions
//!
//! At the origin every component is zero. On the polar axis (`x = y = 0`)
//! longitude is undefined; it is reported as 0, as are the longitude and
//! latitude rates.
//!
//! ## Examples
//!
//! ```rust
//! use dephem::coordinates::polar::PolarState;
//! use nalgebra::Vector3;
//!
//! // One AU along +x, moving along +y
//! let polar = PolarState::from_cartesian(
//!     &Vector3::new(1.0, 0.0, 0.0),
//!     &Vector3::new(0.0, 0.01, 0.0),
//! );
//! assert_eq!(polar.lon, 0.0);
//! assert_eq!(polar.lat, 0.0);
//! assert_eq!(polar.r, 1.0);
//! assert!((polar.dlon - 0.01).abs() < 1e-15);
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{RAD2DEG, TAU};

/// Polar position and velocity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarState {
    /// Longitude (radians, `[0, 2π)`)
    pub lon: f64,
    /// Latitude (radians)
    pub lat: f64,
    /// Distance
    pub r: f64,
    /// Longitude rate (radians per unit time)
    pub dlon: f64,
    /// Latitude rate (radians per unit time)
    pub dlat: f64,
    /// Distance rate
    pub dr: f64,
}

impl PolarState {
    /// Converts a Cartesian position and velocity to polar form
    ///
    /// # Mathematical Conversion
    ///
    /// With `ρ² = x² + y²`:
    ///
    /// - `dr = (p · v) / r`
    /// - `dlon = (x·vy - y·vx) / ρ²`
    /// - `dlat = (vz·ρ² - z·(x·vx + y·vy)) / (r²·ρ)`
    pub fn from_cartesian(position: &Vector3<f64>, velocity: &Vector3<f64>) -> Self {
        let r = position.norm();
        if r == 0.0 {
            return Self::default();
        }

        let (x, y, z) = (position.x, position.y, position.z);
        let (vx, vy, vz) = (velocity.x, velocity.y, velocity.z);

        let rho2 = x * x + y * y;
        let rho = rho2.sqrt();

        let lat = (z / r).clamp(-1.0, 1.0).asin();
        let dr = position.dot(velocity) / r;

        if rho == 0.0 {
            return Self {
                lon: 0.0,
                lat,
                r,
                dlon: 0.0,
                dlat: 0.0,
                dr,
            };
        }

        Self {
            lon: normalize_angle(y.atan2(x)),
            lat,
            r,
            dlon: (x * vy - y * vx) / rho2,
            dlat: (vz * rho2 - z * (x * vx + y * vy)) / (r * r * rho),
            dr,
        }
    }

    /// Converts back to a Cartesian position and velocity
    ///
    /// # Mathematical Conversion
    ///
    /// - `x = r·cos(lat)·cos(lon)`
    /// - `y = r·cos(lat)·sin(lon)`
    /// - `z = r·sin(lat)`
    ///
    /// and the product rule applied to each for the velocity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dephem::coordinates::polar::PolarState;
    /// use std::f64::consts::PI;
    ///
    /// let north = PolarState { lon: 0.0, lat: PI / 2.0, r: 2.0, ..Default::default() };
    /// let (position, _velocity) = north.to_cartesian();
    /// assert!(position.x.abs() < 1e-15);
    /// assert!((position.z - 2.0).abs() < 1e-15);
    /// ```
    pub fn to_cartesian(&self) -> (Vector3<f64>, Vector3<f64>) {
        let (sin_lat, cos_lat) = self.lat.sin_cos();
        let (sin_lon, cos_lon) = self.lon.sin_cos();
        let r = self.r;

        let position = Vector3::new(r * cos_lat * cos_lon, r * cos_lat * sin_lon, r * sin_lat);
        let velocity = Vector3::new(
            self.dr * cos_lat * cos_lon
                - r * self.dlat * sin_lat * cos_lon
                - r * self.dlon * cos_lat * sin_lon,
            self.dr * cos_lat * sin_lon - r * self.dlat * sin_lat * sin_lon
                + r * self.dlon * cos_lat * cos_lon,
            self.dr * sin_lat + r * self.dlat * cos_lat,
        );

        (position, velocity)
    }

    /// Longitude, latitude and their rates converted to degrees
    pub fn to_degrees(&self) -> Self {
        Self {
            lon: self.lon * RAD2DEG,
            lat: self.lat * RAD2DEG,
            r: self.r,
            dlon: self.dlon * RAD2DEG,
            dlat: self.dlat * RAD2DEG,
            dr: self.dr,
        }
    }

    /// `[lon, lat, r, dlon, dlat, dr]`
    pub fn to_array(&self) -> [f64; 6] {
        [self.lon, self.lat, self.r, self.dlon, self.dlat, self.dr]
    }

    /// From `[lon, lat, r, dlon, dlat, dr]`
    pub fn from_array(v: [f64; 6]) -> Self {
        Self {
            lon: v[0],
            lat: v[1],
            r: v[2],
            dlon: v[3],
            dlat: v[4],
            dr: v[5],
        }
    }
}

/// Normalize an angle in radians to `[0, 2π)`
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
