//! Lookup options
//!
//! Each independent choice a caller makes about a lookup is its own enum, so that
//! conflicting combinations (two backends, Cartesian output in degrees) cannot be
//! expressed in the first place.

use serde::{Deserialize, Serialize};

/// Which ephemeris theory should answer the lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Backend {
    /// JPL DE binary file
    #[default]
    Jpl,
    /// Compressed Swiss Ephemeris files
    SwissEphemeris,
    /// Truncated analytic series
    Moshier,
}

/// Center override applied before composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CenterFrame {
    /// Use the center body given to the lookup
    #[default]
    AsRequested,
    /// Always relative to the solar-system barycenter
    Barycentric,
    /// Always relative to the Sun
    Heliocentric,
}

/// Shape of the rendered vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputShape {
    /// `[lon, lat, r, dlon, dlat, dr]`
    #[default]
    Polar,
    /// `[x, y, z, vx, vy, vz]`
    Cartesian,
}

/// Unit of polar angles and their rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

/// Everything that selects how a lookup is computed and rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub backend: Backend,
    pub frame: CenterFrame,
    pub shape: OutputShape,
    /// Ignored for Cartesian output
    pub angles: AngleUnit,
    /// When false the velocity components of the result are zero
    pub velocity: bool,
}

impl Default for LookupRequest {
    fn default() -> Self {
        Self {
            backend: Backend::Jpl,
            frame: CenterFrame::AsRequested,
            shape: OutputShape::Polar,
            angles: AngleUnit::Degrees,
            velocity: true,
        }
    }
}

impl LookupRequest {
    /// Default request: JPL backend, polar output in degrees, with velocity
    pub fn new() -> Self {
        Self::default()
    }

    /// Cartesian output in AU and AU/day
    pub fn cartesian() -> Self {
        Self::default().with_shape(OutputShape::Cartesian)
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_frame(mut self, frame: CenterFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_shape(mut self, shape: OutputShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_angles(mut self, angles: AngleUnit) -> Self {
        self.angles = angles;
        self
    }

    pub fn with_velocity(mut self, velocity: bool) -> Self {
        self.velocity = velocity;
        self
    }
}
