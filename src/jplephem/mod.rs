//! JPL Ephemeris module for planetary positions from DE binary files
//!
//! This module reads the fixed-record binary form of the JPL Development
//! Ephemerides and evaluates the Chebyshev series they contain.
//!
//! # Overview
//!
//! A lookup for `(t, target, center)` runs through these stages:
//!
//! 1. `header`: validity interval and per-slot coefficient layout
//! 2. `record`: the one data record covering `t`
//! 3. `chebyshev`: position and velocity of each slot involved
//! 4. `compose`: target relative to center, with the Moon and Earth derived
//!    from the Earth-Moon barycenter
//! 5. `transform`: Cartesian or polar output, degrees or radians
//!
//! # Main Components
//!
//! - `session`: `EphemerisSession` for one open file, `Ephemeris` open/close holder
//! - `bodies`: `Body` and header `Slot` enums
//! - `request`: options selecting backend, center frame, shape and units
//! - `synthetic`: writer for crafted DE files
//! - `calendar`: civil date and Julian date conversion
//! - Error types for proper error handling

pub mod bodies;
pub mod calendar;
pub mod chebyshev;
pub mod compose;
pub mod cursor;
pub mod errors;
pub mod header;
pub mod record;
pub mod request;
pub mod session;
pub mod synthetic;
pub mod transform;


// Re-export primary types for convenience
pub use self::bodies::{Body, Slot};
pub use self::compose::StateVector;
pub use self::errors::{JplephemError, Result};
pub use self::header::{EphemerisHeader, ValidityInterval};
pub use self::record::{ReadStrategy, RecordFormat};
pub use self::request::{AngleUnit, Backend, CenterFrame, LookupRequest, OutputShape};
pub use self::session::{Ephemeris, EphemerisInfo, EphemerisSession, SessionOptions};
