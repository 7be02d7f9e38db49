//! Error types for the jplephem module
//!
//! Every failure of an ephemeris operation is reported through [`JplephemError`].
//! Nothing is retried internally: short or corrupt reads are not transient for a
//! fixed-layout file, so they go straight back to the caller.

use std::path::PathBuf;
use thiserror::Error;

use crate::jplephem::bodies::{Body, Slot};
use crate::jplephem::request::Backend;

/// Main error type for jplephem functionality
#[derive(Error, Debug)]
pub enum JplephemError {
    /// A lookup was attempted while no ephemeris file is open
    #[error("No ephemeris file is open")]
    NotOpen,

    /// The ephemeris file could not be located or opened
    #[error("Cannot open ephemeris file {path:?}: {source}")]
    OpenError {
        /// The path that was tried
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The file is shorter than one header record
    #[error("Truncated header: expected {expected} bytes, got {actual}")]
    TruncatedHeader {
        /// Bytes required for the header record
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Fewer bytes than one record were available at the requested offset
    #[error("Short read at byte {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Byte offset of the record in the file
        offset: u64,
        /// Bytes required for a full record
        expected: usize,
        /// Bytes actually read
        actual: usize,
    },

    /// An I/O error other than end-of-file while reading a record
    #[error("I/O error reading record at byte {offset}: {source}")]
    Io {
        /// Byte offset of the record in the file
        offset: u64,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The requested time is outside the validity interval of the file
    #[error("Date {jd} is outside ephemeris range ({start_jd}..{end_jd})")]
    OutOfRange {
        /// The Julian date that was requested
        jd: f64,
        /// The start of the ephemeris range
        start_jd: f64,
        /// The end of the ephemeris range
        end_jd: f64,
    },

    /// The body has no populated coefficient block in this file
    #[error("Body not available in this ephemeris: {0}")]
    UnknownBody(Body),

    /// A coefficient block is too short to yield a derivative
    #[error("Slot {slot:?} has {count} coefficients per component; at least 2 are required")]
    InsufficientCoefficients {
        /// The layout slot being evaluated
        slot: Slot,
        /// Coefficients per component declared by the header
        count: usize,
    },

    /// The header decoded but violates a structural invariant
    #[error("Invalid ephemeris header: {0}")]
    InvalidHeader(String),

    /// A backend other than the JPL binary reader was requested
    #[error("Ephemeris backend not available: {0:?}")]
    BackendUnavailable(Backend),
}

/// Extension of the Result type for jplephem operations
pub type Result<T> = std::result::Result<T, JplephemError>;

/// Helper function to convert an open failure into a JplephemError
pub fn io_err(path: impl Into<PathBuf>, err: std::io::Error) -> JplephemError {
    JplephemError::OpenError {
        path: path.into(),
        source: err,
    }
}
