//! Dephem: reader for JPL DE binary ephemerides
//!
//! This crate decodes the fixed-record binary form of the JPL Development
//! Ephemerides and evaluates the Chebyshev series it contains, giving the
//! position and velocity of a body relative to another at a Julian date.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

pub mod constants;
pub mod coordinates;
pub mod jplephem;

// Re-export commonly used types
pub use coordinates::PolarState;
pub use jplephem::{
    AngleUnit, Backend, Body, CenterFrame, Ephemeris, EphemerisSession, JplephemError,
    LookupRequest, OutputShape, ReadStrategy, RecordFormat, Result, SessionOptions, StateVector,
};

use crate::constants::{DEFAULT_EPHE_DIR, EPHE_PATH_ENV};

/// Entry point for locating and opening ephemeris files
#[derive(Debug, Clone, Default)]
pub struct Loader {
    data_dir: Option<PathBuf>,
    options: SessionOptions,
}

impl Loader {
    /// Create a new loader with no data directory and default session options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom data directory, searched before the environment
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_read_strategy(mut self, strategy: ReadStrategy) -> Self {
        self.options.read_strategy = strategy;
        self
    }

    /// Keep the most recently read record between lookups
    pub fn with_record_cache(mut self, enabled: bool) -> Self {
        self.options.cache_records = enabled;
        self
    }

    pub fn with_record_format(mut self, format: RecordFormat) -> Self {
        self.options.format = format;
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Directories searched for a relative file name, in order
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(dir) = &self.data_dir {
            dirs.push(dir.clone());
        }
        if let Some(dir) = env::var_os(EPHE_PATH_ENV).filter(|d| !d.is_empty()) {
            dirs.push(PathBuf::from(dir));
        }
        dirs.push(PathBuf::from(DEFAULT_EPHE_DIR));
        dirs.push(PathBuf::from("."));
        dirs
    }

    /// Find an ephemeris file by name
    ///
    /// An absolute path is used as given. Otherwise the first existing file
    /// among [`search_dirs`](Self::search_dirs) wins.
    pub fn resolve_path<P: AsRef<Path>>(&self, name: P) -> Result<PathBuf> {
        let name = name.as_ref();

        if name.is_absolute() {
            if name.is_file() {
                return Ok(name.to_path_buf());
            }
        } else if let Some(found) = self
            .search_dirs()
            .into_iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            return Ok(found);
        }

        Err(JplephemError::OpenError {
            path: name.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "ephemeris file not found"),
        })
    }

    /// Resolve `name` and open it with the configured options
    pub fn open<P: AsRef<Path>>(&self, name: P) -> Result<EphemerisSession> {
        let path = self.resolve_path(name)?;
        EphemerisSession::open_with(path, &self.options)
    }

    /// A closed [`Ephemeris`] holder using the configured options
    pub fn ephemeris(&self) -> Ephemeris {
        Ephemeris::with_options(self.options)
    }
}
