//! Open ephemeris files and lookups against them
//!
//! An [`EphemerisSession`] owns one open file and its decoded header. It is
//! `Send + Sync`: lookups take `&self`, and reads of the underlying file are
//! serialized by the record source.
//!
//! [`Ephemeris`] is the open/close/lookup holder for callers that want a single
//! current file which can be swapped or closed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;

use crate::jplephem::bodies::{Body, Slot};
use crate::jplephem::compose::{compose_state, StateVector};
use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::header::{parse_header, EphemerisHeader, ValidityInterval};
use crate::jplephem::record::{
    fetch_record, open_source, DataRecord, ReadStrategy, RecordCache, RecordFormat, RecordSource,
};
use crate::jplephem::request::{Backend, LookupRequest};
use crate::jplephem::transform::{effective_center, render};

/// DE number assumed when the file name does not carry one
pub const DEFAULT_DE_NUMBER: u32 = 431;

/// How a session reads its file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    pub read_strategy: ReadStrategy,
    /// Keep the most recently read record for the next lookup
    pub cache_records: bool,
    pub format: RecordFormat,
}

/// Summary of an open file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EphemerisInfo {
    pub path: PathBuf,
    pub de_number: u32,
    pub validity: ValidityInterval,
    pub record_count: usize,
    pub file_size: u64,
    /// Slots with a coefficient block
    pub slots: Vec<Slot>,
}

/// One open DE file
pub struct EphemerisSession {
    path: PathBuf,
    header: EphemerisHeader,
    format: RecordFormat,
    source: Box<dyn RecordSource>,
    cache: Option<RecordCache>,
}

impl EphemerisSession {
    /// Open with default options: seek reads, no cache
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &SessionOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: &SessionOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let source = open_source(&path, options.read_strategy)?;
        let header = parse_header(source.as_ref(), &options.format)?;

        info!(
            "Opened ephemeris {} (JD {} to {}, {} records)",
            path.display(),
            header.start_jd,
            header.end_jd,
            header.record_count()
        );

        Ok(Self {
            path,
            header,
            format: options.format,
            source,
            cache: options.cache_records.then(RecordCache::new),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &EphemerisHeader {
        &self.header
    }

    pub fn validity(&self) -> ValidityInterval {
        self.header.validity()
    }

    pub fn info(&self) -> EphemerisInfo {
        EphemerisInfo {
            path: self.path.clone(),
            de_number: guess_de_number(&self.path),
            validity: self.validity(),
            record_count: self.header.record_count(),
            file_size: self.source.len(),
            slots: self
                .header
                .layout
                .iter()
                .filter_map(|(slot, entry)| entry.map(|_| slot))
                .collect(),
        }
    }

    /// The data record covering `t`
    pub fn fetch_record(&self, t: f64) -> Result<Arc<DataRecord>> {
        self.record_at(self.header.record_index(t)?)
    }

    fn record_at(&self, index: usize) -> Result<Arc<DataRecord>> {
        if let Some(cache) = &self.cache {
            if let Some(record) = cache.get(index) {
                return Ok(record);
            }
        }

        let record = Arc::new(fetch_record(self.source.as_ref(), &self.format, index)?);
        if let Some(cache) = &self.cache {
            cache.put(Arc::clone(&record));
        }
        Ok(record)
    }

    /// Barycentric-frame Cartesian state of `target` relative to `center`
    ///
    /// `t` is checked against the validity interval before any read, and body
    /// availability is checked by composition.
    pub fn state(&self, t: f64, target: Body, center: Body) -> Result<StateVector> {
        let record = self.fetch_record(t)?;
        compose_state(&record, &self.header, t, target, center)
    }

    /// Position and velocity of `target` relative to `center`, rendered per `request`
    pub fn lookup(
        &self,
        t: f64,
        target: Body,
        center: Body,
        request: &LookupRequest,
    ) -> Result<[f64; 6]> {
        if request.backend != Backend::Jpl {
            return Err(JplephemError::BackendUnavailable(request.backend));
        }

        let center = effective_center(center, request.frame);
        let state = self.state(t, target, center)?;
        Ok(render(&state, request))
    }
}

impl Drop for EphemerisSession {
    fn drop(&mut self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        info!("Closed ephemeris {}", self.path.display());
    }
}

/// Holder for at most one open file
#[derive(Default)]
pub struct Ephemeris {
    options: SessionOptions,
    session: Option<EphemerisSession>,
}

impl Ephemeris {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            options,
            session: None,
        }
    }

    /// Open `path`, closing any file already open
    ///
    /// If opening fails no file is left open.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<ValidityInterval> {
        self.close();
        let session = EphemerisSession::open_with(path, &self.options)?;
        let validity = session.validity();
        self.session = Some(session);
        Ok(validity)
    }

    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("Closing ephemeris {}", session.path().display());
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// The open session
    pub fn session(&self) -> Result<&EphemerisSession> {
        self.session.as_ref().ok_or(JplephemError::NotOpen)
    }

    pub fn lookup(
        &self,
        t: f64,
        target: Body,
        center: Body,
        request: &LookupRequest,
    ) -> Result<[f64; 6]> {
        self.session()?.lookup(t, target, center, request)
    }
}

/// DE number from a file name such as `lnxp1600p2200.de431` or `de405.eph`
pub fn guess_de_number(path: &Path) -> u32 {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    name.match_indices("de")
        .filter_map(|(i, _)| {
            let digits: String = name[i + 2..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if (3..=4).contains(&digits.len()) {
                digits.parse().ok()
            } else {
                None
            }
        })
        .next()
        .unwrap_or(DEFAULT_DE_NUMBER)
}
