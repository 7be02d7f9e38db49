//! Data records and the sources they are read from
//!
//! A DE file is a run of equally sized records. Record 0 is the header; data
//! record `i` sits at byte `(i + 1) × record_size`. Each data record holds the
//! coefficients of every slot for one step of the validity interval, with the
//! record's start epoch in its first coefficient.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{trace, warn};
use memmap2::{Mmap, MmapOptions};
use serde::{Deserialize, Serialize};

use crate::constants::{COEFF_COUNT, DOUBLE_SIZE, RECORD_SIZE};
use crate::jplephem::cursor::{ByteCursor, Endian};
use crate::jplephem::errors::{io_err, JplephemError, Result};

/// Record geometry of a DE file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFormat {
    /// Size of every record in bytes, header included
    pub record_size: usize,
    /// Coefficients decoded from each data record
    pub coeff_count: usize,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            record_size: RECORD_SIZE,
            coeff_count: COEFF_COUNT,
        }
    }
}

impl RecordFormat {
    pub fn new(record_size: usize, coeff_count: usize) -> Result<Self> {
        let fits = coeff_count
            .checked_mul(DOUBLE_SIZE)
            .map_or(false, |bytes| bytes <= record_size);
        if coeff_count < 2 || !fits {
            return Err(JplephemError::InvalidHeader(format!(
                "{} coefficients do not fit a {} byte record",
                coeff_count, record_size
            )));
        }
        Ok(Self {
            record_size,
            coeff_count,
        })
    }

    /// Largest number of data records whose offsets fit in a `u64`
    pub fn max_records(&self) -> u64 {
        (u64::MAX / self.record_size.max(1) as u64).saturating_sub(1)
    }

    /// Byte offset of data record `index`
    pub fn data_offset(&self, index: usize) -> Result<u64> {
        (index as u64)
            .checked_add(1)
            .and_then(|n| n.checked_mul(self.record_size as u64))
            .ok_or_else(|| {
                JplephemError::InvalidHeader(format!(
                    "data record {} lies beyond any addressable byte offset",
                    index
                ))
            })
    }
}

/// How record bytes are obtained from the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadStrategy {
    /// Seek and read on a shared handle under a lock
    #[default]
    Seek,
    /// Map the file and copy records out of the mapping
    MemoryMap,
}

/// Coefficients of one data record
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord {
    index: usize,
    coefficients: Vec<f64>,
}

impl DataRecord {
    /// Decode `coeff_count` little-endian doubles from the record bytes
    pub fn decode(index: usize, bytes: &[u8], format: &RecordFormat) -> Self {
        let mut cursor = ByteCursor::new(bytes, Endian::Little);
        let coefficients = (0..format.coeff_count).map(|_| cursor.read_f64()).collect();
        Self {
            index,
            coefficients,
        }
    }

    pub fn from_coefficients(index: usize, coefficients: Vec<f64>) -> Self {
        Self {
            index,
            coefficients,
        }
    }

    /// Data record index (0 is the first record after the header)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Epoch at which this record's span begins
    pub fn start_jd(&self) -> f64 {
        self.coefficients.first().copied().unwrap_or(0.0)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

/// Random-access byte source over an ephemeris file
///
/// Implementations must be usable from several threads at once; a read is one
/// atomic positioned operation.
pub trait RecordSource: Send + Sync {
    /// Fill `buf` from byte `offset`, stopping early only at end of file
    ///
    /// Returns the number of bytes placed in `buf`.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Total length of the file in bytes
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read exactly one record at `offset`
    fn read_record_bytes(&self, offset: u64, format: &RecordFormat) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; format.record_size];
        let read = self.read_at(offset, &mut buf)?;
        if read < format.record_size {
            return Err(JplephemError::ShortRead {
                offset,
                expected: format.record_size,
                actual: read,
            });
        }
        Ok(buf)
    }
}

/// Seek-then-read on a file handle held behind a mutex
pub struct SeekRecordSource {
    file: Mutex<File>,
    len: u64,
}

impl SeekRecordSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf).map_err(|e| io_err(&path_buf, e))?;
        Self::from_file(path_buf, file)
    }

    fn from_file(path: PathBuf, file: File) -> Result<Self> {
        let len = file.metadata().map_err(|e| io_err(&path, e))?.len();
        Ok(Self {
            file: Mutex::new(file),
            len,
        })
    }
}

impl RecordSource for SeekRecordSource {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        // A panic while holding the lock cannot leave the handle in a state we
        // depend on: every read seeks first.
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        file.seek(SeekFrom::Start(offset))
            .map_err(|source| JplephemError::Io { offset, source })?;

        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => return Err(JplephemError::Io { offset, source }),
            }
        }
        Ok(filled)
    }

    fn len(&self) -> u64 {
        self.len
    }
}

/// Read-only memory mapping of the whole file
pub struct MappedRecordSource {
    map: Mmap,
}

impl MappedRecordSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf).map_err(|e| io_err(&path_buf, e))?;
        // Safety: the mapping is read-only and ephemeris files are not rewritten
        // while a session has them open.
        let map = unsafe { MmapOptions::new().map(&file) }.map_err(|e| io_err(&path_buf, e))?;
        Ok(Self { map })
    }
}

impl RecordSource for MappedRecordSource {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let start = (offset as usize).min(self.map.len());
        let end = start.saturating_add(buf.len()).min(self.map.len());
        let n = end - start;
        buf[..n].copy_from_slice(&self.map[start..end]);
        Ok(n)
    }

    fn len(&self) -> u64 {
        self.map.len() as u64
    }
}

/// Open a file with the requested strategy
///
/// If mapping fails the file is read with seeks instead.
pub fn open_source(path: &Path, strategy: ReadStrategy) -> Result<Box<dyn RecordSource>> {
    match strategy {
        ReadStrategy::Seek => Ok(Box::new(SeekRecordSource::open(path)?)),
        ReadStrategy::MemoryMap => match MappedRecordSource::open(path) {
            Ok(source) => Ok(Box::new(source)),
            Err(JplephemError::OpenError { source, .. }) if path.exists() => {
                warn!(
                    "Memory mapping {} failed: {}. Falling back to seek reads.",
                    path.display(),
                    source
                );
                Ok(Box::new(SeekRecordSource::open(path)?))
            }
            Err(e) => Err(e),
        },
    }
}

/// Most recently read record, keyed by record index
#[derive(Debug, Default)]
pub struct RecordCache {
    entry: Mutex<Option<Arc<DataRecord>>>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached record if it is record `index`
    pub fn get(&self, index: usize) -> Option<Arc<DataRecord>> {
        let entry = self.entry.lock().unwrap_or_else(|p| p.into_inner());
        match entry.as_ref() {
            Some(record) if record.index() == index => {
                trace!("Record cache hit for record {}", index);
                Some(Arc::clone(record))
            }
            _ => {
                trace!("Record cache miss for record {}", index);
                None
            }
        }
    }

    /// Replace the cached record
    pub fn put(&self, record: Arc<DataRecord>) {
        let mut entry = self.entry.lock().unwrap_or_else(|p| p.into_inner());
        *entry = Some(record);
    }

    pub fn clear(&self) {
        let mut entry = self.entry.lock().unwrap_or_else(|p| p.into_inner());
        *entry = None;
    }

    /// Index of the cached record, if any
    pub fn cached_index(&self) -> Option<usize> {
        let entry = self.entry.lock().unwrap_or_else(|p| p.into_inner());
        entry.as_ref().map(|r| r.index())
    }
}

/// Read and decode data record `index`
pub fn fetch_record(
    source: &dyn RecordSource,
    format: &RecordFormat,
    index: usize,
) -> Result<DataRecord> {
    let offset = format.data_offset(index)?;
    trace!("Reading data record {} at byte {}", index, offset);
    let bytes = source.read_record_bytes(offset, format)?;
    Ok(DataRecord::decode(index, &bytes, format))
}
