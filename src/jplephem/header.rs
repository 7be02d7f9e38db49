//! Header record of a DE binary ephemeris
//!
//! The first record of the file describes everything needed to address and
//! evaluate the data records: the validity interval, the time span covered by
//! each record, and where each body's coefficient block lives inside a record.
//!
//! Field order (little-endian):
//!
//! | Field | Type |
//! |---|---|
//! | valid start JD | f64 |
//! | valid end JD | f64 |
//! | days per record | f64 |
//! | constant count | i32 |
//! | AU (km) | f64 |
//! | Earth/Moon mass ratio | f64 |
//! | layout table, 3 rows × 13 slots (offset, count, sub-intervals) | i32 |
//! | per-slot coefficient count | 13 × i32 |

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::constants::{LAYOUT_ROWS, LAYOUT_SLOTS};
use crate::jplephem::bodies::Slot;
use crate::jplephem::cursor::{ByteCursor, Endian};
use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::record::{RecordFormat, RecordSource};

/// Where one slot's coefficients live inside a data record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutEntry {
    /// Index of the first coefficient of the block
    pub offset: usize,
    /// Chebyshev coefficients per component and sub-interval
    pub coeff_count: usize,
    /// Number of sub-intervals each record is split into for this slot
    pub sub_intervals: usize,
}

impl LayoutEntry {
    /// Coefficients occupied by the whole block (3 components × all sub-intervals)
    pub fn block_len(&self) -> usize {
        self.coeff_count * 3 * self.sub_intervals
    }
}

/// Layout entries for every slot; `None` marks a slot absent from the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutTable {
    entries: [Option<LayoutEntry>; LAYOUT_SLOTS],
}

impl LayoutTable {
    /// Entry for a slot, if the file populates it
    pub fn get(&self, slot: Slot) -> Option<&LayoutEntry> {
        self.entries[slot.index()].as_ref()
    }

    /// Set or clear the entry for a slot
    pub fn set(&mut self, slot: Slot, entry: Option<LayoutEntry>) {
        self.entries[slot.index()] = entry;
    }

    /// All slots with their entries, in file order
    pub fn iter(&self) -> impl Iterator<Item = (Slot, Option<&LayoutEntry>)> + '_ {
        Slot::ALL
            .iter()
            .map(move |&slot| (slot, self.entries[slot.index()].as_ref()))
    }

    /// Number of populated slots
    pub fn populated(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }
}

/// Time coverage of an ephemeris file
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidityInterval {
    pub start_jd: f64,
    pub end_jd: f64,
    /// Days covered by each data record
    pub step_days: f64,
}

impl ValidityInterval {
    /// True if `jd` lies inside the interval, both ends included
    pub fn contains(&self, jd: f64) -> bool {
        jd >= self.start_jd && jd <= self.end_jd
    }
}

/// Parsed header record; immutable once decoded
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisHeader {
    pub start_jd: f64,
    pub end_jd: f64,
    pub step_days: f64,
    /// Number of named constants the file declares
    pub constant_count: i32,
    /// Astronomical unit in kilometers
    pub au: f64,
    /// Earth/Moon mass ratio
    pub emrat: f64,
    pub layout: LayoutTable,
    /// Trailing per-slot coefficient counts, kept as read
    pub coefficient_counts: [i32; LAYOUT_SLOTS],
    /// Named constants known from the header fields
    pub constants: BTreeMap<String, f64>,
}

impl EphemerisHeader {
    pub fn validity(&self) -> ValidityInterval {
        ValidityInterval {
            start_jd: self.start_jd,
            end_jd: self.end_jd,
            step_days: self.step_days,
        }
    }

    /// Number of data records needed to cover the validity interval
    pub fn record_count(&self) -> usize {
        (((self.end_jd - self.start_jd) / self.step_days).ceil() as usize).max(1)
    }

    /// Index of the data record covering `jd`
    ///
    /// Both ends of the interval are accepted; the end instant maps to the last record.
    pub fn record_index(&self, jd: f64) -> Result<usize> {
        if !self.validity().contains(jd) {
            return Err(JplephemError::OutOfRange {
                jd,
                start_jd: self.start_jd,
                end_jd: self.end_jd,
            });
        }

        let raw = ((jd - self.start_jd) / self.step_days).floor();
        let index = if raw <= 0.0 { 0 } else { raw as usize };
        Ok(index.min(self.record_count() - 1))
    }

    /// Look up a named constant
    pub fn constant(&self, name: &str) -> Option<f64> {
        self.constants.get(name).copied()
    }

    fn validate(&self, format: &RecordFormat) -> Result<()> {
        if !(self.end_jd > self.start_jd) {
            return Err(JplephemError::InvalidHeader(format!(
                "end {} is not after start {}",
                self.end_jd, self.start_jd
            )));
        }
        if !(self.step_days > 0.0) {
            return Err(JplephemError::InvalidHeader(format!(
                "step {} days is not positive",
                self.step_days
            )));
        }

        let spans = ((self.end_jd - self.start_jd) / self.step_days).ceil();
        if !(spans <= format.max_records() as f64) {
            return Err(JplephemError::InvalidHeader(format!(
                "{} days in steps of {} days needs more records than a file can address",
                self.end_jd - self.start_jd,
                self.step_days
            )));
        }

        for (slot, entry) in self.layout.iter() {
            let Some(entry) = entry else { continue };
            if entry.sub_intervals == 0 {
                return Err(JplephemError::InvalidHeader(format!(
                    "{:?} has no sub-intervals",
                    slot
                )));
            }
            let end = entry.offset + entry.block_len();
            if end > format.coeff_count {
                return Err(JplephemError::InvalidHeader(format!(
                    "{:?} block ends at coefficient {} but records hold {}",
                    slot, end, format.coeff_count
                )));
            }
        }

        Ok(())
    }
}

/// Read and decode the header record from the start of the file
pub fn parse_header(source: &dyn RecordSource, format: &RecordFormat) -> Result<EphemerisHeader> {
    let mut buf = vec![0u8; format.record_size];
    let read = source.read_at(0, &mut buf)?;
    decode_header(&buf[..read], format)
}

/// Decode a header from the bytes of the first record
///
/// `bytes` must hold at least one full record; anything shorter is rejected before
/// any field is decoded.
pub fn decode_header(bytes: &[u8], format: &RecordFormat) -> Result<EphemerisHeader> {
    if bytes.len() < format.record_size {
        return Err(JplephemError::TruncatedHeader {
            expected: format.record_size,
            actual: bytes.len(),
        });
    }

    let mut cursor = ByteCursor::new(&bytes[..format.record_size], Endian::Little);

    let start_jd = cursor.read_f64();
    let end_jd = cursor.read_f64();
    let step_days = cursor.read_f64();
    let constant_count = cursor.read_i32();
    let au = cursor.read_f64();
    let emrat = cursor.read_f64();

    let mut table = [[0i32; LAYOUT_SLOTS]; LAYOUT_ROWS];
    for row in table.iter_mut() {
        for cell in row.iter_mut() {
            *cell = cursor.read_i32();
        }
    }

    let mut coefficient_counts = [0i32; LAYOUT_SLOTS];
    for count in coefficient_counts.iter_mut() {
        *count = cursor.read_i32();
    }

    let mut layout = LayoutTable::default();
    for slot in Slot::ALL {
        let column = slot.index();
        let (offset, count, subs) = (table[0][column], table[1][column], table[2][column]);
        if offset < 0 || count < 0 || subs < 0 {
            return Err(JplephemError::InvalidHeader(format!(
                "{:?} has a negative layout value ({}, {}, {})",
                slot, offset, count, subs
            )));
        }
        // Offset 0 holds the record start epoch, so no block can begin there
        if offset > 0 {
            layout.set(
                slot,
                Some(LayoutEntry {
                    offset: offset as usize,
                    coeff_count: count as usize,
                    sub_intervals: subs as usize,
                }),
            );
        }
    }

    let mut constants = BTreeMap::new();
    constants.insert("AU".to_string(), au);
    constants.insert("EMRAT".to_string(), emrat);

    let header = EphemerisHeader {
        start_jd,
        end_jd,
        step_days,
        constant_count,
        au,
        emrat,
        layout,
        coefficient_counts,
        constants,
    };
    header.validate(format)?;

    debug!(
        "Decoded header: JD {}..{}, {} days per record, {} of {} slots populated",
        header.start_jd,
        header.end_jd,
        header.step_days,
        header.layout.populated(),
        LAYOUT_SLOTS
    );

    Ok(header)
}
