//! Synthetic DE ephemeris files
//!
//! Builds files in the DE binary layout with caller-chosen layout tables and
//! Chebyshev blocks, for tests, benchmarks and experiments that must not depend
//! on multi-megabyte downloads.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::constants::{AU_KM, DOUBLE_SIZE, INT_SIZE, LAYOUT_ROWS, LAYOUT_SLOTS};

/// Bytes taken by the header fields before the zero fill
const HEADER_FIELDS_LEN: usize =
    5 * DOUBLE_SIZE + INT_SIZE + (LAYOUT_ROWS + 1) * LAYOUT_SLOTS * INT_SIZE;
use crate::jplephem::bodies::Slot;
use crate::jplephem::errors::Result;
use crate::jplephem::header::{decode_header, EphemerisHeader};
use crate::jplephem::record::{DataRecord, RecordFormat};

/// Coefficients for one slot, one sub-interval, in one or every record
#[derive(Debug, Clone)]
struct SeriesBlock {
    /// `None` applies the block to every record
    record: Option<usize>,
    slot: Slot,
    /// `None` applies the block to every sub-interval
    sub_interval: Option<usize>,
    components: [Vec<f64>; 3],
}

/// Builder for a synthetic ephemeris file
#[derive(Debug, Clone)]
pub struct SyntheticEphemeris {
    start_jd: f64,
    end_jd: f64,
    step_days: f64,
    au: f64,
    emrat: f64,
    constant_count: i32,
    /// (offset, coefficient count, sub-intervals) per slot
    layout: [[i32; 3]; LAYOUT_SLOTS],
    records: Option<usize>,
    format: RecordFormat,
    series: Vec<SeriesBlock>,
}

impl SyntheticEphemeris {
    /// Empty file covering `start_jd..=end_jd` in steps of `step_days`
    pub fn new(start_jd: f64, end_jd: f64, step_days: f64) -> Self {
        Self {
            start_jd,
            end_jd,
            step_days,
            au: AU_KM,
            emrat: 81.300_568_221_497_22,
            constant_count: 2,
            layout: [[0; 3]; LAYOUT_SLOTS],
            records: None,
            format: RecordFormat::default(),
            series: Vec::new(),
        }
    }

    pub fn with_au(mut self, au: f64) -> Self {
        self.au = au;
        self
    }

    pub fn with_emrat(mut self, emrat: f64) -> Self {
        self.emrat = emrat;
        self
    }

    /// Set a slot's layout entry; offset 0 leaves the slot unpopulated
    pub fn with_slot(
        mut self,
        slot: Slot,
        offset: usize,
        coeff_count: usize,
        sub_intervals: usize,
    ) -> Self {
        self.layout[slot.index()] = [offset as i32, coeff_count as i32, sub_intervals as i32];
        self
    }

    /// Override the number of data records written
    pub fn with_records(mut self, records: usize) -> Self {
        self.records = Some(records);
        self
    }

    /// Coefficients of `slot` for one sub-interval of one record
    ///
    /// `components` holds the x, y and z series, lowest degree first.
    pub fn with_series<const N: usize>(
        mut self,
        record: usize,
        slot: Slot,
        sub_interval: usize,
        components: [[f64; N]; 3],
    ) -> Self {
        self.series.push(SeriesBlock {
            record: Some(record),
            slot,
            sub_interval: Some(sub_interval),
            components: components.map(|c| c.to_vec()),
        });
        self
    }

    /// The same coefficients for `slot` in every sub-interval of every record
    pub fn with_repeated_series<const N: usize>(
        mut self,
        slot: Slot,
        components: [[f64; N]; 3],
    ) -> Self {
        self.series.push(SeriesBlock {
            record: None,
            slot,
            sub_interval: None,
            components: components.map(|c| c.to_vec()),
        });
        self
    }

    /// Number of data records the file will contain
    pub fn record_count(&self) -> usize {
        self.records.unwrap_or_else(|| {
            if self.step_days > 0.0 && self.end_jd > self.start_jd {
                ((self.end_jd - self.start_jd) / self.step_days).ceil() as usize
            } else {
                1
            }
        })
    }

    /// Bytes of the header record
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.format.record_size.max(HEADER_FIELDS_LEN)];
        let mut pos = 0;

        for value in [self.start_jd, self.end_jd, self.step_days] {
            LittleEndian::write_f64(&mut buf[pos..], value);
            pos += DOUBLE_SIZE;
        }
        LittleEndian::write_i32(&mut buf[pos..], self.constant_count);
        pos += INT_SIZE;
        for value in [self.au, self.emrat] {
            LittleEndian::write_f64(&mut buf[pos..], value);
            pos += DOUBLE_SIZE;
        }

        let rows = (0..LAYOUT_ROWS).flat_map(|row| self.layout.iter().map(move |entry| entry[row]));
        let counts = self.layout.iter().map(|entry| entry[1]);
        for value in rows.chain(counts) {
            LittleEndian::write_i32(&mut buf[pos..], value);
            pos += INT_SIZE;
        }

        buf.truncate(self.format.record_size);
        buf
    }

    /// Decoded form of the header this builder writes
    pub fn header(&self) -> Result<EphemerisHeader> {
        decode_header(&self.header_bytes(), &self.format)
    }

    /// Coefficients of data record `index`
    pub fn coefficients(&self, index: usize) -> Vec<f64> {
        let mut coefficients = vec![0.0; self.format.coeff_count];
        let span = [
            self.start_jd + index as f64 * self.step_days,
            self.start_jd + (index + 1) as f64 * self.step_days,
        ];
        for (c, epoch) in coefficients.iter_mut().zip(span) {
            *c = epoch;
        }

        for block in &self.series {
            if block.record.map_or(false, |r| r != index) {
                continue;
            }
            let [offset, count, subs] = self.layout[block.slot.index()];
            if offset <= 0 || count <= 0 {
                continue;
            }
            let (offset, n) = (offset as usize, count as usize);
            let sub_intervals: Vec<usize> = match block.sub_interval {
                Some(l) => vec![l],
                None => (0..subs.max(0) as usize).collect(),
            };

            for l in sub_intervals {
                for (c, series) in block.components.iter().enumerate() {
                    for (k, &value) in series.iter().take(n).enumerate() {
                        if let Some(slot) = coefficients.get_mut(offset + l * n * 3 + c * n + k) {
                            *slot = value;
                        }
                    }
                }
            }
        }

        coefficients
    }

    /// Data record `index` as a session would decode it
    pub fn record(&self, index: usize) -> DataRecord {
        DataRecord::from_coefficients(index, self.coefficients(index))
    }

    /// Write the whole file: header record then every data record
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.header_bytes())?;

        let padding = vec![0u8; self.format.record_size.saturating_sub(self.format.coeff_count * 8)];
        for index in 0..self.record_count() {
            for value in self.coefficients(index) {
                w.write_f64::<LittleEndian>(value)?;
            }
            w.write_all(&padding)?;
        }
        Ok(())
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()
    }
}
