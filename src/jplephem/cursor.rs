//! Sequential reader over a fixed-size byte buffer
//!
//! Fields are decoded in order with a fixed byte order. Reading past the end of
//! the buffer yields zero instead of failing; callers check the buffer length
//! against the record size before trusting what they decode.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::constants::{DOUBLE_SIZE, INT_SIZE};

/// Byte order of the fields in a buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Endian {
    Big,
    #[default]
    Little,
}

/// Cursor over a borrowed byte buffer
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            pos: 0,
            endian,
        }
    }

    /// Current byte position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left before the end of the buffer
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Decode the next 8 bytes as an `f64`, or 0.0 past the end
    pub fn read_f64(&mut self) -> f64 {
        match self.take(DOUBLE_SIZE) {
            Some(bytes) => match self.endian {
                Endian::Little => LittleEndian::read_f64(bytes),
                Endian::Big => BigEndian::read_f64(bytes),
            },
            None => 0.0,
        }
    }

    /// Decode the next 4 bytes as an `i32`, or 0 past the end
    pub fn read_i32(&mut self) -> i32 {
        match self.take(INT_SIZE) {
            Some(bytes) => match self.endian {
                Endian::Little => LittleEndian::read_i32(bytes),
                Endian::Big => BigEndian::read_i32(bytes),
            },
            None => 0,
        }
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }
}
