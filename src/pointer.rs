//! Pointer/Range Encoding
//!
//! Every variable-length item in a hive file (key bytes, payload bytes,
//! table regions) is located by a (start, end) byte range. Pointers are the
//! only cross-region references in the format; nothing is addressed by
//! in-memory reference once serialized.

use crate::endian::Endian;

/// A (start, end) byte range within a hive file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    start: u32,
    end: u32,
}

impl Pointer {
    /// The empty range at offset zero
    pub const NULL: Self = Self { start: 0, end: 0 };

    /// Wire size of an encoded pointer pair
    pub const ENCODED_SIZE: usize = 8;

    /// Create a pointer covering `start..end`
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Start offset of the range
    pub fn start(&self) -> u32 {
        self.start
    }

    /// End offset of the range (exclusive)
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Size of the range in bytes; an inverted range counts as empty
    pub fn size(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    /// Encode as two u32 in the file byte order
    pub fn encode(&self, endian: Endian) -> [u8; Self::ENCODED_SIZE] {
        let mut out = [0u8; Self::ENCODED_SIZE];
        out[0..4].copy_from_slice(&endian.encode_u32(self.start));
        out[4..8].copy_from_slice(&endian.encode_u32(self.end));
        out
    }

    /// Decode from two u32 in the file byte order
    pub fn decode(bytes: [u8; Self::ENCODED_SIZE], endian: Endian) -> Self {
        let start = endian.decode_u32(bytes[0..4].try_into().unwrap());
        let end = endian.decode_u32(bytes[4..8].try_into().unwrap());
        Self { start, end }
    }
}
