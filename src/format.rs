//! On-disk format definitions
//!
//! Byte layout shared by the writer and the reader.
//!
//! ## File Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Header (20 bytes)                                           │
//! │   Signature: "Hive" (4) | "Tabl" (4)                        │
//! │   Version: u32 (4) | RootPointer: start u32, end u32 (8)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │ HashTableRegion (4-byte aligned)                            │
//! │   BucketCount: u32                                          │
//! │   Buckets: BucketCount × u32 chain-tail item index          │
//! │            (0xffff_ffff = empty bucket)                     │
//! │   Items: N × 24-byte items                                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Key bytes (unaligned UTF-8), payload blobs (8-byte          │
//! │ aligned), child HashTableRegions — interleaved, each        │
//! │ addressed by a (start, end) pointer                         │
//! └─────────────────────────────────────────────────────────────┘
//!
//! Item (24 bytes)
//!   Hash: u32 | Previous: u32 (0xffff_ffff = first in chain)
//!   KeyStart: u32 | KeySize: u32
//!   ValueStart: u32 (bit 31 set = child table) | ValueEnd: u32
//! ```
//!
//! All integers are stored in the file byte order. The signature is written
//! as two u32 halves in that same order, so a reader can recover the order
//! by comparing the raw bytes against both possible encodings. Offsets are
//! limited to 31 bits; bit 31 of ValueStart distinguishes child-table
//! pointers from payload pointers.

use crate::endian::Endian;
use crate::pointer::Pointer;

// =============================================================================
// Shared Constants (used by writer, reader, and tests)
// =============================================================================

/// First signature half ("Hive" when the file is little endian)
pub const SIGNATURE_0: u32 = u32::from_le_bytes(*b"Hive");

/// Second signature half ("Tabl" when the file is little endian)
pub const SIGNATURE_1: u32 = u32::from_le_bytes(*b"Tabl");

/// Current file format version
pub const FORMAT_VERSION: u32 = 1;

/// Header size: signature (8) + version (4) + root pointer (8) = 20 bytes
pub const HEADER_SIZE: usize = 20;

/// Wire size of one item array entry
pub const ITEM_SIZE: usize = 24;

/// Sentinel index: empty bucket, or first item in a chain
pub const SENTINEL: u32 = u32::MAX;

/// Bit 31 of an item's value-start field tags a child-table pointer
pub(crate) const CHILD_TABLE_TAG: u32 = 1 << 31;

/// Largest representable file: offsets must stay below the tag bit
pub(crate) const MAX_FILE_SIZE: usize = (CHILD_TABLE_TAG - 1) as usize;

/// Alignment of hash table regions
pub(crate) const TABLE_ALIGNMENT: usize = 4;

/// Alignment of payload blobs
pub(crate) const PAYLOAD_ALIGNMENT: usize = 8;

// =============================================================================
// Helpers
// =============================================================================

/// Round `offset` up to the next multiple of `alignment` (a power of two)
pub(crate) fn align_offset(offset: usize, alignment: usize) -> usize {
    (offset + alignment - 1) & !(alignment - 1)
}

// =============================================================================
// Item Wire Codec
// =============================================================================

/// One item array entry in wire-near form.
///
/// `value_start` still carries the child-table tag bit; interpreting it is
/// the reader's job. Keeping encode and decode side by side here is what
/// guarantees the builder and reader never disagree on field offsets.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawItem {
    pub hash: u32,
    pub previous: u32,
    pub key_start: u32,
    pub key_size: u32,
    pub value_start: u32,
    pub value_end: u32,
}

impl RawItem {
    pub fn encode(&self, endian: Endian) -> [u8; ITEM_SIZE] {
        let mut out = [0u8; ITEM_SIZE];
        out[0..4].copy_from_slice(&endian.encode_u32(self.hash));
        out[4..8].copy_from_slice(&endian.encode_u32(self.previous));
        out[8..12].copy_from_slice(&endian.encode_u32(self.key_start));
        out[12..16].copy_from_slice(&endian.encode_u32(self.key_size));
        out[16..20].copy_from_slice(&endian.encode_u32(self.value_start));
        out[20..24].copy_from_slice(&endian.encode_u32(self.value_end));
        out
    }

    pub fn decode(bytes: &[u8; ITEM_SIZE], endian: Endian) -> Self {
        Self {
            hash: endian.decode_u32(bytes[0..4].try_into().unwrap()),
            previous: endian.decode_u32(bytes[4..8].try_into().unwrap()),
            key_start: endian.decode_u32(bytes[8..12].try_into().unwrap()),
            key_size: endian.decode_u32(bytes[12..16].try_into().unwrap()),
            value_start: endian.decode_u32(bytes[16..20].try_into().unwrap()),
            value_end: endian.decode_u32(bytes[20..24].try_into().unwrap()),
        }
    }

    /// The key range as a pointer (stored on disk as start + size)
    pub fn key_ptr(&self) -> Pointer {
        Pointer::new(self.key_start, self.key_start.saturating_add(self.key_size))
    }
}
