//! Item Handles
//!
//! A decoded entry from a table's item array. Handles are plain data;
//! resolving the key, the payload bytes, or the child table goes through
//! the [`TableReader`] that produced the handle.
//!
//! [`TableReader`]: super::TableReader

use crate::endian::Endian;
use crate::format::{RawItem, CHILD_TABLE_TAG, ITEM_SIZE};
use crate::pointer::Pointer;

/// What an item carries: exactly one of the two persisted cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// The value pointer addresses opaque payload bytes
    Payload,
    /// The value pointer addresses a nested hash table region
    ChildTable,
}

/// A decoded item array entry
#[derive(Debug, Clone, Copy)]
pub struct ItemHandle {
    index: u32,
    hash: u32,
    previous: u32,
    key_ptr: Pointer,
    kind: ItemKind,
    value_ptr: Pointer,
}

impl ItemHandle {
    pub(crate) fn decode(index: u32, bytes: &[u8; ITEM_SIZE], endian: Endian) -> Self {
        let raw = RawItem::decode(bytes, endian);

        let kind = if raw.value_start & CHILD_TABLE_TAG != 0 {
            ItemKind::ChildTable
        } else {
            ItemKind::Payload
        };

        Self {
            index,
            hash: raw.hash,
            previous: raw.previous,
            key_ptr: raw.key_ptr(),
            kind,
            value_ptr: Pointer::new(raw.value_start & !CHILD_TABLE_TAG, raw.value_end),
        }
    }

    /// Position of this item in its region's item array
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The precomputed hash of this item's key
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Index of the previous chain member, or the sentinel for "first"
    pub(crate) fn previous(&self) -> u32 {
        self.previous
    }

    /// Byte range of the key text
    pub fn key_ptr(&self) -> Pointer {
        self.key_ptr
    }

    /// Which of the two persisted cases this item is
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Byte range of the payload or child table region
    pub fn value_ptr(&self) -> Pointer {
        self.value_ptr
    }
}
