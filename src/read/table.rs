//! Hash Table Reader
//!
//! A non-owning view over one serialized table region. Nothing is parsed
//! up front beyond the bucket count; names, keys, and values resolve on
//! demand, and chain links are never trusted: every hop is bounds-checked
//! and capped so a corrupt file produces an error instead of a hang.

use crate::error::{HiveError, Result};
use crate::format::{ITEM_SIZE, SENTINEL, TABLE_ALIGNMENT};
use crate::hash::table_hash;
use crate::pointer::Pointer;

use super::file::HiveFile;
use super::item::{ItemHandle, ItemKind};

/// Reader for one hash table region inside an open [`HiveFile`]
#[derive(Debug, Clone)]
pub struct TableReader<'f, 'a> {
    file: &'f HiveFile<'a>,
    pointer: Pointer,
    n_buckets: u32,
    n_items: u32,
}

impl<'f, 'a> TableReader<'f, 'a> {
    /// Interpret the byte range at `pointer` as a hash table region
    pub(crate) fn new(file: &'f HiveFile<'a>, pointer: Pointer) -> Result<Self> {
        let data = file.dereference(pointer, TABLE_ALIGNMENT)?;

        if data.len() < 4 {
            return Err(HiveError::Format(format!(
                "table region too small: expected at least 4 bytes, got {}",
                data.len()
            )));
        }

        let n_buckets = file.endian().decode_u32(data[0..4].try_into().unwrap());

        let buckets_end = 4u64 + n_buckets as u64 * 4;
        if buckets_end > data.len() as u64 {
            return Err(HiveError::Format(format!(
                "bucket array out of bounds: {} buckets need {} bytes, region has {}",
                n_buckets,
                buckets_end,
                data.len()
            )));
        }

        let items_len = data.len() as u64 - buckets_end;
        if items_len % ITEM_SIZE as u64 != 0 {
            return Err(HiveError::Format(format!(
                "item array size invalid: expected a multiple of {}, got {}",
                ITEM_SIZE, items_len
            )));
        }

        Ok(Self {
            file,
            pointer,
            n_buckets,
            n_items: (items_len / ITEM_SIZE as u64) as u32,
        })
    }

    /// Number of items stored in this region
    pub fn len(&self) -> usize {
        self.n_items as usize
    }

    /// Whether this region stores no items
    pub fn is_empty(&self) -> bool {
        self.n_items == 0
    }

    /// Number of hash buckets in this region
    pub fn bucket_count(&self) -> u32 {
        self.n_buckets
    }

    // -------------------------------------------------------------------------
    // Region access
    // -------------------------------------------------------------------------

    /// The region's bytes; bounds were validated at construction
    fn region(&self) -> Result<&'f [u8]> {
        self.file.dereference(self.pointer, TABLE_ALIGNMENT)
    }

    fn items_offset(&self) -> usize {
        4 + self.n_buckets as usize * 4
    }

    /// Chain tail index stored in `bucket`
    fn bucket_tail(&self, bucket: u32) -> Result<u32> {
        let region = self.region()?;
        let start = 4 + bucket as usize * 4;
        let bytes = region[start..start + 4].try_into().unwrap();
        Ok(self.file.endian().decode_u32(bytes))
    }

    /// Decode the item at `index`, rejecting out-of-range chain links
    pub(crate) fn item_at(&self, index: u32) -> Result<ItemHandle> {
        if index >= self.n_items {
            return Err(HiveError::Format(format!(
                "item index out of bounds: {} >= {} items",
                index, self.n_items
            )));
        }

        let region = self.region()?;
        let start = self.items_offset() + index as usize * ITEM_SIZE;
        let bytes: &[u8; ITEM_SIZE] = region[start..start + ITEM_SIZE].try_into().unwrap();
        Ok(ItemHandle::decode(index, bytes, self.file.endian()))
    }

    /// The key text of `item`
    pub fn key(&self, item: &ItemHandle) -> Result<String> {
        let bytes = self.key_bytes(item)?;
        String::from_utf8(bytes.to_vec()).map_err(|err| {
            HiveError::Format(format!(
                "key at {}..{} is not valid UTF-8: {}",
                item.key_ptr().start(),
                item.key_ptr().end(),
                err
            ))
        })
    }

    fn key_bytes(&self, item: &ItemHandle) -> Result<&'f [u8]> {
        self.file.dereference(item.key_ptr(), 1)
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// Resolve `key` to an item handle without scanning all entries
    ///
    /// Walks the key's bucket chain from the tail, comparing the stored
    /// hash first and the key bytes second. With duplicate keys the first
    /// structural match wins, which is the most recently inserted one.
    /// A miss is `Ok(None)`; corrupt chains are `Format` errors.
    pub fn lookup(&self, key: &str) -> Result<Option<ItemHandle>> {
        if self.n_buckets == 0 || self.n_items == 0 {
            return Ok(None);
        }

        let hash = table_hash(key);
        let bucket = hash % self.n_buckets;

        let mut index = self.bucket_tail(bucket)?;
        let mut hops: u32 = 0;

        while index != SENTINEL {
            hops += 1;
            if hops > self.n_items {
                return Err(HiveError::Format(format!(
                    "chain cycle detected in bucket {}: more than {} links",
                    bucket, self.n_items
                )));
            }

            let item = self.item_at(index)?;
            if item.hash() == hash && self.key_bytes(&item)? == key.as_bytes() {
                tracing::trace!("lookup hit for {:?} after {} hops", key, hops);
                return Ok(Some(item));
            }

            index = item.previous();
        }

        Ok(None)
    }

    /// The payload bytes of `item`, or `None` if it carries a child table
    pub fn value_bytes(&self, item: &ItemHandle) -> Result<Option<&'f [u8]>> {
        match item.kind() {
            ItemKind::Payload => Ok(Some(self.file.dereference(item.value_ptr(), 1)?)),
            ItemKind::ChildTable => Ok(None),
        }
    }

    /// A reader for `item`'s nested table, or `None` if it carries a payload
    pub fn child_table(&self, item: &ItemHandle) -> Result<Option<TableReader<'f, 'a>>> {
        match item.kind() {
            ItemKind::ChildTable => Ok(Some(TableReader::new(self.file, item.value_ptr())?)),
            ItemKind::Payload => Ok(None),
        }
    }

    /// Lazily enumerate every key in this region
    ///
    /// Buckets are visited in order and each chain from its tail, so the
    /// order is the bucket layout's, not insertion order. The iterator is
    /// restartable: each call starts a fresh walk.
    pub fn names(&self) -> NamesIter<'_, 'f, 'a> {
        NamesIter {
            table: self,
            bucket: 0,
            index: SENTINEL,
            hops: 0,
            done: self.n_buckets == 0,
        }
    }
}

// =============================================================================
// Name Iteration
// =============================================================================

/// Lazy iterator over a region's keys, in bucket order then chain order
pub struct NamesIter<'t, 'f, 'a> {
    table: &'t TableReader<'f, 'a>,
    /// Next bucket to start once the current chain is exhausted
    bucket: u32,
    /// Current position in the chain, sentinel when between buckets
    index: u32,
    /// Links followed in the current chain, for cycle detection
    hops: u32,
    done: bool,
}

impl Iterator for NamesIter<'_, '_, '_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.index != SENTINEL {
                self.hops += 1;
                if self.hops > self.table.n_items {
                    self.done = true;
                    return Some(Err(HiveError::Format(format!(
                        "chain cycle detected in bucket {}: more than {} links",
                        self.bucket.saturating_sub(1),
                        self.table.n_items
                    ))));
                }

                let item = match self.table.item_at(self.index) {
                    Ok(item) => item,
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                };

                self.index = item.previous();
                return Some(self.table.key(&item));
            }

            // Current chain exhausted; move to the next bucket
            if self.bucket >= self.table.n_buckets {
                self.done = true;
                return None;
            }

            self.index = match self.table.bucket_tail(self.bucket) {
                Ok(tail) => tail,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            };
            self.bucket += 1;
            self.hops = 0;
        }
    }
}
