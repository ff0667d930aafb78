//! File Assembler
//!
//! Owns the append-only output cursor and turns a [`TableBuilder`] tree
//! into the final byte stream. Regions are staged as chunks with fixed
//! offsets, so a parent item can point at a child table as soon as the
//! child's extent is assigned; the header is filled in last, once the root
//! table's extent is known.

use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;

use crate::endian::Endian;
use crate::error::{HiveError, Result};
use crate::format::{
    align_offset, RawItem, CHILD_TABLE_TAG, FORMAT_VERSION, HEADER_SIZE, ITEM_SIZE, MAX_FILE_SIZE,
    PAYLOAD_ALIGNMENT, SENTINEL, SIGNATURE_0, SIGNATURE_1, TABLE_ALIGNMENT,
};
use crate::hash::table_hash;
use crate::pointer::Pointer;

use super::builder::{bucket_layout, BuilderNode, TableBuilder};

/// A staged region with its final position in the output stream
#[derive(Debug)]
struct Chunk {
    pointer: Pointer,
    data: Box<[u8]>,
}

/// Serializes a [`TableBuilder`] tree into one contiguous hive file
///
/// The assembler is single use: one build produces one byte stream. On any
/// error nothing valid has been produced and partially written output must
/// be discarded.
pub struct FileAssembler {
    endian: Endian,
    /// Next free offset in the output stream
    offset: usize,
    /// Chunk 0 is the header, reserved at construction and filled in last
    chunks: VecDeque<Chunk>,
}

impl FileAssembler {
    /// Create an assembler producing little-endian files (the default)
    pub fn new() -> Self {
        Self::with_endian(Endian::Little)
    }

    /// Create an assembler producing files in the given byte order
    pub fn with_endian(endian: Endian) -> Self {
        let mut this = Self {
            endian,
            offset: 0,
            chunks: VecDeque::new(),
        };

        // Reserve the header region; its fields are patched in serialize()
        this.chunks.push_back(Chunk {
            pointer: Pointer::new(0, HEADER_SIZE as u32),
            data: vec![0u8; HEADER_SIZE].into_boxed_slice(),
        });
        this.offset = HEADER_SIZE;

        this
    }

    /// The byte order this assembler writes
    pub fn endian(&self) -> Endian {
        self.endian
    }

    // -------------------------------------------------------------------------
    // Chunk allocation
    // -------------------------------------------------------------------------

    /// Stage a chunk at the next aligned offset, returning its index
    fn allocate_chunk(&mut self, data: Box<[u8]>, alignment: usize) -> Result<usize> {
        let start = align_offset(self.offset, alignment);
        let end = start + data.len();

        if end > MAX_FILE_SIZE {
            return Err(HiveError::Validation(format!(
                "output exceeds the maximum file size: {} > {} bytes",
                end, MAX_FILE_SIZE
            )));
        }

        self.offset = end;
        self.chunks.push_back(Chunk {
            pointer: Pointer::new(start as u32, end as u32),
            data,
        });

        Ok(self.chunks.len() - 1)
    }

    fn add_key(&mut self, key: &str) -> Result<Pointer> {
        let data = key.as_bytes().to_vec().into_boxed_slice();
        let index = self.allocate_chunk(data, 1)?;
        Ok(self.chunks[index].pointer)
    }

    fn add_payload(&mut self, payload: &[u8]) -> Result<Pointer> {
        let data = payload.to_vec().into_boxed_slice();
        let index = self.allocate_chunk(data, PAYLOAD_ALIGNMENT)?;
        Ok(self.chunks[index].pointer)
    }

    // -------------------------------------------------------------------------
    // Table serialization
    // -------------------------------------------------------------------------

    /// Serialize one table region and (recursively) everything it owns.
    ///
    /// Layout per bucket: member items are placed contiguously in the item
    /// array in insertion order; the bucket slot stores the index of the
    /// last chain member and each item stores the index of the previous
    /// one, so readers walk the chain backward from the bucket head.
    fn add_table(&mut self, table: TableBuilder) -> Result<usize> {
        let entries = table.into_entries();
        let n_items = entries.len();

        let hashes: Vec<u32> = entries.iter().map(|(key, _)| table_hash(key)).collect();
        let layout = bucket_layout(&hashes);
        let n_buckets = layout.n_buckets as usize;

        let buckets_offset = 4;
        let items_offset = buckets_offset + n_buckets * 4;
        let region_size = items_offset + n_items * ITEM_SIZE;

        let table_index = self.allocate_chunk(
            vec![0u8; region_size].into_boxed_slice(),
            TABLE_ALIGNMENT,
        )?;

        let n_buckets_bytes = self.endian.encode_u32(layout.n_buckets);
        self.chunks[table_index].data[0..4].copy_from_slice(&n_buckets_bytes);

        // Entries move out of their slots one by one as the chains are laid out
        let mut slots: Vec<Option<(String, BuilderNode)>> = entries.into_iter().map(Some).collect();

        let mut item_index: u32 = 0;
        for (bucket, members) in layout.buckets.iter().enumerate() {
            let mut last = SENTINEL;

            for &entry_idx in members {
                let (key, node) = slots[entry_idx].take().unwrap();

                let key_ptr = self.add_key(&key)?;
                let (value_ptr, tag) = match node {
                    BuilderNode::Payload(payload) => (self.add_payload(&payload)?, 0),
                    BuilderNode::Table(child) => {
                        let child_index = self.add_table(child)?;
                        (self.chunks[child_index].pointer, CHILD_TABLE_TAG)
                    }
                };

                let item = RawItem {
                    hash: hashes[entry_idx],
                    previous: last,
                    key_start: key_ptr.start(),
                    key_size: key_ptr.size() as u32,
                    value_start: value_ptr.start() | tag,
                    value_end: value_ptr.end(),
                };

                let item_start = items_offset + item_index as usize * ITEM_SIZE;
                self.chunks[table_index].data[item_start..item_start + ITEM_SIZE]
                    .copy_from_slice(&item.encode(self.endian));

                last = item_index;
                item_index += 1;
            }

            let bucket_start = buckets_offset + bucket * 4;
            let tail_bytes = self.endian.encode_u32(last);
            self.chunks[table_index].data[bucket_start..bucket_start + 4]
                .copy_from_slice(&tail_bytes);
        }

        tracing::trace!(
            "serialized table region: {} items, {} buckets, {} bytes",
            n_items,
            n_buckets,
            region_size
        );

        Ok(table_index)
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    /// Patch the header and stream every chunk, padding alignment gaps
    fn serialize(mut self, root_index: usize, writer: &mut dyn Write) -> Result<usize> {
        let root_ptr = self.chunks[root_index].pointer;

        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(&self.endian.encode_u32(SIGNATURE_0));
        header[4..8].copy_from_slice(&self.endian.encode_u32(SIGNATURE_1));
        header[8..12].copy_from_slice(&self.endian.encode_u32(FORMAT_VERSION));
        header[12..20].copy_from_slice(&root_ptr.encode(self.endian));
        self.chunks[0].data.copy_from_slice(&header);

        let mut size = 0;
        for chunk in self.chunks {
            let start = chunk.pointer.start() as usize;
            if size < start {
                let padding = start - size;
                writer.write_all(&vec![0u8; padding])?;
                size += padding;
            }

            writer.write_all(&chunk.data)?;
            size += chunk.data.len();
        }

        tracing::debug!("assembled hive file: {} bytes, {:?} endian", size, self.endian);

        Ok(size)
    }

    /// Serialize `table` as the root table into the provided writer.
    ///
    /// Returns the number of bytes written. If this fails partway, whatever
    /// reached the writer is not a valid file.
    pub fn write(mut self, table: TableBuilder, writer: &mut dyn Write) -> Result<usize> {
        let root_index = self.add_table(table)?;
        self.serialize(root_index, writer)
    }

    /// Serialize `table` as the root table into a fresh byte vector
    pub fn write_to_vec(mut self, table: TableBuilder) -> Result<Vec<u8>> {
        let root_index = self.add_table(table)?;
        let mut out = Vec::with_capacity(self.offset);
        self.serialize(root_index, &mut out)?;
        Ok(out)
    }

    /// Serialize `table` to `path`, staging through a `.tmp` sibling so the
    /// destination only ever holds a complete file
    pub fn write_to_file(self, table: TableBuilder, path: &Path) -> Result<()> {
        let mut tmp_name = path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = std::path::PathBuf::from(tmp_name);

        let data = self.write_to_vec(table)?;

        let mut file = std::fs::File::create(&tmp_path)?;
        if let Err(err) = file.write_all(&data).and_then(|_| file.sync_all()) {
            drop(file);
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        drop(file);

        if let Err(err) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err.into());
        }

        Ok(())
    }
}

impl Default for FileAssembler {
    fn default() -> Self {
        Self::new()
    }
}
