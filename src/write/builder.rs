//! Table Builder
//!
//! In-memory representation of one hash table before serialization. Entries
//! keep their insertion order; bucket assignment and chain layout happen
//! here, but no bytes are produced until the [`FileAssembler`] runs.
//!
//! [`FileAssembler`]: super::FileAssembler

use bytes::Bytes;

use crate::error::{HiveError, Result};

/// Builder for one hash table: an ordered collection of keyed entries
///
/// Keys must be non-empty. Inserting the same key twice keeps both entries;
/// they end up in the same bucket chain and a reader's first-match rule
/// resolves the lookup to the most recently inserted one.
#[derive(Debug, Default)]
pub struct TableBuilder {
    /// Entries in insertion order; order is preserved within each bucket
    entries: Vec<(String, BuilderNode)>,
}

/// Content of one entry before serialization
#[derive(Debug)]
pub(crate) enum BuilderNode {
    /// Opaque payload bytes (externally encoded)
    Payload(Bytes),
    /// A nested table, serialized recursively into its own region
    Table(TableBuilder),
}

impl TableBuilder {
    /// Create an empty table builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert opaque payload bytes for `key`
    pub fn insert_bytes(
        &mut self,
        key: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Result<()> {
        self.insert_node(key.into(), BuilderNode::Payload(payload.into()))
    }

    /// Insert a nested table for `key`
    pub fn insert_table(&mut self, key: impl Into<String>, table: TableBuilder) -> Result<()> {
        self.insert_node(key.into(), BuilderNode::Table(table))
    }

    fn insert_node(&mut self, key: String, node: BuilderNode) -> Result<()> {
        if key.is_empty() {
            return Err(HiveError::Validation(
                "table keys must be non-empty".to_string(),
            ));
        }

        self.entries.push((key, node));
        Ok(())
    }

    /// Number of entries inserted so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been inserted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<(String, BuilderNode)> {
        self.entries
    }
}

// =============================================================================
// Bucket Layout
// =============================================================================

/// Deterministic bucket assignment for a table's entries.
///
/// The sizing rule is fixed: one bucket per entry (zero for an empty
/// table). Readers never re-derive the rule; they use the stored count.
pub(crate) struct BucketLayout {
    pub n_buckets: u32,
    /// Entry indices grouped per bucket, insertion order preserved
    pub buckets: Vec<Vec<usize>>,
}

pub(crate) fn bucket_layout(hashes: &[u32]) -> BucketLayout {
    let n_buckets = hashes.len() as u32;
    let mut buckets = vec![Vec::new(); hashes.len()];

    if n_buckets > 0 {
        for (entry_idx, hash) in hashes.iter().enumerate() {
            buckets[(hash % n_buckets) as usize].push(entry_idx);
        }
    }

    BucketLayout { n_buckets, buckets }
}
