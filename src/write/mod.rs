//! Write Module
//!
//! Builds hive files from in-memory key/value trees.
//!
//! ## Responsibilities
//! - Collect (key, payload | nested table) entries in insertion order
//! - Assign items to hash buckets and lay out collision chains
//! - Serialize tables, keys, and payloads into one contiguous byte stream
//! - Emit the header last, once the root table's extent is known
//!
//! One build produces one file; there is no in-place update path. Partial
//! output from a failed build is never a valid file and must be discarded
//! by the caller (the file-path output stages to a temp file and renames,
//! so a crashed build leaves nothing at the destination).

mod assembler;
mod builder;

pub use assembler::FileAssembler;
pub use builder::TableBuilder;
