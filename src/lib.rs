//! # hivefile
//!
//! An immutable, file-backed, hierarchical hash-table serialization format:
//! - One builder run produces one contiguous byte stream
//! - Readers resolve names on demand, directly over mapped or buffered bytes
//! - Nested sub-tables at arbitrary depth
//! - Little- or big-endian files, auto-detected from the signature at open
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       TableBuilder                           │
//! │        (in-memory tree: payload bytes / nested tables)       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  one pass, post-order pointer patching
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      FileAssembler                           │
//! │     (header + table regions + key/payload chunks + padding)  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  single contiguous byte stream
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        HiveFile                              │
//! │            (Cow<[u8]> | whole-file read | mmap)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ TableReader │          │  Navigator  │
//!   │ (per region)│          │ (path walk) │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use hivefile::{FileAssembler, HiveFile, TableBuilder};
//!
//! let mut inner = TableBuilder::new();
//! inner.insert_bytes("int", vec![42]).unwrap();
//!
//! let mut root = TableBuilder::new();
//! root.insert_bytes("string", b"test string".as_slice()).unwrap();
//! root.insert_table("table", inner).unwrap();
//!
//! let data = FileAssembler::new().write_to_vec(root).unwrap();
//!
//! let file = HiveFile::from_bytes(data.into()).unwrap();
//! let table = file.root_table().unwrap();
//! let item = table.lookup("string").unwrap().unwrap();
//! assert_eq!(table.value_bytes(&item).unwrap(), Some(b"test string".as_slice()));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;

pub mod endian;
pub mod format;
pub mod hash;
pub mod pointer;

pub mod read;
pub mod write;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{HiveError, Result};

pub use endian::Endian;
pub use hash::table_hash;
pub use pointer::Pointer;

pub use read::{HiveFile, ItemHandle, ItemKind, Navigator, TableReader};
pub use write::{FileAssembler, TableBuilder};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the hivefile crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
