//! Read Module
//!
//! Opens hive files and resolves names on demand.
//!
//! ## Responsibilities
//! - Open a byte source (borrowed slice, whole-file read, or mmap)
//! - Detect the file byte order from the signature
//! - Walk bucket chains to resolve a name without scanning all entries
//! - Hand out payload byte ranges and nested table readers lazily
//!
//! Readers never mutate the byte source and hold no interior state beyond
//! the region they point at, so any number of them can be used concurrently
//! from multiple threads over one open file. Corruption is detected per
//! access: a damaged region that is never dereferenced never surfaces.

mod file;
mod item;
mod navigator;
mod table;

pub use file::HiveFile;
pub use item::{ItemHandle, ItemKind};
pub use navigator::Navigator;
pub use table::{NamesIter, TableReader};
