//! Hive File Reader
//!
//! Opens a hive byte stream and validates the header eagerly; everything
//! past the header is dereferenced lazily, per access, with bounds checks.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use crate::endian::Endian;
use crate::error::{HiveError, Result};
use crate::format::{FORMAT_VERSION, HEADER_SIZE, SIGNATURE_0, SIGNATURE_1};
use crate::pointer::Pointer;

use super::navigator::Navigator;
use super::table::TableReader;

/// Byte source backing an open file
#[derive(Debug)]
enum Data<'a> {
    Cow(Cow<'a, [u8]>),
    Mmap(memmap2::Mmap),
}

impl AsRef<[u8]> for Data<'_> {
    fn as_ref(&self) -> &[u8] {
        match self {
            Data::Cow(cow) => cow.as_ref(),
            Data::Mmap(mmap) => mmap.as_ref(),
        }
    }
}

/// An open, immutable hive file
///
/// Owns the byte source; every [`TableReader`] and [`Navigator`] derived
/// from it is a non-owning view and cannot outlive it. Readers never
/// mutate the source, so one open file can serve any number of threads.
#[derive(Debug)]
pub struct HiveFile<'a> {
    data: Data<'a>,
    endian: Endian,
}

impl<'a> HiveFile<'a> {
    /// Interpret a byte slice as a hive file
    ///
    /// Validates the signature (detecting the byte order) and the format
    /// version; pointer targets are only validated when dereferenced.
    pub fn from_bytes(bytes: Cow<'a, [u8]>) -> Result<Self> {
        let endian = Self::parse_header(bytes.as_ref())?;

        tracing::debug!(
            "opened hive file: {} bytes, {:?} endian",
            bytes.len(),
            endian
        );

        Ok(Self {
            data: Data::Cow(bytes),
            endian,
        })
    }

    /// Read a file from disk into memory and interpret it as a hive file
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file = std::fs::File::open(path)?;
        let mut data = Vec::with_capacity(file.metadata()?.len() as usize);
        file.read_to_end(&mut data)?;
        Self::from_bytes(Cow::Owned(data))
    }

    /// Memory-map a file from disk and interpret it as a hive file
    ///
    /// # Safety
    ///
    /// The file must not be modified on disk while the map is active;
    /// concurrent modification is undefined behavior. Callers must provide
    /// their own locking or work on files nothing else writes to.
    pub unsafe fn from_file_mmap(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let mmap = memmap2::Mmap::map(&file)?;

        let endian = Self::parse_header(mmap.as_ref())?;

        tracing::debug!(
            "mapped hive file: {} bytes, {:?} endian",
            mmap.len(),
            endian
        );

        Ok(Self {
            data: Data::Mmap(mmap),
            endian,
        })
    }

    /// Validate signature and version; returns the detected byte order
    fn parse_header(data: &[u8]) -> Result<Endian> {
        let header = data.get(0..HEADER_SIZE).ok_or_else(|| {
            HiveError::Format(format!(
                "file too small for header: expected at least {} bytes, got {}",
                HEADER_SIZE,
                data.len()
            ))
        })?;

        let half0 = u32::from_le_bytes(header[0..4].try_into().unwrap());
        let half1 = u32::from_le_bytes(header[4..8].try_into().unwrap());

        let endian = if half0 == SIGNATURE_0 && half1 == SIGNATURE_1 {
            Endian::Little
        } else if half0 == SIGNATURE_0.swap_bytes() && half1 == SIGNATURE_1.swap_bytes() {
            Endian::Big
        } else {
            return Err(HiveError::Format(format!(
                "bad signature: {:02x?}. Is this a hive file?",
                &header[0..8]
            )));
        };

        let version = endian.decode_u32(header[8..12].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(HiveError::Format(format!(
                "unsupported format version: expected {}, got {}",
                FORMAT_VERSION, version
            )));
        }

        Ok(endian)
    }

    /// The detected byte order of this file
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Total size of the underlying byte source
    pub fn len(&self) -> usize {
        self.data.as_ref().len()
    }

    /// Whether the byte source is empty (never true for a valid file)
    pub fn is_empty(&self) -> bool {
        self.data.as_ref().is_empty()
    }

    /// The root hash table of the file
    pub fn root_table(&self) -> Result<TableReader<'_, 'a>> {
        let root = self.root_pointer()?;
        TableReader::new(self, root)
    }

    /// A navigator over the root table with the default `.` separator
    pub fn navigator(&self) -> Result<Navigator<'_, 'a>> {
        Navigator::new(self)
    }

    fn root_pointer(&self) -> Result<Pointer> {
        // Header presence was validated at open
        let bytes: [u8; Pointer::ENCODED_SIZE] =
            self.data.as_ref()[12..HEADER_SIZE].try_into().unwrap();
        Ok(Pointer::decode(bytes, self.endian))
    }

    /// Resolve a pointer to its byte range, bounds-checked against the file
    pub(crate) fn dereference(&self, pointer: Pointer, alignment: usize) -> Result<&[u8]> {
        let start = pointer.start() as usize;
        let end = pointer.end() as usize;
        let data = self.data.as_ref();

        if start > end {
            return Err(HiveError::Format(format!(
                "inverted pointer range: start {} > end {}",
                start, end
            )));
        }

        if start & (alignment - 1) != 0 {
            return Err(HiveError::Format(format!(
                "misaligned pointer: offset {} is not {}-byte aligned",
                start, alignment
            )));
        }

        data.get(start..end).ok_or_else(|| {
            HiveError::Format(format!(
                "pointer out of bounds: {}..{} exceeds file size {}",
                start,
                end,
                data.len()
            ))
        })
    }
}
