//! Table Navigator
//!
//! Convenience layer over the root table: flat name lookups plus dotted
//! path descent through nested tables. Every committed item resolves to
//! either payload bytes or a nested table, never both and never neither,
//! so the navigator's answers are disjoint by construction.

use crate::error::Result;

use super::file::HiveFile;
use super::table::TableReader;

/// Path-aware facade over an open file's root table
#[derive(Debug, Clone)]
pub struct Navigator<'f, 'a> {
    root: TableReader<'f, 'a>,
    separator: char,
}

impl<'f, 'a> Navigator<'f, 'a> {
    /// Create a navigator with the default `.` path separator
    pub fn new(file: &'f HiveFile<'a>) -> Result<Self> {
        Self::with_separator(file, '.')
    }

    /// Create a navigator splitting paths on `separator`
    pub fn with_separator(file: &'f HiveFile<'a>, separator: char) -> Result<Self> {
        Ok(Self {
            root: file.root_table()?,
            separator,
        })
    }

    /// The root table this navigator walks from
    pub fn root(&self) -> &TableReader<'f, 'a> {
        &self.root
    }

    /// All top-level names, in bucket layout order
    pub fn names(&self) -> Result<Vec<String>> {
        self.root.names().collect()
    }

    /// Payload bytes for a top-level `name`
    ///
    /// `Ok(None)` if the name is absent or holds a nested table.
    pub fn value(&self, name: &str) -> Result<Option<&'f [u8]>> {
        match self.root.lookup(name)? {
            Some(item) => self.root.value_bytes(&item),
            None => Ok(None),
        }
    }

    /// Nested table for a top-level `name`
    ///
    /// `Ok(None)` if the name is absent or holds payload bytes.
    pub fn table(&self, name: &str) -> Result<Option<TableReader<'f, 'a>>> {
        match self.root.lookup(name)? {
            Some(item) => self.root.child_table(&item),
            None => Ok(None),
        }
    }

    /// Payload bytes at a separator-joined `path` (e.g. `"outer.inner.key"`)
    ///
    /// Every segment but the last must name a nested table. `Ok(None)` if
    /// any segment is missing or has the wrong shape.
    pub fn value_at(&self, path: &str) -> Result<Option<&'f [u8]>> {
        let (table, leaf) = match self.descend(path)? {
            Some(found) => found,
            None => return Ok(None),
        };

        match table.lookup(leaf)? {
            Some(item) => table.value_bytes(&item),
            None => Ok(None),
        }
    }

    /// Nested table at a separator-joined `path`
    pub fn table_at(&self, path: &str) -> Result<Option<TableReader<'f, 'a>>> {
        let (table, leaf) = match self.descend(path)? {
            Some(found) => found,
            None => return Ok(None),
        };

        match table.lookup(leaf)? {
            Some(item) => table.child_table(&item),
            None => Ok(None),
        }
    }

    /// Walk every intermediate segment of `path`, returning the table that
    /// should contain the final segment
    fn descend<'p>(&self, path: &'p str) -> Result<Option<(TableReader<'f, 'a>, &'p str)>> {
        let mut table = self.root.clone();
        let mut segments = path.split(self.separator).peekable();

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                return Ok(Some((table, segment)));
            }

            let item = match table.lookup(segment)? {
                Some(item) => item,
                None => return Ok(None),
            };

            table = match table.child_table(&item)? {
                Some(child) => child,
                None => return Ok(None),
            };
        }

        Ok(None)
    }
}
