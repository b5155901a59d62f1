//! Path-addressed virtual filesystem contract.
//!
//! Every container backend (compound file, ZIP package, a directory on disk,
//! a single raw file) implements [`ReadStorage`]; backends that can be
//! modified also implement [`WriteStorage`]. For any existing path exactly
//! one of `is_file`/`is_directory` holds, and `size` equals the number of
//! bytes obtainable by draining `read`.

use super::stream::{Sink, Source, read_all};
use crate::common::{Path, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry reported by [`ReadStorage::visit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub path: Path,
    pub kind: EntryKind,
}

pub trait ReadStorage {
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_directory(path)
    }

    fn is_file(&self, path: &Path) -> bool;

    fn is_directory(&self, path: &Path) -> bool;

    fn is_readable(&self, path: &Path) -> bool {
        self.is_file(path)
    }

    /// Size in bytes of a file; directories report 0.
    ///
    /// Fails with `FileNotFound` if the path does not exist.
    fn size(&self, path: &Path) -> Result<u64>;

    /// Invoke `visitor` once per entry, root excluded, in a stable order.
    fn visit(&self, visitor: &mut dyn FnMut(&Path, EntryKind));

    /// Open a file for reading.
    ///
    /// Fails with `FileNotFound` if the path is absent or a directory.
    fn read(&self, path: &Path) -> Result<Box<dyn Source + '_>>;

    /// Read a whole file into memory.
    fn read_to_vec(&self, path: &Path) -> Result<Vec<u8>> {
        let mut source = self.read(path)?;
        Ok(read_all(source.as_mut())?)
    }

    /// All entries in visit order.
    fn entries(&self) -> Vec<StorageEntry> {
        let mut entries = Vec::new();
        self.visit(&mut |path, kind| {
            entries.push(StorageEntry {
                path: path.clone(),
                kind,
            })
        });
        entries
    }
}

pub trait WriteStorage: ReadStorage {
    fn is_writeable(&self, path: &Path) -> bool;

    /// Remove a file or a directory tree. Returns `false` if nothing existed.
    fn remove(&self, path: &Path) -> Result<bool>;

    fn copy(&self, from: &Path, to: &Path) -> Result<bool>;

    fn rename(&self, from: &Path, to: &Path) -> Result<bool>;

    fn create_directory(&self, path: &Path) -> Result<bool>;

    /// Open a file for writing, creating or truncating it.
    ///
    /// Fails with `FileNotCreated` if the file cannot be created.
    fn write(&self, path: &Path) -> Result<Box<dyn Sink + '_>>;
}

/// A storage with both read and write sides.
pub trait Storage: ReadStorage + WriteStorage {}

impl<T: ReadStorage + WriteStorage> Storage for T {}
