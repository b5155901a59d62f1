//! Pass-through storage for single-stream formats (PDF, images, metafiles).

use super::storage::{EntryKind, ReadStorage};
use super::stream::{SliceSource, Source};
use crate::common::{Error, Path, Result};
use bytes::Bytes;

/// Exposes one byte buffer as the only file of a storage.
#[derive(Debug, Clone)]
pub struct RawStorage {
    name: Path,
    data: Bytes,
}

impl RawStorage {
    pub fn new(name: &str, data: impl Into<Bytes>) -> Self {
        Self {
            name: Path::new(name),
            data: data.into(),
        }
    }

    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl ReadStorage for RawStorage {
    fn is_file(&self, path: &Path) -> bool {
        *path == self.name
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_root()
    }

    fn size(&self, path: &Path) -> Result<u64> {
        if self.is_file(path) {
            Ok(self.data.len() as u64)
        } else if path.is_root() {
            Ok(0)
        } else {
            Err(Error::FileNotFound(path.to_string()))
        }
    }

    fn visit(&self, visitor: &mut dyn FnMut(&Path, EntryKind)) {
        visitor(&self.name, EntryKind::File);
    }

    fn read(&self, path: &Path) -> Result<Box<dyn Source + '_>> {
        if !self.is_file(path) {
            return Err(Error::FileNotFound(path.to_string()));
        }
        Ok(Box::new(SliceSource::new(self.data.clone())))
    }
}
