//! Storage rooted at a directory of the host filesystem.

use super::storage::{EntryKind, ReadStorage, WriteStorage};
use super::stream::{FileSource, Sink, Source};
use crate::common::{Error, Path, Result};
use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SystemStorage {
    root: PathBuf,
}

impl SystemStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Host path of a storage path; `None` if it would escape the root.
    pub fn host_path(&self, path: &Path) -> Option<PathBuf> {
        let mut host = self.root.clone();
        for segment in path.segments() {
            if segment == ".." {
                return None;
            }
            host.push(segment);
        }
        Some(host)
    }

    fn collect(&self, dir: &std::path::Path, base: &Path, out: &mut Vec<(Path, EntryKind)>) {
        let Ok(read_dir) = fs::read_dir(dir) else {
            return;
        };
        let mut children: Vec<_> = read_dir.flatten().collect();
        children.sort_by_key(|entry| entry.file_name());
        for child in children {
            let name = child.file_name().to_string_lossy().into_owned();
            let path = base.child(&name);
            let Ok(file_type) = child.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                out.push((path.clone(), EntryKind::Directory));
                self.collect(&child.path(), &path, out);
            } else {
                out.push((path, EntryKind::File));
            }
        }
    }
}

impl ReadStorage for SystemStorage {
    fn is_file(&self, path: &Path) -> bool {
        self.host_path(path).is_some_and(|p| p.is_file())
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.host_path(path).is_some_and(|p| p.is_dir())
    }

    fn is_readable(&self, path: &Path) -> bool {
        self.host_path(path)
            .is_some_and(|p| p.is_file() && fs::File::open(p).is_ok())
    }

    fn size(&self, path: &Path) -> Result<u64> {
        let host = self
            .host_path(path)
            .ok_or_else(|| Error::FileNotFound(path.to_string()))?;
        let metadata = fs::metadata(host).map_err(|_| Error::FileNotFound(path.to_string()))?;
        Ok(if metadata.is_file() { metadata.len() } else { 0 })
    }

    fn visit(&self, visitor: &mut dyn FnMut(&Path, EntryKind)) {
        let mut entries = Vec::new();
        self.collect(&self.root, &Path::root(), &mut entries);
        for (path, kind) in &entries {
            visitor(path, *kind);
        }
    }

    fn read(&self, path: &Path) -> Result<Box<dyn Source + '_>> {
        let host = self
            .host_path(path)
            .filter(|p| p.is_file())
            .ok_or_else(|| Error::FileNotFound(path.to_string()))?;
        Ok(Box::new(FileSource::open(&host)?))
    }
}

impl WriteStorage for SystemStorage {
    fn is_writeable(&self, path: &Path) -> bool {
        self.host_path(path).is_some_and(|p| {
            let target = if p.exists() { p } else { p.parent().map(|d| d.to_path_buf()).unwrap_or_default() };
            fs::metadata(target).is_ok_and(|m| !m.permissions().readonly())
        })
    }

    fn remove(&self, path: &Path) -> Result<bool> {
        let Some(host) = self.host_path(path) else {
            return Ok(false);
        };
        if host.is_dir() {
            fs::remove_dir_all(host)?;
        } else if host.is_file() {
            fs::remove_file(host)?;
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<bool> {
        let (Some(source), Some(target)) = (self.host_path(from), self.host_path(to)) else {
            return Ok(false);
        };
        if !source.is_file() {
            return Ok(false);
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|_| Error::FileNotCreated(to.to_string()))?;
        }
        fs::copy(source, target).map_err(|_| Error::FileNotCreated(to.to_string()))?;
        Ok(true)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<bool> {
        let (Some(source), Some(target)) = (self.host_path(from), self.host_path(to)) else {
            return Ok(false);
        };
        if !source.exists() {
            return Ok(false);
        }
        fs::rename(source, target).map_err(|_| Error::FileNotCreated(to.to_string()))?;
        Ok(true)
    }

    fn create_directory(&self, path: &Path) -> Result<bool> {
        let host = self
            .host_path(path)
            .ok_or_else(|| Error::FileNotCreated(path.to_string()))?;
        if host.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(host).map_err(|_| Error::FileNotCreated(path.to_string()))?;
        Ok(true)
    }

    fn write(&self, path: &Path) -> Result<Box<dyn Sink + '_>> {
        let host = self
            .host_path(path)
            .filter(|_| !path.is_root())
            .ok_or_else(|| Error::FileNotCreated(path.to_string()))?;
        if let Some(parent) = host.parent() {
            fs::create_dir_all(parent).map_err(|_| Error::FileNotCreated(path.to_string()))?;
        }
        let file = fs::File::create(host).map_err(|_| Error::FileNotCreated(path.to_string()))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}
