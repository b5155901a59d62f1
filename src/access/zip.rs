//! ZIP package storage (ODF and OOXML containers).

use super::storage::{EntryKind, ReadStorage};
use super::stream::{SliceSource, Source};
use crate::common::{Error, Path, Result};
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{Cursor, Read, Seek, Write};
use zip::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Local file header magic.
pub const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Upper bound for buffers sized from a member's declared length.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// Read-only storage over an in-memory ZIP archive.
///
/// Member names are normalized into [`Path`]s; every parent of a member is
/// reported as a directory even when the archive has no explicit entry for
/// it.
#[derive(Debug, Clone)]
pub struct ZipStorage {
    archive: ZipArchive<Cursor<Bytes>>,
    /// File path -> (member name, uncompressed size)
    files: BTreeMap<Path, (String, u64)>,
    directories: BTreeSet<Path>,
}

impl ZipStorage {
    pub fn open(data: impl Into<Bytes>) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data.into()))?;
        let mut files = BTreeMap::new();
        let mut directories = BTreeSet::new();

        for i in 0..archive.len() {
            let file = archive.by_index_raw(i)?;
            let name = file.name().to_string();
            let path = Path::new(&name);
            if path.is_root() {
                continue;
            }

            let mut parent = path.parent();
            while let Some(dir) = parent {
                if dir.is_root() {
                    break;
                }
                parent = dir.parent();
                directories.insert(dir);
            }

            if file.is_dir() {
                directories.insert(path);
            } else {
                files.insert(path, (name, file.size()));
            }
        }

        Ok(Self {
            archive,
            files,
            directories,
        })
    }

    /// Names of all files in archive order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.archive.file_names()
    }
}

impl ReadStorage for ZipStorage {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_root() || (self.directories.contains(path) && !self.files.contains_key(path))
    }

    fn size(&self, path: &Path) -> Result<u64> {
        if let Some((_, size)) = self.files.get(path) {
            return Ok(*size);
        }
        if self.is_directory(path) {
            return Ok(0);
        }
        Err(Error::FileNotFound(path.to_string()))
    }

    fn visit(&self, visitor: &mut dyn FnMut(&Path, EntryKind)) {
        let mut all: Vec<(&Path, EntryKind)> = self
            .directories
            .iter()
            .filter(|dir| !self.files.contains_key(*dir))
            .map(|dir| (dir, EntryKind::Directory))
            .chain(self.files.keys().map(|file| (file, EntryKind::File)))
            .collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        for (path, kind) in all {
            visitor(path, kind);
        }
    }

    /// Inflate a member. Fails unless it yields exactly the size declared in
    /// the central directory.
    fn read(&self, path: &Path) -> Result<Box<dyn Source + '_>> {
        let (name, size) = self
            .files
            .get(path)
            .ok_or_else(|| Error::FileNotFound(path.to_string()))?;
        let size = *size;

        // Cloning shares the parsed central directory; only the cursor is new.
        let mut archive = self.archive.clone();
        let file = archive.by_name(name)?;
        let mut content = Vec::with_capacity(size.min(MAX_PREALLOCATION) as usize);
        file.take(size.saturating_add(1)).read_to_end(&mut content)?;
        if content.len() as u64 != size {
            return Err(Error::Zip(format!(
                "{}: {} bytes declared, {} read",
                name,
                size,
                content.len()
            )));
        }
        Ok(Box::new(SliceSource::new(content)))
    }
}

/// Write every file of `storage` into a new ZIP archive.
///
/// Files listed in `replacements` are written with the replacement content.
/// A `mimetype` member is written first and stored uncompressed, as ODF
/// packages require.
pub fn write_archive<W: Write + Seek>(
    storage: &dyn ReadStorage,
    replacements: &HashMap<Path, Vec<u8>>,
    writer: W,
) -> Result<W> {
    let mut archive = ZipWriter::new(writer);
    let mimetype = Path::new("mimetype");

    let mut files = Vec::new();
    storage.visit(&mut |path, kind| {
        if kind == EntryKind::File && *path != mimetype {
            files.push(path.clone());
        }
    });

    if storage.is_file(&mimetype) {
        let content = match replacements.get(&mimetype) {
            Some(content) => content.clone(),
            None => storage.read_to_vec(&mimetype)?,
        };
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        archive.start_file("mimetype", options)?;
        archive.write_all(&content)?;
    }

    for path in files {
        let content = match replacements.get(&path) {
            Some(content) => content.clone(),
            None => storage.read_to_vec(&path)?,
        };
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        archive.start_file(path.to_string(), options)?;
        archive.write_all(&content)?;
    }

    Ok(archive.finish()?)
}

#[cfg(test)]
pub(crate) mod fixture {
    use std::io::{Cursor, Write};
    use zip::write::{SimpleFileOptions, ZipWriter};

    /// Build an in-memory ZIP with the given members, in order.
    pub fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in members {
            let options = if *name == "mimetype" {
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored)
            } else {
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated)
            };
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::fixture::zip_bytes;
    use super::*;

    fn sample() -> ZipStorage {
        ZipStorage::open(zip_bytes(&[
            ("mimetype", b"application/vnd.oasis.opendocument.text"),
            ("content.xml", b"<office:document-content/>"),
            ("Pictures/image1.png", b"\x89PNG\r\n\x1a\n"),
            ("Configurations2/", b""),
        ]))
        .unwrap()
    }

    #[test]
    fn test_implied_directories() {
        let storage = sample();
        assert!(storage.is_directory(&Path::root()));
        assert!(storage.is_directory(&Path::new("Pictures")));
        assert!(storage.is_directory(&Path::new("Configurations2")));
        assert!(storage.is_file(&Path::new("Pictures/image1.png")));
        assert!(!storage.is_file(&Path::new("Pictures")));
        assert!(!storage.exists(&Path::new("Thumbnails")));
    }

    #[test]
    fn test_size_matches_read() {
        let storage = sample();
        for entry in storage.entries() {
            if entry.kind == EntryKind::File {
                let data = storage.read_to_vec(&entry.path).unwrap();
                assert_eq!(storage.size(&entry.path).unwrap(), data.len() as u64);
            }
        }
        assert!(matches!(
            storage.read(&Path::new("missing.xml")),
            Err(Error::FileNotFound(_))
        ));
        assert!(matches!(storage.read(&Path::new("Pictures")), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_visit_sorted() {
        let storage = sample();
        let paths: Vec<String> = storage.entries().iter().map(|e| e.path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "Configurations2",
                "Pictures",
                "Pictures/image1.png",
                "content.xml",
                "mimetype"
            ]
        );
    }

    #[test]
    fn test_write_archive_replaces_and_orders_mimetype_first() {
        let storage = sample();
        let mut replacements = HashMap::new();
        replacements.insert(Path::new("content.xml"), b"<new/>".to_vec());

        let out = write_archive(&storage, &replacements, Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let copy = ZipStorage::open(out).unwrap();

        assert_eq!(copy.file_names().next(), Some("mimetype"));
        assert_eq!(copy.read_to_vec(&Path::new("content.xml")).unwrap(), b"<new/>");
        assert_eq!(
            copy.read_to_vec(&Path::new("Pictures/image1.png")).unwrap(),
            b"\x89PNG\r\n\x1a\n"
        );
    }

    /// Overwrite the uncompressed size of the first central directory record.
    fn patch_declared_size(mut data: Vec<u8>, size: u32) -> Vec<u8> {
        let record = memchr::memmem::find(&data, b"PK\x01\x02").unwrap();
        data[record + 24..record + 28].copy_from_slice(&size.to_le_bytes());
        data
    }

    #[test]
    fn test_declared_size_must_match_content() {
        let data = patch_declared_size(zip_bytes(&[("a.txt", b"data")]), 0xFFFF_FFF0);
        let storage = ZipStorage::open(data).unwrap();
        let path = Path::new("a.txt");
        assert_eq!(storage.size(&path).unwrap(), 0xFFFF_FFF0);
        assert!(matches!(storage.read_to_vec(&path), Err(Error::Zip(_))));

        let data = patch_declared_size(zip_bytes(&[("a.txt", b"data")]), 4);
        let storage = ZipStorage::open(data).unwrap();
        assert_eq!(storage.read_to_vec(&path).unwrap(), b"data");
    }

    #[test]
    fn test_not_a_zip() {
        assert!(ZipStorage::open(b"not a zip".to_vec()).is_err());
    }
}
