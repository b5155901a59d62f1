use super::CfbError;
use super::consts::*;
use super::header::{RawDirectoryEntry, RawHeader, decode_utf16le};
use crate::access::storage::{EntryKind, ReadStorage};
use crate::access::stream::Source;
use crate::common::{Error, Path, Result};
use bytes::Bytes;
use fixedbitset::FixedBitSet;
use std::collections::HashMap;
use std::io::{self, Read};
use zerocopy::{FromBytes, LE, U32};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Storage,
    Stream,
    Root,
}

/// A directory entry (stream or storage) of an opened compound file.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Storage ID (index in the directory stream)
    pub sid: u32,
    pub name: String,
    pub entry_type: EntryType,
    pub clsid: [u8; 16],
    /// First sector of the stream
    pub start_sector: u32,
    /// Size of the stream in bytes
    pub size: u64,
    sid_left: u32,
    sid_right: u32,
    sid_child: u32,
}

/// Read-only compound file storage.
///
/// All tables are built once by [`CfbReader::open`] and never change, so
/// independent streams can be read concurrently through shared references.
#[derive(Debug)]
pub struct CfbReader {
    data: Bytes,
    sector_size: usize,
    mini_sector_size: usize,
    mini_stream_cutoff: u32,
    /// Number of sectors present in the file after the header
    total_sectors: usize,
    fat: Vec<u32>,
    minifat: Vec<u32>,
    /// Regular sectors holding the mini stream, in order
    ministream_sectors: Vec<u32>,
    ministream_size: u64,
    entries: Vec<Option<DirectoryEntry>>,
    index: HashMap<Path, u32>,
    /// Reachable entries in visit order
    order: Vec<(Path, u32)>,
}

/// Check whether a buffer starts with the compound file magic.
pub fn is_cfb_file(data: &[u8]) -> bool {
    data.len() >= MAGIC.len() && &data[..MAGIC.len()] == MAGIC
}

impl CfbReader {
    /// Parse a compound file held in memory.
    pub fn open(data: impl Into<Bytes>) -> std::result::Result<Self, CfbError> {
        let data = data.into();
        if !is_cfb_file(&data) {
            return Err(CfbError::NotCfbFile);
        }
        if data.len() < HEADER_SIZE {
            return Err(CfbError::Corrupted(format!(
                "header truncated at {} bytes",
                data.len()
            )));
        }

        let header = RawHeader::read_from_bytes(&data[..HEADER_SIZE])
            .map_err(|_| CfbError::Corrupted("unreadable header".to_string()))?;

        if header.byte_order.get() != BYTE_ORDER_MARK {
            return Err(CfbError::Corrupted(format!(
                "invalid byte order {:#06x}",
                header.byte_order.get()
            )));
        }

        let sector_shift = header.sector_shift.get();
        if sector_shift != SECTOR_SHIFT_V3 && sector_shift != SECTOR_SHIFT_V4 {
            return Err(CfbError::Corrupted(format!(
                "invalid sector shift {}",
                sector_shift
            )));
        }
        let mini_sector_shift = header.mini_sector_shift.get();
        if mini_sector_shift != MINI_SECTOR_SHIFT {
            return Err(CfbError::Corrupted(format!(
                "invalid mini sector shift {}",
                mini_sector_shift
            )));
        }

        let major_version = header.major_version.get();
        if (major_version == 3 && sector_shift != SECTOR_SHIFT_V3)
            || (major_version == 4 && sector_shift != SECTOR_SHIFT_V4)
        {
            return Err(CfbError::Corrupted(format!(
                "sector shift {} does not match version {}",
                sector_shift, major_version
            )));
        }

        let sector_size = 1usize << sector_shift;
        let mini_sector_size = 1usize << mini_sector_shift;
        if data.len() < sector_size {
            return Err(CfbError::Corrupted(
                "file shorter than its first sector".to_string(),
            ));
        }
        let total_sectors = (data.len() - sector_size).div_ceil(sector_size);

        let mut mini_stream_cutoff = header.mini_stream_cutoff.get();
        if mini_stream_cutoff != MINI_STREAM_CUTOFF {
            log::warn!(
                "unusual mini stream cutoff {}, using {}",
                mini_stream_cutoff,
                MINI_STREAM_CUTOFF
            );
            mini_stream_cutoff = MINI_STREAM_CUTOFF;
        }

        let mut cfb = CfbReader {
            data,
            sector_size,
            mini_sector_size,
            mini_stream_cutoff,
            total_sectors,
            fat: Vec::new(),
            minifat: Vec::new(),
            ministream_sectors: Vec::new(),
            ministream_size: 0,
            entries: Vec::new(),
            index: HashMap::new(),
            order: Vec::new(),
        };

        cfb.load_fat(&header)?;

        let first_minifat = header.first_minifat_sector.get();
        if header.num_minifat_sectors.get() > 0 && first_minifat != ENDOFCHAIN {
            cfb.load_minifat(first_minifat)?;
        }

        cfb.load_directory(header.first_dir_sector.get())?;

        Ok(cfb)
    }

    /// Read a whole compound file from any reader.
    pub fn from_reader<R: Read>(mut reader: R) -> std::result::Result<Self, CfbError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::open(data)
    }

    /// Collect the FAT sector locations from the header and the DIFAT chain,
    /// then load the FAT itself.
    fn load_fat(&mut self, header: &RawHeader) -> std::result::Result<(), CfbError> {
        let num_fat_sectors = header.num_fat_sectors.get() as usize;
        if num_fat_sectors == 0 {
            return Err(CfbError::Corrupted("no FAT sectors".to_string()));
        }
        if num_fat_sectors > self.total_sectors {
            return Err(CfbError::Corrupted(format!(
                "{} FAT sectors declared but only {} sectors present",
                num_fat_sectors, self.total_sectors
            )));
        }

        let mut fat_sectors = Vec::with_capacity(num_fat_sectors);
        for entry in header.difat.iter() {
            if fat_sectors.len() == num_fat_sectors {
                break;
            }
            let sector = entry.get();
            if sector == FREESECT || sector == ENDOFCHAIN {
                break;
            }
            fat_sectors.push(sector);
        }

        // Chained DIFAT sectors: every sector holds (sector_size / 4 - 1)
        // locations followed by the next DIFAT sector.
        let mut difat_sector = header.first_difat_sector.get();
        let mut visited = FixedBitSet::with_capacity(self.total_sectors);
        let per_sector = self.sector_size / 4 - 1;
        while fat_sectors.len() < num_fat_sectors {
            if difat_sector == ENDOFCHAIN || difat_sector == FREESECT {
                return Err(CfbError::Corrupted(format!(
                    "DIFAT ends after {} of {} FAT sectors",
                    fat_sectors.len(),
                    num_fat_sectors
                )));
            }
            let index = self.check_sector(difat_sector, "DIFAT")?;
            if visited.put(index) {
                return Err(CfbError::Corrupted(format!(
                    "DIFAT chain loops at sector {}",
                    difat_sector
                )));
            }
            let words = read_words(self.sector(difat_sector));
            if words.len() <= per_sector {
                return Err(CfbError::Corrupted(format!(
                    "DIFAT sector {} truncated",
                    difat_sector
                )));
            }
            for &sector in &words[..per_sector] {
                if fat_sectors.len() == num_fat_sectors {
                    break;
                }
                if sector == FREESECT || sector == ENDOFCHAIN {
                    continue;
                }
                fat_sectors.push(sector);
            }
            difat_sector = words[per_sector];
        }

        let entries_per_sector = self.sector_size / 4;
        let mut fat = Vec::with_capacity(num_fat_sectors * entries_per_sector);
        for &sector in &fat_sectors {
            self.check_sector(sector, "FAT")?;
            let words = read_words(self.sector(sector));
            fat.extend_from_slice(&words);
            // a truncated trailing FAT sector reads as free space
            fat.resize(fat.len() + entries_per_sector - words.len(), FREESECT);
        }
        self.fat = fat;
        Ok(())
    }

    fn load_minifat(&mut self, first_sector: u32) -> std::result::Result<(), CfbError> {
        let data = self.read_fat_chain(first_sector, "mini FAT")?;
        self.minifat = read_words(&data);
        Ok(())
    }

    fn load_directory(&mut self, first_sector: u32) -> std::result::Result<(), CfbError> {
        let dir_data = self.read_fat_chain(first_sector, "directory")?;
        let count = dir_data.len() / DIRENTRY_SIZE;
        if count == 0 {
            return Err(CfbError::Corrupted("empty directory".to_string()));
        }

        let mut entries = Vec::with_capacity(count);
        let mut roots = 0usize;
        for sid in 0..count {
            let offset = sid * DIRENTRY_SIZE;
            let entry = self.parse_directory_entry(&dir_data[offset..offset + DIRENTRY_SIZE], sid as u32)?;
            if let Some(ref entry) = entry
                && entry.entry_type == EntryType::Root
            {
                roots += 1;
            }
            entries.push(entry);
        }

        let root = match entries.first() {
            Some(Some(root)) if root.entry_type == EntryType::Root => root.clone(),
            _ => {
                return Err(CfbError::Corrupted(
                    "first directory entry is not the root".to_string(),
                ));
            },
        };
        if roots != 1 {
            return Err(CfbError::Corrupted(format!(
                "{} root entries in directory",
                roots
            )));
        }

        // The root's stream is the mini stream.
        if root.size > 0 {
            let sectors = self.walk_chain(&self.fat, root.start_sector, self.total_sectors, "mini stream")?;
            if (sectors.len() as u64) * (self.sector_size as u64) < root.size {
                return Err(CfbError::Corrupted(format!(
                    "mini stream holds {} sectors for {} bytes",
                    sectors.len(),
                    root.size
                )));
            }
            self.ministream_sectors = sectors;
            self.ministream_size = root.size;
        }

        self.entries = entries;
        self.build_index(&root)
    }

    fn parse_directory_entry(
        &self,
        data: &[u8],
        sid: u32,
    ) -> std::result::Result<Option<DirectoryEntry>, CfbError> {
        let raw = RawDirectoryEntry::read_from_bytes(data)
            .map_err(|_| CfbError::Corrupted(format!("unreadable directory entry {}", sid)))?;

        let entry_type = match raw.entry_type {
            STGTY_EMPTY => return Ok(None),
            STGTY_STORAGE => EntryType::Storage,
            STGTY_STREAM => EntryType::Stream,
            STGTY_ROOT => EntryType::Root,
            other => {
                log::debug!("directory entry {} has unsupported type {}", sid, other);
                return Ok(None);
            },
        };

        let name_len = (raw.name_len.get() as usize).min(64);
        let name = decode_utf16le(&raw.name[..name_len]);

        // Version 3 files only define the low 32 bits of the size.
        let size = if self.sector_size == 512 {
            raw.stream_size.get() & 0xFFFF_FFFF
        } else {
            raw.stream_size.get()
        };

        Ok(Some(DirectoryEntry {
            sid,
            name,
            entry_type,
            clsid: raw.clsid,
            start_sector: raw.start_sector.get(),
            size,
            sid_left: raw.sid_left.get(),
            sid_right: raw.sid_right.get(),
            sid_child: raw.sid_child.get(),
        }))
    }

    /// Walk the red-black tree below the root and index every reachable
    /// entry by its full path.
    fn build_index(&mut self, root: &DirectoryEntry) -> std::result::Result<(), CfbError> {
        let mut visited = FixedBitSet::with_capacity(self.entries.len());
        visited.insert(0);

        let top = self.collect_siblings(root.sid_child, &mut visited)?;
        let mut stack: Vec<(Path, std::vec::IntoIter<u32>)> = vec![(Path::root(), top.into_iter())];

        loop {
            let Some((parent, siblings)) = stack.last_mut() else {
                break;
            };
            let Some(sid) = siblings.next() else {
                stack.pop();
                continue;
            };
            let Some(entry) = self.entries[sid as usize].as_ref() else {
                continue;
            };
            let path = parent.child(&entry.name);
            let is_storage = entry.entry_type == EntryType::Storage;
            let child = entry.sid_child;

            if self.index.contains_key(&path) {
                log::warn!("duplicate compound file entry {}, keeping the first", path);
                continue;
            }
            self.index.insert(path.clone(), sid);
            self.order.push((path.clone(), sid));

            if is_storage {
                let children = self.collect_siblings(child, &mut visited)?;
                stack.push((path, children.into_iter()));
            }
        }
        Ok(())
    }

    /// In-order traversal of one sibling tree.
    fn collect_siblings(
        &self,
        start: u32,
        visited: &mut FixedBitSet,
    ) -> std::result::Result<Vec<u32>, CfbError> {
        let mut result = Vec::new();
        let mut stack = Vec::new();
        let mut current = start;

        loop {
            while current != NOSTREAM {
                let index = current as usize;
                let entry = match self.entries.get(index) {
                    Some(Some(entry)) => entry,
                    Some(None) => {
                        return Err(CfbError::Corrupted(format!(
                            "directory tree references unallocated entry {}",
                            current
                        )));
                    },
                    None => {
                        return Err(CfbError::Corrupted(format!(
                            "directory tree references entry {} of {}",
                            current,
                            self.entries.len()
                        )));
                    },
                };
                if entry.entry_type == EntryType::Root || visited.put(index) {
                    return Err(CfbError::Corrupted(format!(
                        "directory tree loops at entry {}",
                        current
                    )));
                }
                stack.push(current);
                current = entry.sid_left;
            }
            let Some(sid) = stack.pop() else {
                break;
            };
            result.push(sid);
            current = self.entries[sid as usize]
                .as_ref()
                .map_or(NOSTREAM, |entry| entry.sid_right);
        }
        Ok(result)
    }

    fn check_sector(&self, sector: u32, what: &str) -> std::result::Result<usize, CfbError> {
        let index = sector as usize;
        if index >= self.total_sectors {
            return Err(CfbError::Corrupted(format!(
                "{} references sector {} outside of [0, {})",
                what, sector, self.total_sectors
            )));
        }
        Ok(index)
    }

    /// Payload of a regular sector; the last sector of a short file may be
    /// truncated.
    fn sector(&self, sector: u32) -> &[u8] {
        let start = (sector as usize + 1) * self.sector_size;
        let end = (start + self.sector_size).min(self.data.len());
        if start >= end {
            return &[];
        }
        &self.data[start..end]
    }

    /// Payload of a mini sector inside the mini stream.
    fn mini_sector(&self, sector: u32) -> &[u8] {
        let offset = sector as usize * self.mini_sector_size;
        let Some(&regular) = self.ministream_sectors.get(offset / self.sector_size) else {
            return &[];
        };
        let payload = self.sector(regular);
        let start = (offset % self.sector_size).min(payload.len());
        let end = (start + self.mini_sector_size).min(payload.len());
        &payload[start..end]
    }

    /// Follow a chain until the end-of-chain sentinel.
    ///
    /// Every visited index must lie in `[0, limit)` and may be visited once,
    /// so a chain is at most `limit` hops long.
    fn walk_chain(
        &self,
        table: &[u32],
        start: u32,
        limit: usize,
        what: &str,
    ) -> std::result::Result<Vec<u32>, CfbError> {
        let limit = limit.min(table.len());
        let mut visited = FixedBitSet::with_capacity(limit);
        let mut chain = Vec::new();
        let mut current = start;

        while current != ENDOFCHAIN {
            let index = current as usize;
            if index >= limit {
                return Err(CfbError::Corrupted(format!(
                    "{} chain references sector {} outside of [0, {})",
                    what, current, limit
                )));
            }
            if visited.put(index) {
                return Err(CfbError::Corrupted(format!(
                    "{} chain does not terminate, sector {} repeats",
                    what, current
                )));
            }
            chain.push(current);
            current = table[index];
        }
        Ok(chain)
    }

    fn read_fat_chain(&self, start: u32, what: &str) -> std::result::Result<Vec<u8>, CfbError> {
        let chain = self.walk_chain(&self.fat, start, self.total_sectors, what)?;
        let mut data = Vec::with_capacity(chain.len() * self.sector_size);
        for sector in chain {
            data.extend_from_slice(self.sector(sector));
        }
        Ok(data)
    }

    fn entry_at(&self, path: &Path) -> Option<&DirectoryEntry> {
        let sid = *self.index.get(path)?;
        self.entries.get(sid as usize)?.as_ref()
    }

    /// Directory entry for a path, `None` for the root or unknown paths.
    pub fn entry(&self, path: &Path) -> Option<&DirectoryEntry> {
        self.entry_at(path)
    }

    /// Open a stream as a lazily decoded byte source.
    pub fn open_stream(&self, path: &Path) -> std::result::Result<CfbStream<'_>, CfbError> {
        let entry = self
            .entry_at(path)
            .filter(|entry| entry.entry_type == EntryType::Stream)
            .ok_or_else(|| CfbError::StreamNotFound(path.to_string()))?;

        if entry.size == 0 {
            return Ok(CfbStream {
                reader: self,
                sectors: Vec::new(),
                mini: false,
                unit: self.sector_size,
                position: 0,
                length: 0,
            });
        }

        let mini = entry.size < self.mini_stream_cutoff as u64;
        let (sectors, unit) = if mini {
            let capacity = (self.ministream_size as usize) / self.mini_sector_size;
            let chain = self.walk_chain(&self.minifat, entry.start_sector, capacity, "mini")?;
            (chain, self.mini_sector_size)
        } else {
            let chain = self.walk_chain(&self.fat, entry.start_sector, self.total_sectors, "stream")?;
            (chain, self.sector_size)
        };

        let available: u64 = if mini {
            sectors.iter().map(|&s| self.mini_sector(s).len() as u64).sum()
        } else {
            sectors.iter().map(|&s| self.sector(s).len() as u64).sum()
        };
        if available < entry.size {
            return Err(CfbError::Corrupted(format!(
                "stream {} holds {} of {} bytes",
                path, available, entry.size
            )));
        }

        Ok(CfbStream {
            reader: self,
            sectors,
            mini,
            unit,
            position: 0,
            length: entry.size,
        })
    }

    /// Read a whole stream.
    pub fn stream_bytes(&self, path: &Path) -> std::result::Result<Vec<u8>, CfbError> {
        let mut stream = self.open_stream(path)?;
        let mut data = Vec::with_capacity(stream.length as usize);
        stream.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Reachable entries in visit order.
    pub fn directory_entries(&self) -> impl Iterator<Item = (&Path, &DirectoryEntry)> {
        self.order.iter().filter_map(|(path, sid)| {
            self.entries
                .get(*sid as usize)
                .and_then(Option::as_ref)
                .map(|entry| (path, entry))
        })
    }

    /// CLSID of the root storage.
    pub fn root_clsid(&self) -> [u8; 16] {
        self.entries
            .first()
            .and_then(Option::as_ref)
            .map_or([0; 16], |root| root.clsid)
    }

    pub fn sector_size(&self) -> usize {
        self.sector_size
    }
}

impl ReadStorage for CfbReader {
    fn is_file(&self, path: &Path) -> bool {
        self.entry_at(path)
            .is_some_and(|entry| entry.entry_type == EntryType::Stream)
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_root()
            || self
                .entry_at(path)
                .is_some_and(|entry| entry.entry_type == EntryType::Storage)
    }

    fn size(&self, path: &Path) -> Result<u64> {
        if path.is_root() {
            return Ok(0);
        }
        match self.entry_at(path) {
            Some(entry) if entry.entry_type == EntryType::Stream => Ok(entry.size),
            Some(_) => Ok(0),
            None => Err(Error::FileNotFound(path.to_string())),
        }
    }

    fn visit(&self, visitor: &mut dyn FnMut(&Path, EntryKind)) {
        for (path, entry) in self.directory_entries() {
            let kind = if entry.entry_type == EntryType::Stream {
                EntryKind::File
            } else {
                EntryKind::Directory
            };
            visitor(path, kind);
        }
    }

    fn read(&self, path: &Path) -> Result<Box<dyn Source + '_>> {
        Ok(Box::new(self.open_stream(path)?))
    }
}

/// Lazily decoded stream of a [`CfbReader`].
///
/// The chain is validated when the stream is opened; reading copies sector
/// payloads in chain order and stops after exactly the entry's length.
#[derive(Debug)]
pub struct CfbStream<'a> {
    reader: &'a CfbReader,
    sectors: Vec<u32>,
    mini: bool,
    unit: usize,
    position: u64,
    length: u64,
}

impl CfbStream<'_> {
    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl Read for CfbStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position >= self.length || buf.is_empty() {
            return Ok(0);
        }
        let index = (self.position / self.unit as u64) as usize;
        let offset = (self.position % self.unit as u64) as usize;
        let Some(&sector) = self.sectors.get(index) else {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "sector chain shorter than stream",
            ));
        };
        let payload = if self.mini {
            self.reader.mini_sector(sector)
        } else {
            self.reader.sector(sector)
        };
        if offset >= payload.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "sector truncated",
            ));
        }
        let remaining = (self.length - self.position) as usize;
        let n = buf.len().min(payload.len() - offset).min(remaining);
        buf[..n].copy_from_slice(&payload[offset..offset + n]);
        self.position += n as u64;
        Ok(n)
    }
}

impl Source for CfbStream<'_> {
    fn available(&self) -> u64 {
        self.length - self.position
    }
}

fn read_words(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(4)
        .filter_map(|chunk| U32::<LE>::read_from_bytes(chunk).ok())
        .map(|word| word.get())
        .collect()
}
