//! Minimal compound file writer used to build test fixtures.
//!
//! Produces version 3 files (512-byte sectors) with the layout
//! `[FAT][DIFAT?][directory][mini FAT][mini stream][large streams]` so tests
//! can locate and corrupt individual tables. FAT entry `i` lives at byte
//! offset `512 + 4 * i`.

use super::consts::*;
use std::collections::BTreeMap;

const SECTOR: usize = 512;
const MINI: usize = 64;

#[derive(Debug, Clone, Default)]
pub(crate) struct CfbBuilder {
    storages: Vec<String>,
    streams: Vec<(String, Vec<u8>)>,
    external_difat: bool,
}

/// Where the builder placed things.
#[derive(Debug, Clone, Default)]
pub(crate) struct Layout {
    pub fat_sectors: u32,
    pub first_dir_sector: u32,
    pub first_minifat_sector: u32,
    /// Stream path -> (start sector, stored in mini stream)
    pub streams: BTreeMap<String, (u32, bool)>,
}

struct Node {
    name: String,
    kind: u8,
    data: Vec<u8>,
    children: Vec<usize>,
    start: u32,
}

impl CfbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage(mut self, path: &str) -> Self {
        self.storages.push(path.to_string());
        self
    }

    pub fn stream(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.streams.push((path.to_string(), data.into()));
        self
    }

    /// Store all FAT locations in a DIFAT sector instead of the header.
    pub fn external_difat(mut self) -> Self {
        self.external_difat = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_with_layout().0
    }

    pub fn build_with_layout(&self) -> (Vec<u8>, Layout) {
        let mut nodes = vec![Node {
            name: "Root Entry".to_string(),
            kind: STGTY_ROOT,
            data: Vec::new(),
            children: Vec::new(),
            start: ENDOFCHAIN,
        }];
        let mut paths: BTreeMap<String, usize> = BTreeMap::new();

        let mut ensure_storage = |nodes: &mut Vec<Node>, path: &str| -> usize {
            let mut parent = 0usize;
            let mut current = String::new();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                if !current.is_empty() {
                    current.push('/');
                }
                current.push_str(segment);
                parent = match paths.get(&current) {
                    Some(&index) => index,
                    None => {
                        let index = nodes.len();
                        nodes.push(Node {
                            name: segment.to_string(),
                            kind: STGTY_STORAGE,
                            data: Vec::new(),
                            children: Vec::new(),
                            start: 0,
                        });
                        nodes[parent].children.push(index);
                        paths.insert(current.clone(), index);
                        index
                    },
                };
            }
            parent
        };

        for storage in &self.storages {
            ensure_storage(&mut nodes, storage);
        }
        let mut stream_nodes = Vec::new();
        for (path, data) in &self.streams {
            let (parent_path, name) = match path.rfind('/') {
                Some(pos) => (&path[..pos], &path[pos + 1..]),
                None => ("", path.as_str()),
            };
            let parent = ensure_storage(&mut nodes, parent_path);
            let index = nodes.len();
            nodes.push(Node {
                name: name.to_string(),
                kind: STGTY_STREAM,
                data: data.clone(),
                children: Vec::new(),
                start: ENDOFCHAIN,
            });
            nodes[parent].children.push(index);
            stream_nodes.push((path.clone(), index));
        }

        // Mini stream and mini FAT.
        let mut ministream = Vec::new();
        let mut minifat: Vec<u32> = Vec::new();
        for &(_, index) in &stream_nodes {
            let len = nodes[index].data.len();
            if len == 0 || len >= MINI_STREAM_CUTOFF as usize {
                continue;
            }
            let first = minifat.len() as u32;
            let count = len.div_ceil(MINI);
            for i in 0..count {
                let next = if i + 1 == count { ENDOFCHAIN } else { first + i as u32 + 1 };
                minifat.push(next);
            }
            nodes[index].start = first;
            ministream.extend_from_slice(&nodes[index].data);
            ministream.resize(ministream.len().div_ceil(MINI) * MINI, 0);
        }

        let dir_sectors = (nodes.len() * DIRENTRY_SIZE).div_ceil(SECTOR);
        let minifat_sectors = (minifat.len() * 4).div_ceil(SECTOR);
        let ministream_sectors = ministream.len().div_ceil(SECTOR);
        let large_sectors: usize = stream_nodes
            .iter()
            .map(|&(_, index)| nodes[index].data.len())
            .filter(|&len| len >= MINI_STREAM_CUTOFF as usize)
            .map(|len| len.div_ceil(SECTOR))
            .sum();
        let difat_sectors = usize::from(self.external_difat);
        let others = dir_sectors + minifat_sectors + ministream_sectors + large_sectors + difat_sectors;
        let mut fat_sectors = 1;
        while fat_sectors * (SECTOR / 4) < others + fat_sectors {
            fat_sectors += 1;
        }
        let total = fat_sectors + others;

        let mut fat = vec![FREESECT; fat_sectors * (SECTOR / 4)];
        let mut next_free = 0usize;
        let mut allocate = |fat: &mut Vec<u32>, count: usize, marker: Option<u32>| -> u32 {
            let first = next_free;
            for i in 0..count {
                fat[first + i] = match marker {
                    Some(marker) => marker,
                    None if i + 1 == count => ENDOFCHAIN,
                    None => (first + i + 1) as u32,
                };
            }
            next_free += count;
            if count == 0 { ENDOFCHAIN } else { first as u32 }
        };

        allocate(&mut fat, fat_sectors, Some(FATSECT));
        let difat_start = allocate(&mut fat, difat_sectors, Some(DIFSECT));
        let dir_start = allocate(&mut fat, dir_sectors, None);
        let minifat_start = allocate(&mut fat, minifat_sectors, None);
        let ministream_start = allocate(&mut fat, ministream_sectors, None);
        nodes[0].start = ministream_start;

        let mut layout = Layout {
            fat_sectors: fat_sectors as u32,
            first_dir_sector: dir_start,
            first_minifat_sector: minifat_start,
            streams: BTreeMap::new(),
        };

        let mut large_data = Vec::new();
        for (path, index) in &stream_nodes {
            let len = nodes[*index].data.len();
            if len >= MINI_STREAM_CUTOFF as usize {
                let start = allocate(&mut fat, len.div_ceil(SECTOR), None);
                nodes[*index].start = start;
                large_data.push(*index);
                layout.streams.insert(path.clone(), (start, false));
            } else {
                layout.streams.insert(path.clone(), (nodes[*index].start, true));
            }
        }

        // Header
        let mut out = Vec::with_capacity((total + 1) * SECTOR);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[0u8; 16]);
        out.extend_from_slice(&0x3Eu16.to_le_bytes());
        out.extend_from_slice(&3u16.to_le_bytes());
        out.extend_from_slice(&BYTE_ORDER_MARK.to_le_bytes());
        out.extend_from_slice(&SECTOR_SHIFT_V3.to_le_bytes());
        out.extend_from_slice(&MINI_SECTOR_SHIFT.to_le_bytes());
        out.extend_from_slice(&[0u8; 6]);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(fat_sectors as u32).to_le_bytes());
        out.extend_from_slice(&dir_start.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&MINI_STREAM_CUTOFF.to_le_bytes());
        out.extend_from_slice(&minifat_start.to_le_bytes());
        out.extend_from_slice(&(minifat_sectors as u32).to_le_bytes());
        out.extend_from_slice(&difat_start.to_le_bytes());
        out.extend_from_slice(&(difat_sectors as u32).to_le_bytes());
        for i in 0..HEADER_DIFAT_ENTRIES {
            let value = if !self.external_difat && i < fat_sectors {
                i as u32
            } else {
                FREESECT
            };
            out.extend_from_slice(&value.to_le_bytes());
        }
        assert_eq!(out.len(), SECTOR);

        // FAT
        for entry in &fat {
            out.extend_from_slice(&entry.to_le_bytes());
        }

        // DIFAT
        if self.external_difat {
            let mut sector = vec![FREESECT; SECTOR / 4];
            for (i, slot) in sector.iter_mut().take(fat_sectors).enumerate() {
                *slot = i as u32;
            }
            sector[SECTOR / 4 - 1] = ENDOFCHAIN;
            for word in sector {
                out.extend_from_slice(&word.to_le_bytes());
            }
        }

        // Directory
        let mut dir = Vec::with_capacity(dir_sectors * SECTOR);
        for node in &nodes {
            let size = if node.kind == STGTY_ROOT {
                ministream.len() as u64
            } else {
                node.data.len() as u64
            };
            let child = node.children.first().map_or(NOSTREAM, |&c| c as u32);
            dir.extend_from_slice(&directory_entry(&node.name, node.kind, child, node.start, size));
        }
        // right-sibling links within each storage
        for node in &nodes {
            for pair in node.children.windows(2) {
                let offset = pair[0] * DIRENTRY_SIZE + 0x48;
                dir[offset..offset + 4].copy_from_slice(&(pair[1] as u32).to_le_bytes());
            }
        }
        dir.resize(dir_sectors * SECTOR, 0);
        out.extend_from_slice(&dir);

        // Mini FAT
        let mut minifat_bytes: Vec<u8> = minifat.iter().flat_map(|e| e.to_le_bytes()).collect();
        minifat_bytes.resize(minifat_sectors * SECTOR, 0xFF);
        out.extend_from_slice(&minifat_bytes);

        // Mini stream
        let mut ministream_bytes = ministream.clone();
        ministream_bytes.resize(ministream_sectors * SECTOR, 0);
        out.extend_from_slice(&ministream_bytes);

        // Large streams
        for index in large_data {
            let mut data = nodes[index].data.clone();
            data.resize(data.len().div_ceil(SECTOR) * SECTOR, 0);
            out.extend_from_slice(&data);
        }

        assert_eq!(out.len(), (total + 1) * SECTOR);
        (out, layout)
    }
}

fn directory_entry(name: &str, kind: u8, child: u32, start: u32, size: u64) -> [u8; DIRENTRY_SIZE] {
    let mut entry = [0u8; DIRENTRY_SIZE];
    let units: Vec<u16> = name.encode_utf16().take(31).collect();
    for (i, unit) in units.iter().enumerate() {
        entry[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
    }
    entry[0x40..0x42].copy_from_slice(&(((units.len() + 1) * 2) as u16).to_le_bytes());
    entry[0x42] = kind;
    entry[0x43] = 1;
    entry[0x44..0x48].copy_from_slice(&NOSTREAM.to_le_bytes());
    entry[0x48..0x4C].copy_from_slice(&NOSTREAM.to_le_bytes());
    entry[0x4C..0x50].copy_from_slice(&child.to_le_bytes());
    entry[0x74..0x78].copy_from_slice(&start.to_le_bytes());
    entry[0x78..0x80].copy_from_slice(&size.to_le_bytes());
    entry
}

/// Overwrite FAT entry `index` of a fixture built by [`CfbBuilder`].
pub(crate) fn set_fat_entry(data: &mut [u8], index: u32, value: u32) {
    let offset = SECTOR + index as usize * 4;
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Overwrite mini FAT entry `index` of a fixture built by [`CfbBuilder`].
pub(crate) fn set_minifat_entry(data: &mut [u8], layout: &Layout, index: u32, value: u32) {
    let offset = (layout.first_minifat_sector as usize + 1) * SECTOR + index as usize * 4;
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
