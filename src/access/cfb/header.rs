//! On-disk records of the compound file format.

use zerocopy::{LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

use super::consts::HEADER_DIFAT_ENTRIES;

/// Raw compound file header (512 bytes).
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
#[allow(dead_code)]
pub(crate) struct RawHeader {
    /// Magic signature, see [`super::consts::MAGIC`]
    pub signature: [u8; 8],
    pub clsid: [u8; 16],
    pub minor_version: U16<LE>,
    /// 3 for 512-byte sectors, 4 for 4096-byte sectors
    pub major_version: U16<LE>,
    pub byte_order: U16<LE>,
    pub sector_shift: U16<LE>,
    pub mini_sector_shift: U16<LE>,
    pub reserved: [u8; 6],
    /// Always 0 for version 3 files
    pub num_dir_sectors: U32<LE>,
    pub num_fat_sectors: U32<LE>,
    pub first_dir_sector: U32<LE>,
    pub transaction_signature: U32<LE>,
    pub mini_stream_cutoff: U32<LE>,
    pub first_minifat_sector: U32<LE>,
    pub num_minifat_sectors: U32<LE>,
    pub first_difat_sector: U32<LE>,
    pub num_difat_sectors: U32<LE>,
    /// First FAT sector locations
    pub difat: [U32<LE>; HEADER_DIFAT_ENTRIES],
}

/// Raw directory entry (128 bytes).
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
#[allow(dead_code)]
pub(crate) struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    pub name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    pub name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    pub entry_type: u8,
    /// Node color (0 = red, 1 = black)
    pub node_color: u8,
    pub sid_left: U32<LE>,
    pub sid_right: U32<LE>,
    pub sid_child: U32<LE>,
    pub clsid: [u8; 16],
    pub state_bits: U32<LE>,
    pub creation_time: U64<LE>,
    pub modified_time: U64<LE>,
    pub start_sector: U32<LE>,
    pub stream_size: U64<LE>,
}

/// Decode a UTF-16LE entry name.
pub(crate) fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}
