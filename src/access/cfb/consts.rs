/// Magic bytes at the beginning of every compound file
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Size of the fixed header in bytes
pub const HEADER_SIZE: usize = 512;

/// Size of a directory entry in bytes
pub const DIRENTRY_SIZE: usize = 128;

/// Number of FAT sector locations stored inline in the header
pub const HEADER_DIFAT_ENTRIES: usize = 109;

/// Sector shift for version 3 files (512-byte sectors)
pub const SECTOR_SHIFT_V3: u16 = 9;

/// Sector shift for version 4 files (4096-byte sectors)
pub const SECTOR_SHIFT_V4: u16 = 12;

/// The only mini-sector shift allowed (64-byte mini sectors)
pub const MINI_SECTOR_SHIFT: u16 = 6;

/// Streams shorter than this live in the mini stream
pub const MINI_STREAM_CUTOFF: u32 = 4096;

/// Little-endian byte order mark
pub const BYTE_ORDER_MARK: u16 = 0xFFFE;

// Sector IDs
/// Denotes a DIFAT sector in a FAT
pub const DIFSECT: u32 = 0xFFFFFFFC; // -4
/// Denotes a FAT sector in a FAT
pub const FATSECT: u32 = 0xFFFFFFFD; // -3
/// End of a sector chain
pub const ENDOFCHAIN: u32 = 0xFFFFFFFE; // -2
/// Unallocated sector
pub const FREESECT: u32 = 0xFFFFFFFF; // -1

/// No sibling or child directory entry
pub const NOSTREAM: u32 = 0xFFFFFFFF;

// Object types in storage
/// Unallocated directory entry
pub const STGTY_EMPTY: u8 = 0;
/// Element is a storage object
pub const STGTY_STORAGE: u8 = 1;
/// Element is a stream object
pub const STGTY_STREAM: u8 = 2;
/// Element is the root storage
pub const STGTY_ROOT: u8 = 5;
