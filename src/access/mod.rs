//! Storage backends.
//!
//! Every container the library opens is exposed as a path-addressed virtual
//! filesystem ([`ReadStorage`], and [`WriteStorage`] where modification
//! makes sense). The document model and the HTML translator only ever talk
//! to these traits.

pub mod cfb;
pub mod raw;
pub mod storage;
pub mod stream;
pub mod system;
pub mod zip;

pub use self::cfb::CfbReader;
pub use self::raw::RawStorage;
pub use self::storage::{EntryKind, ReadStorage, Storage, StorageEntry, WriteStorage};
pub use self::stream::{FileSource, Sink, SliceSource, Source, read_all};
pub use self::system::SystemStorage;
pub use self::zip::ZipStorage;
