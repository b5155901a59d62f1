//! Compound File Binary (CFB) reader.
//!
//! The legacy office formats (`.doc`, `.xls`, `.ppt`) and password protected
//! OOXML packages are stored in a sector-chained compound file. This module
//! parses the header, the DIFAT, FAT and mini-FAT, reconstructs the directory
//! tree and exposes the result through [`ReadStorage`](super::ReadStorage).
//!
//! # Example
//!
//! ```no_run
//! use odr::access::{ReadStorage, cfb::CfbReader};
//! use odr::common::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfb = CfbReader::open(std::fs::read("document.doc")?)?;
//! let word = cfb.read_to_vec(&Path::new("WordDocument"))?;
//! println!("{} bytes", word.len());
//! # Ok(())
//! # }
//! ```

pub mod consts;
mod header;
mod reader;

#[cfg(test)]
pub(crate) mod fixture;

pub use reader::{CfbReader, CfbStream, DirectoryEntry, EntryType, is_cfb_file};

use thiserror::Error;

/// Errors raised while opening or reading a compound file.
#[derive(Error, Debug)]
pub enum CfbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The buffer does not start with the compound file magic
    #[error("not a compound file")]
    NotCfbFile,

    /// Invalid header field, sector reference, chain or directory tree
    #[error("compound file corrupted: {0}")]
    Corrupted(String),

    #[error("stream not found: {0}")]
    StreamNotFound(String),
}
