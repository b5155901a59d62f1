//! Storage construction for classified files.
//!
//! The backend is chosen by the container magic rather than by the declared
//! type: a flat ODF file or an image sits in a [`RawStorage`], a ZIP package
//! in a [`ZipStorage`], a compound file in a [`CfbReader`].

use super::types::{EncryptionState, FileType};
use crate::access::cfb::{CfbReader, is_cfb_file};
use crate::access::zip::ZIP_MAGIC;
use crate::access::{RawStorage, ReadStorage, ZipStorage};
use crate::common::{Path, Result};
use bytes::Bytes;
use memchr::memmem;
use std::io::Read;
use std::sync::Arc;

/// Storage shared between a decoded file and the documents parsed from it.
pub type SharedStorage = Arc<dyn ReadStorage + Send + Sync>;

/// Name of the only file of a [`RawStorage`] built here.
pub const RAW_FILE_NAME: &str = "file";

const MANIFEST: &str = "META-INF/manifest.xml";
const WORD_DOCUMENT: &str = "WordDocument";
/// `fEncrypted` in the flags word at offset 0x0A of the Word FIB
const FIB_ENCRYPTED: u16 = 0x0100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Raw,
    Zip,
    Cfb,
}

impl Backend {
    pub fn for_bytes(data: &[u8]) -> Self {
        if is_cfb_file(data) {
            Backend::Cfb
        } else if data.starts_with(ZIP_MAGIC) {
            Backend::Zip
        } else {
            Backend::Raw
        }
    }
}

/// Build the storage backend for `data`.
pub fn open_storage(data: Bytes) -> Result<(Backend, SharedStorage)> {
    let backend = Backend::for_bytes(&data);
    let storage: SharedStorage = match backend {
        Backend::Cfb => Arc::new(CfbReader::open(data)?),
        Backend::Zip => Arc::new(ZipStorage::open(data)?),
        Backend::Raw => Arc::new(RawStorage::new(RAW_FILE_NAME, data)),
    };
    Ok((backend, storage))
}

/// Encryption state a freshly opened file starts in.
pub fn initial_encryption_state(file_type: FileType, backend: Backend, storage: &dyn ReadStorage) -> EncryptionState {
    let encrypted = match file_type {
        FileType::OfficeOpenXmlEncrypted => true,
        t if t.is_open_document() && backend == Backend::Zip => odf_manifest_encrypted(storage),
        FileType::LegacyWordDocument if backend == Backend::Cfb => word_fib_encrypted(storage),
        _ => false,
    };
    if encrypted {
        EncryptionState::Unknown
    } else {
        EncryptionState::NotEncrypted
    }
}

fn odf_manifest_encrypted(storage: &dyn ReadStorage) -> bool {
    let manifest = Path::new(MANIFEST);
    if !storage.is_file(&manifest) {
        return false;
    }
    match storage.read_to_vec(&manifest) {
        Ok(xml) => memmem::find(&xml, b"manifest:encryption-data").is_some(),
        Err(e) => {
            log::warn!("unreadable {}: {}", MANIFEST, e);
            false
        },
    }
}

fn word_fib_encrypted(storage: &dyn ReadStorage) -> bool {
    let Ok(mut source) = storage.read(&Path::new(WORD_DOCUMENT)) else {
        return false;
    };
    let mut fib = [0u8; 12];
    if source.read_exact(&mut fib).is_err() {
        log::warn!("{} stream shorter than its FIB header", WORD_DOCUMENT);
        return false;
    }
    u16::from_le_bytes([fib[10], fib[11]]) & FIB_ENCRYPTED != 0
}
