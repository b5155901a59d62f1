//! File classification, opening and decryption.
//!
//! ```rust,no_run
//! use odr::file::{DecodedFile, EncryptionState};
//!
//! let mut file = DecodedFile::open("protected.docx")?;
//! let document = file.document_file_mut()?;
//! if document.encryption_state() == EncryptionState::Unknown && !document.decrypt("secret")? {
//!     eprintln!("wrong password");
//! }
//! # Ok::<(), odr::common::Error>(())
//! ```

pub mod crypto;
pub mod decoded;
pub mod detect;
pub mod open_strategy;
pub mod types;

pub use decoded::{DecodedFile, DocumentFile, ImageFile, UnknownFile};
pub use detect::{classify, detect};
pub use open_strategy::SharedStorage;
pub use types::{
    DocumentMeta, DocumentType, EncryptionState, EntryMeta, FileCategory, FileMeta, FileType,
};
