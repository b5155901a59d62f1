//! Unified error types for odr.
//!
//! This module provides a single error type covering the storage layer, the
//! open-strategy dispatcher, decryption and the external converters.
use thiserror::Error;

/// Main error type for odr operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input does not start with the compound file magic
    #[error("not a compound file")]
    NotCfbFile,

    /// Invalid sector reference, non-terminating chain or malformed directory
    #[error("compound file corrupted: {0}")]
    CfbFileCorrupted(String),

    /// Path does not resolve inside an opened storage
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Path could not be created inside a writable storage
    #[error("file not created: {0}")]
    FileNotCreated(String),

    /// The dispatcher could not classify the input
    #[error("unknown file type")]
    UnknownFileType,

    /// A document view was requested from a file that is not a document
    #[error("not a document file")]
    NoDocumentFile,

    /// An image view was requested from a file that is not an image
    #[error("not an image file")]
    NoImageFile,

    /// The content is encrypted and no password was supplied yet
    #[error("password required")]
    PasswordRequired,

    /// The supplied password does not unlock the content
    #[error("wrong password")]
    WrongPassword,

    /// An external converter failed
    #[error("conversion failed: {0}")]
    ConversionFailure(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Unsupported feature
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Result type for odr operations.
pub type Result<T> = std::result::Result<T, Error>;
