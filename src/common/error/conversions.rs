//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! and foreign error types to the unified Error type.

use super::types::Error;
use crate::access::cfb::CfbError;

impl From<CfbError> for Error {
    fn from(err: CfbError) -> Self {
        match err {
            CfbError::Io(e) => Error::Io(e),
            CfbError::NotCfbFile => Error::NotCfbFile,
            CfbError::Corrupted(s) => Error::CfbFileCorrupted(s),
            CfbError::StreamNotFound(path) => Error::FileNotFound(path),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::encoding::EncodingError> for Error {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for Error {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => Error::FileNotFound("zip member".to_string()),
            other => Error::Zip(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(format!("invalid edit diff: {}", err))
    }
}
