//! Parsed document content.
//!
//! A [`Document`] owns the parsed XML parts of an ODF or OOXML file. The HTML
//! translator walks it through [`DocumentCursor`], which borrows the document
//! and so never outlives it.
//!
//! ```rust,no_run
//! use odr::file::DecodedFile;
//!
//! let file = DecodedFile::open("report.odt")?;
//! let document_file = file.document_file()?;
//! let document = document_file.document()?;
//! println!("{}", document.root().text_content());
//! # Ok::<(), odr::common::Error>(())
//! ```

pub mod cursor;
pub mod journal;
pub mod odf;
pub mod ooxml;
pub mod relationships;

pub use cursor::{CursorChildren, DocumentCursor, DocumentTree, NodeRef};
pub use journal::EditJournal;
pub use odf::OdfDocument;
pub use ooxml::OoxmlDocument;
pub use relationships::{Relationship, Relationships};

use crate::access::ReadStorage;
use crate::common::{Error, Result};
use crate::file::{DocumentMeta, DocumentType, FileType};

#[derive(Debug, Clone)]
pub enum Document {
    Odf(OdfDocument),
    Ooxml(OoxmlDocument),
}

impl Document {
    /// Parse the content of a package of the given type.
    pub fn open(storage: &dyn ReadStorage, file_type: FileType) -> Result<Self> {
        if file_type.is_open_document() {
            Ok(Document::Odf(OdfDocument::open(storage, file_type)?))
        } else if file_type.is_office_open_xml() && file_type != FileType::OfficeOpenXmlEncrypted {
            Ok(Document::Ooxml(OoxmlDocument::open(storage, file_type)?))
        } else {
            Err(Error::Unsupported(format!("no document model for {:?}", file_type)))
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            Document::Odf(doc) => doc.file_type(),
            Document::Ooxml(doc) => doc.file_type(),
        }
    }

    pub fn document_type(&self) -> DocumentType {
        match self {
            Document::Odf(doc) => doc.document_type(),
            Document::Ooxml(doc) => doc.document_type(),
        }
    }

    pub fn tree(&self) -> &dyn DocumentTree {
        match self {
            Document::Odf(doc) => doc,
            Document::Ooxml(doc) => doc,
        }
    }

    pub fn root(&self) -> DocumentCursor<'_> {
        DocumentCursor::root(self.tree())
    }

    pub fn document_meta(&self) -> DocumentMeta {
        match self {
            Document::Odf(doc) => doc.document_meta(),
            Document::Ooxml(doc) => doc.document_meta(),
        }
    }

    /// Replace the text of a text node. Returns `false` if `node` is not a
    /// text node of this document.
    pub fn set_text(&mut self, node: NodeRef, text: &str) -> Result<bool> {
        match self {
            Document::Odf(doc) => Ok(doc.set_text(node, text)),
            Document::Ooxml(_) => Err(Error::Unsupported("editing OOXML content".to_string())),
        }
    }
}
