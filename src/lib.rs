//! odr - Open document reader
//!
//! This library opens office documents and renders them as HTML. It reads
//! OpenDocument (text, spreadsheet, presentation, drawing; packaged and flat),
//! Office Open XML (Word, PowerPoint, Excel, including Standard-encrypted
//! packages), legacy Word documents and PDFs through external converters, and
//! StarView metafiles.
//!
//! # Features
//!
//! - **Storage layer**: ZIP packages, compound files (CFB), directories on
//!   disk and single raw streams behind one path-addressed trait
//! - **Open-strategy dispatcher**: classifies files by magic bytes and package
//!   markers, with an optional caller hint
//! - **Document cursor**: format-agnostic traversal of parsed documents
//! - **HTML translation**: handler registry with table windowing, image
//!   embedding and editable text
//! - **Edit round trip**: browser edits applied back to OpenDocument files
//!
//! # Example - Converting a document
//!
//! ```no_run
//! use odr::file::DecodedFile;
//! use odr::html::{HtmlConfig, convert};
//!
//! # fn main() -> Result<(), odr::Error> {
//! let mut file = DecodedFile::open("report.odt")?;
//! let html = convert(&mut file, "out", &HtmlConfig::default(), None)?;
//! println!("wrote {}", html.pages[0].path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Editing and saving
//!
//! ```no_run
//! use odr::file::DecodedFile;
//! use odr::html::{HtmlConfig, translate};
//!
//! # fn main() -> Result<(), odr::Error> {
//! let file = DecodedFile::open("notes.odt")?;
//! let mut document_file = file.into_document_file()?;
//! let output = translate(&document_file, &HtmlConfig::new().with_editable(true))?;
//!
//! // diff.json as downloaded by the edit script of `output.to_page()`
//! let diff = r#"{"modifiedText": {"0": "New first paragraph"}}"#;
//! document_file.apply_edits(&output.journal, diff)?;
//! document_file.save("notes-edited.odt")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Low-level compound file access
//!
//! ```no_run
//! use odr::access::{CfbReader, ReadStorage};
//! use odr::common::Path;
//!
//! # fn main() -> Result<(), odr::Error> {
//! let reader = CfbReader::open(std::fs::read("legacy.doc")?)?;
//! let data = reader.read_to_vec(&Path::new("WordDocument"))?;
//! println!("WordDocument: {} bytes", data.len());
//! # Ok(())
//! # }
//! ```

/// Storage backends: compound files, ZIP packages, directories and raw
/// streams behind the [`access::ReadStorage`] contract.
pub mod access;

/// Errors, virtual paths and the XML tree shared by every layer.
pub mod common;

/// Parsed ODF and OOXML documents and the cursor used to walk them.
pub mod document;

/// File classification, decoded file views, encryption and metadata.
pub mod file;

/// HTML translation and conversion.
pub mod html;

/// Metafile to SVG conversion.
pub mod images;

pub use common::{Error, Result};
pub use file::{DecodedFile, DocumentFile, FileType};
pub use html::{HtmlConfig, convert, translate};
