//! File classification types and metadata.

use crate::common::{Error, Result};
use serde::Serialize;

/// Every file type the dispatcher can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Unknown,

    /// OpenDocument text (`.odt`, flat `.fodt`)
    OpenDocumentText,
    /// OpenDocument presentation (`.odp`, flat `.fodp`)
    OpenDocumentPresentation,
    /// OpenDocument spreadsheet (`.ods`, flat `.fods`)
    OpenDocumentSpreadsheet,
    /// OpenDocument drawing (`.odg`, flat `.fodg`)
    OpenDocumentGraphics,

    OfficeOpenXmlDocument,
    OfficeOpenXmlPresentation,
    OfficeOpenXmlWorkbook,
    /// Password protected OOXML package wrapped in a compound file
    OfficeOpenXmlEncrypted,

    LegacyWordDocument,
    LegacyPowerpointPresentation,
    LegacyExcelWorksheets,

    PortableDocumentFormat,

    StarviewMetafile,
    PortableNetworkGraphics,
    Jpeg,
    GraphicsInterchangeFormat,
    Bitmap,
    ScalableVectorGraphics,

    CompoundFileBinaryFormat,
    Zip,
}

/// Broad category of a [`FileType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Unknown,
    Archive,
    Document,
    Image,
}

/// Kind of content a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Text,
    Presentation,
    Spreadsheet,
    Drawing,
}

impl FileType {
    /// Guess a type from a file extension (case-insensitive, without dot).
    pub fn from_extension(extension: &str) -> FileType {
        match extension.to_ascii_lowercase().as_str() {
            "odt" | "fodt" | "ott" | "odm" => FileType::OpenDocumentText,
            "odp" | "fodp" | "otp" => FileType::OpenDocumentPresentation,
            "ods" | "fods" | "ots" => FileType::OpenDocumentSpreadsheet,
            "odg" | "fodg" | "otg" => FileType::OpenDocumentGraphics,
            "docx" | "docm" | "dotx" => FileType::OfficeOpenXmlDocument,
            "pptx" | "pptm" | "potx" => FileType::OfficeOpenXmlPresentation,
            "xlsx" | "xlsm" | "xltx" => FileType::OfficeOpenXmlWorkbook,
            "doc" | "dot" => FileType::LegacyWordDocument,
            "ppt" | "pot" => FileType::LegacyPowerpointPresentation,
            "xls" | "xlt" => FileType::LegacyExcelWorksheets,
            "pdf" => FileType::PortableDocumentFormat,
            "svm" => FileType::StarviewMetafile,
            "png" => FileType::PortableNetworkGraphics,
            "jpg" | "jpeg" | "jpe" => FileType::Jpeg,
            "gif" => FileType::GraphicsInterchangeFormat,
            "bmp" => FileType::Bitmap,
            "svg" => FileType::ScalableVectorGraphics,
            "cfb" => FileType::CompoundFileBinaryFormat,
            "zip" => FileType::Zip,
            _ => FileType::Unknown,
        }
    }

    /// Guess a type from a file name or path.
    pub fn from_file_name(name: &str) -> FileType {
        match name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => FileType::from_extension(extension),
            _ => FileType::Unknown,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            FileType::OpenDocumentText => "application/vnd.oasis.opendocument.text",
            FileType::OpenDocumentPresentation => "application/vnd.oasis.opendocument.presentation",
            FileType::OpenDocumentSpreadsheet => "application/vnd.oasis.opendocument.spreadsheet",
            FileType::OpenDocumentGraphics => "application/vnd.oasis.opendocument.graphics",
            FileType::OfficeOpenXmlDocument => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            },
            FileType::OfficeOpenXmlPresentation => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            },
            FileType::OfficeOpenXmlWorkbook => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            },
            FileType::OfficeOpenXmlEncrypted => "application/x-ooxml-encrypted",
            FileType::LegacyWordDocument => "application/msword",
            FileType::LegacyPowerpointPresentation => "application/vnd.ms-powerpoint",
            FileType::LegacyExcelWorksheets => "application/vnd.ms-excel",
            FileType::PortableDocumentFormat => "application/pdf",
            FileType::StarviewMetafile => "image/x-svm",
            FileType::PortableNetworkGraphics => "image/png",
            FileType::Jpeg => "image/jpeg",
            FileType::GraphicsInterchangeFormat => "image/gif",
            FileType::Bitmap => "image/bmp",
            FileType::ScalableVectorGraphics => "image/svg+xml",
            FileType::CompoundFileBinaryFormat => "application/x-cfb",
            FileType::Zip => "application/zip",
            FileType::Unknown => "application/octet-stream",
        }
    }

    /// Map an ODF `mimetype` member to a type.
    pub fn from_odf_mime_type(mime_type: &str) -> Option<FileType> {
        let mime_type = mime_type.trim();
        let subtype = mime_type.strip_prefix("application/vnd.oasis.opendocument.")?;
        match subtype.strip_suffix("-template").unwrap_or(subtype) {
            "text" | "text-master" | "text-web" => Some(FileType::OpenDocumentText),
            "presentation" => Some(FileType::OpenDocumentPresentation),
            "spreadsheet" => Some(FileType::OpenDocumentSpreadsheet),
            "graphics" => Some(FileType::OpenDocumentGraphics),
            _ => None,
        }
    }

    pub fn category(self) -> FileCategory {
        match self {
            FileType::Unknown => FileCategory::Unknown,
            FileType::CompoundFileBinaryFormat | FileType::Zip => FileCategory::Archive,
            FileType::StarviewMetafile
            | FileType::PortableNetworkGraphics
            | FileType::Jpeg
            | FileType::GraphicsInterchangeFormat
            | FileType::Bitmap
            | FileType::ScalableVectorGraphics => FileCategory::Image,
            _ => FileCategory::Document,
        }
    }

    pub fn document_type(self) -> Option<DocumentType> {
        match self {
            FileType::OpenDocumentText
            | FileType::OfficeOpenXmlDocument
            | FileType::LegacyWordDocument
            | FileType::PortableDocumentFormat => Some(DocumentType::Text),
            FileType::OpenDocumentPresentation
            | FileType::OfficeOpenXmlPresentation
            | FileType::LegacyPowerpointPresentation => Some(DocumentType::Presentation),
            FileType::OpenDocumentSpreadsheet
            | FileType::OfficeOpenXmlWorkbook
            | FileType::LegacyExcelWorksheets => Some(DocumentType::Spreadsheet),
            FileType::OpenDocumentGraphics => Some(DocumentType::Drawing),
            _ => None,
        }
    }

    pub fn is_open_document(self) -> bool {
        matches!(
            self,
            FileType::OpenDocumentText
                | FileType::OpenDocumentPresentation
                | FileType::OpenDocumentSpreadsheet
                | FileType::OpenDocumentGraphics
        )
    }

    pub fn is_office_open_xml(self) -> bool {
        matches!(
            self,
            FileType::OfficeOpenXmlDocument
                | FileType::OfficeOpenXmlPresentation
                | FileType::OfficeOpenXmlWorkbook
                | FileType::OfficeOpenXmlEncrypted
        )
    }
}

/// Decryption progress of a document.
///
/// Transitions only move forward: `Unknown` becomes `Decrypted` after a
/// successful [`decrypt`](crate::file::DocumentFile::decrypt), and nothing
/// ever returns to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionState {
    NotEncrypted,
    /// Encrypted, password not supplied or not yet accepted
    Unknown,
    Decrypted,
}

/// Per-entry metadata (sheet, slide, page or table).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub row_count: u32,
    pub column_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    pub document_type: DocumentType,
    /// Number of sheets, slides or pages; 0 for text documents
    pub entry_count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<EntryMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMeta {
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub password_encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_meta: Option<DocumentMeta>,
}

impl FileMeta {
    pub fn new(file_type: FileType) -> Self {
        Self {
            file_type,
            password_encrypted: false,
            document_meta: None,
        }
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize file meta to YAML: {}", e)))
    }
}
