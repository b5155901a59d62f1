//! Typed views of opened files.
//!
//! [`DecodedFile::open`] classifies a file, builds its storage backend and
//! wraps it as a document, an image or an unknown container. Documents parse
//! lazily: the XML tree is only built on the first call to
//! [`DocumentFile::document`].

use super::crypto;
use super::detect::{classify, classify_opened, classify_package};
use super::open_strategy::{Backend, RAW_FILE_NAME, SharedStorage, initial_encryption_state, open_storage};
use super::types::{DocumentMeta, DocumentType, EncryptionState, FileCategory, FileMeta, FileType};
use crate::access::zip::write_archive;
use crate::access::{ReadStorage, ZipStorage};
use crate::common::{Error, Path, Result};
use crate::document::{Document, EditJournal, OdfDocument};
use crate::images::svm::convert_svm_to_svg;
use bytes::Bytes;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

const ENCRYPTION_INFO: &str = "EncryptionInfo";
const ENCRYPTED_PACKAGE: &str = "EncryptedPackage";

/// A classified file.
#[derive(Debug)]
pub enum DecodedFile {
    Unknown(UnknownFile),
    Image(ImageFile),
    Document(DocumentFile),
}

impl DecodedFile {
    /// Open a file on disk as its most plausible type.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = read_file(&path)?;
        let hint = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(FileType::from_file_name)
            .filter(|&t| t != FileType::Unknown);
        Self::open_candidates(Bytes::from(data), hint, Some(path))
    }

    /// Open in-memory bytes, with an optional declared type.
    pub fn open_bytes(data: impl Into<Bytes>, hint: Option<FileType>) -> Result<Self> {
        Self::open_candidates(data.into(), hint, None)
    }

    /// Open a file on disk as exactly `file_type`.
    pub fn open_as(path: impl AsRef<std::path::Path>, file_type: FileType) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = read_file(&path)?;
        Self::build(Bytes::from(data), file_type, Some(path))
    }

    /// Candidate types for `data`, most plausible first.
    pub fn types(data: &[u8], hint: Option<FileType>) -> Vec<FileType> {
        classify(data, hint)
    }

    /// The container is opened once; classification looks at the opened
    /// backend and the file wraps that same backend.
    fn open_candidates(data: Bytes, hint: Option<FileType>, disk_path: Option<PathBuf>) -> Result<Self> {
        let (backend, storage) = open_storage(data.clone()).map_err(|e| {
            log::debug!("no storage backend: {}", e);
            Error::UnknownFileType
        })?;
        let file_type = classify_opened(&data, Some(storage.as_ref()), hint)
            .first()
            .copied()
            .ok_or(Error::UnknownFileType)?;
        Ok(Self::wrap(file_type, backend, storage, disk_path))
    }

    fn build(data: Bytes, file_type: FileType, disk_path: Option<PathBuf>) -> Result<Self> {
        let (backend, storage) = open_storage(data)?;
        Ok(Self::wrap(file_type, backend, storage, disk_path))
    }

    fn wrap(file_type: FileType, backend: Backend, storage: SharedStorage, disk_path: Option<PathBuf>) -> Self {
        match file_type.category() {
            FileCategory::Document => DecodedFile::Document(DocumentFile::new(file_type, backend, storage, disk_path)),
            FileCategory::Image => DecodedFile::Image(ImageFile {
                file_type,
                storage,
                disk_path,
            }),
            FileCategory::Archive | FileCategory::Unknown => DecodedFile::Unknown(UnknownFile {
                file_type,
                storage,
                disk_path,
            }),
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            DecodedFile::Unknown(f) => f.file_type,
            DecodedFile::Image(f) => f.file_type,
            DecodedFile::Document(f) => f.file_type,
        }
    }

    pub fn file_category(&self) -> FileCategory {
        self.file_type().category()
    }

    pub fn file_meta(&self) -> FileMeta {
        match self {
            DecodedFile::Document(f) => f.file_meta(),
            other => FileMeta::new(other.file_type()),
        }
    }

    pub fn storage(&self) -> &SharedStorage {
        match self {
            DecodedFile::Unknown(f) => &f.storage,
            DecodedFile::Image(f) => &f.storage,
            DecodedFile::Document(f) => &f.storage,
        }
    }

    /// Where the file was read from, if it came from disk.
    pub fn disk_path(&self) -> Option<&std::path::Path> {
        match self {
            DecodedFile::Unknown(f) => f.disk_path.as_deref(),
            DecodedFile::Image(f) => f.disk_path.as_deref(),
            DecodedFile::Document(f) => f.disk_path.as_deref(),
        }
    }

    pub fn document_file(&self) -> Result<&DocumentFile> {
        match self {
            DecodedFile::Document(f) => Ok(f),
            _ => Err(Error::NoDocumentFile),
        }
    }

    pub fn document_file_mut(&mut self) -> Result<&mut DocumentFile> {
        match self {
            DecodedFile::Document(f) => Ok(f),
            _ => Err(Error::NoDocumentFile),
        }
    }

    pub fn into_document_file(self) -> Result<DocumentFile> {
        match self {
            DecodedFile::Document(f) => Ok(f),
            _ => Err(Error::NoDocumentFile),
        }
    }

    pub fn image_file(&self) -> Result<&ImageFile> {
        match self {
            DecodedFile::Image(f) => Ok(f),
            _ => Err(Error::NoImageFile),
        }
    }
}

fn read_file(path: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound(path.display().to_string()),
        _ => Error::Io(e),
    })
}

/// A container without a document or image inside that the library knows.
pub struct UnknownFile {
    file_type: FileType,
    storage: SharedStorage,
    disk_path: Option<PathBuf>,
}

impl UnknownFile {
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }
}

pub struct ImageFile {
    file_type: FileType,
    storage: SharedStorage,
    disk_path: Option<PathBuf>,
}

impl ImageFile {
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// The image as stored.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        self.storage.read_to_vec(&Path::new(RAW_FILE_NAME))
    }

    /// SVG rendition of a vector image.
    pub fn svg(&self) -> Result<Vec<u8>> {
        match self.file_type {
            FileType::StarviewMetafile => convert_svm_to_svg(&self.bytes()?),
            FileType::ScalableVectorGraphics => self.bytes(),
            other => Err(Error::Unsupported(format!("SVG rendition of {:?}", other))),
        }
    }
}

impl std::fmt::Debug for UnknownFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnknownFile")
            .field("file_type", &self.file_type)
            .field("disk_path", &self.disk_path)
            .finish()
    }
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_type", &self.file_type)
            .field("disk_path", &self.disk_path)
            .finish()
    }
}

/// Browser edits: `{"modifiedText": {"<id>": "<text>"}}`.
#[derive(Debug, Deserialize)]
struct EditDiff {
    #[serde(rename = "modifiedText", default)]
    modified_text: HashMap<String, String>,
}

pub struct DocumentFile {
    file_type: FileType,
    backend: Backend,
    storage: SharedStorage,
    disk_path: Option<PathBuf>,
    encryption_state: EncryptionState,
    document: OnceCell<Document>,
}

impl std::fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentFile")
            .field("file_type", &self.file_type)
            .field("backend", &self.backend)
            .field("encryption_state", &self.encryption_state)
            .field("parsed", &self.document.get().is_some())
            .finish()
    }
}

impl DocumentFile {
    fn new(file_type: FileType, backend: Backend, storage: SharedStorage, disk_path: Option<PathBuf>) -> Self {
        let encryption_state = initial_encryption_state(file_type, backend, storage.as_ref());
        Self {
            file_type,
            backend,
            storage,
            disk_path,
            encryption_state,
            document: OnceCell::new(),
        }
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    pub fn disk_path(&self) -> Option<&std::path::Path> {
        self.disk_path.as_deref()
    }

    pub fn document_type(&self) -> DocumentType {
        self.file_type.document_type().unwrap_or(DocumentType::Text)
    }

    pub fn password_encrypted(&self) -> bool {
        self.encryption_state != EncryptionState::NotEncrypted
    }

    pub fn encryption_state(&self) -> EncryptionState {
        self.encryption_state
    }

    /// Whether translated output may be edited and saved back.
    pub fn editable(&self) -> bool {
        self.file_type.is_open_document() && self.encryption_state != EncryptionState::Unknown
    }

    /// Whether the document is a single flat XML file.
    pub fn is_flat(&self) -> bool {
        self.backend == Backend::Raw
    }

    /// Sheet, slide or page metadata; `None` while locked or for formats
    /// without a parsed model.
    pub fn document_meta(&self) -> Option<DocumentMeta> {
        match self.document() {
            Ok(document) => Some(document.document_meta()),
            Err(Error::PasswordRequired) | Err(Error::Unsupported(_)) => None,
            Err(e) => {
                log::warn!("no document metadata for {:?}: {}", self.file_type, e);
                None
            },
        }
    }

    pub fn file_meta(&self) -> FileMeta {
        FileMeta {
            file_type: self.file_type,
            password_encrypted: self.password_encrypted(),
            document_meta: self.document_meta(),
        }
    }

    /// The parsed document, built on first access.
    pub fn document(&self) -> Result<&Document> {
        self.document.get_or_try_init(|| self.load_document())
    }

    fn load_document(&self) -> Result<Document> {
        if self.encryption_state == EncryptionState::Unknown {
            return Err(Error::PasswordRequired);
        }
        if self.is_flat() && self.file_type.is_open_document() {
            let data = self.storage.read_to_vec(&Path::new(RAW_FILE_NAME))?;
            return Ok(Document::Odf(OdfDocument::from_flat_xml(&data, self.file_type)?));
        }
        Document::open(self.storage.as_ref(), self.file_type)
    }

    /// Try a password.
    ///
    /// Only valid while the document is locked. Returns `false` and keeps
    /// the document locked when the password is wrong; on success the
    /// storage serves the plaintext package from then on. Encryption schemes
    /// that cannot be decrypted fail with [`Error::Unsupported`], also
    /// leaving the document locked. Passwords of legacy Word files are
    /// handed to the external converter instead.
    pub fn decrypt(&mut self, password: &str) -> Result<bool> {
        if self.encryption_state != EncryptionState::Unknown {
            return Err(Error::Unsupported(format!(
                "decrypting a document in state {:?}",
                self.encryption_state
            )));
        }

        let plaintext = if self.file_type == FileType::OfficeOpenXmlEncrypted {
            let info = self.storage.read_to_vec(&Path::new(ENCRYPTION_INFO))?;
            let package = self.storage.read_to_vec(&Path::new(ENCRYPTED_PACKAGE))?;
            crypto::decrypt_package(&info, &package, password)?
        } else if self.file_type.is_open_document() && self.backend == Backend::Zip {
            crypto::decrypt_odf_package(self.storage.as_ref(), password)?
        } else {
            return Err(Error::Unsupported(format!("decrypting {:?}", self.file_type)));
        };
        let Some(plaintext) = plaintext else {
            return Ok(false);
        };

        let zip = ZipStorage::open(plaintext)?;
        let inner_type = classify_package(&zip).ok_or_else(|| {
            Error::ConversionFailure("decrypted package is not an office document".to_string())
        })?;
        self.storage = Arc::new(zip);
        self.backend = Backend::Zip;
        self.file_type = inner_type;
        self.encryption_state = EncryptionState::Decrypted;
        self.document = OnceCell::new();
        Ok(true)
    }

    /// Apply edits reported by the browser. Returns the number of text nodes
    /// changed; ids missing from `journal` are skipped.
    pub fn apply_edits(&mut self, journal: &EditJournal, diff: &str) -> Result<usize> {
        let diff: EditDiff = serde_json::from_str(diff)?;
        self.document()?;
        let Some(document) = self.document.get_mut() else {
            return Err(Error::ConversionFailure("document not loaded".to_string()));
        };

        let mut changed = 0;
        for (id, text) in &diff.modified_text {
            let Some(node) = id.parse().ok().and_then(|id| journal.get(id)) else {
                log::warn!("edit for unknown text id {}", id);
                continue;
            };
            if document.set_text(node, text)? {
                changed += 1;
            } else {
                log::warn!("edit id {} does not reference a text node", id);
            }
        }
        Ok(changed)
    }

    /// Write the (possibly edited) document to `path`.
    ///
    /// Packages are rewritten with the new `content.xml` and every other
    /// member copied; flat files are written as XML.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let path = path.as_ref();
        let Document::Odf(odf) = self.document()? else {
            return Err(Error::Unsupported(format!("saving {:?}", self.file_type)));
        };
        let xml = odf.content().to_xml();
        let file = File::create(path).map_err(|e| Error::FileNotCreated(format!("{}: {}", path.display(), e)))?;

        if odf.is_flat() {
            use std::io::Write;
            let mut writer = BufWriter::new(file);
            writer.write_all(xml.as_bytes())?;
            writer.flush()?;
            return Ok(());
        }

        let mut replacements = HashMap::new();
        replacements.insert(Path::new(crate::document::odf::CONTENT_XML), xml.into_bytes());
        write_archive(self.storage.as_ref(), &replacements, file)?;
        Ok(())
    }
}
