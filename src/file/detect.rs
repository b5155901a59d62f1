//! File type detection.
//!
//! Detection looks at leading magic bytes first and only looks inside a
//! container when the magic is ambiguous (a compound file or a ZIP package
//! could hold several formats). A caller-supplied hint reorders equally
//! plausible candidates but never adds a type the bytes contradict.

use super::open_strategy::open_storage;
use super::types::FileType;
use crate::access::cfb::is_cfb_file;
use crate::access::zip::ZIP_MAGIC;
use crate::access::ReadStorage;
use crate::common::Path;
use bytes::Bytes;
use memchr::memmem;

const PDF_MAGIC: &[u8] = b"%PDF-";
const SVM_MAGIC: &[u8] = b"VCLMTF";
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF";
const GIF_MAGIC: &[u8] = b"GIF8";
const BMP_MAGIC: &[u8] = b"BM";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How far into a bare XML file to look for markers.
const XML_SNIFF_LIMIT: usize = 64 * 1024;

/// Candidate types for `data`, most specific first.
///
/// An empty result means the bytes match nothing the library can open.
/// Compound files and ZIP packages are opened to look at their members;
/// callers holding an opened backend use [`classify_opened`] instead.
pub fn classify(data: &[u8], hint: Option<FileType>) -> Vec<FileType> {
    if is_cfb_file(data) || data.starts_with(ZIP_MAGIC) {
        return match open_storage(Bytes::copy_from_slice(data)) {
            Ok((_, storage)) => classify_opened(data, Some(storage.as_ref()), hint),
            Err(e) => {
                log::debug!("container magic present but unreadable: {}", e);
                classify_opened(data, None, hint)
            },
        };
    }
    classify_opened(data, None, hint)
}

/// Candidate types for `data` whose container was already opened as
/// `storage`. Without a storage, compound files and ZIP packages only match
/// their container type.
pub fn classify_opened(data: &[u8], storage: Option<&dyn ReadStorage>, hint: Option<FileType>) -> Vec<FileType> {
    let mut candidates = if is_cfb_file(data) {
        classify_cfb(storage)
    } else if data.starts_with(ZIP_MAGIC) {
        classify_zip(storage)
    } else if data.starts_with(PDF_MAGIC) {
        vec![FileType::PortableDocumentFormat]
    } else if data.starts_with(SVM_MAGIC) {
        vec![FileType::StarviewMetafile]
    } else if data.starts_with(PNG_MAGIC) {
        vec![FileType::PortableNetworkGraphics]
    } else if data.starts_with(JPEG_MAGIC) {
        vec![FileType::Jpeg]
    } else if data.starts_with(GIF_MAGIC) {
        vec![FileType::GraphicsInterchangeFormat]
    } else if data.starts_with(BMP_MAGIC) && data.len() >= 14 {
        vec![FileType::Bitmap]
    } else {
        classify_xml(data)
    };

    if let Some(hint) = hint
        && let Some(position) = candidates.iter().position(|&c| c == hint)
    {
        let hinted = candidates.remove(position);
        candidates.insert(0, hinted);
    }
    candidates
}

/// Best single guess, `Unknown` if nothing matched.
pub fn detect(data: &[u8], hint: Option<FileType>) -> FileType {
    classify(data, hint).first().copied().unwrap_or(FileType::Unknown)
}

fn classify_cfb(storage: Option<&dyn ReadStorage>) -> Vec<FileType> {
    let mut candidates = Vec::new();
    if let Some(cfb) = storage {
        let has = |name: &str| cfb.is_file(&Path::new(name));
        if has("EncryptionInfo") && has("EncryptedPackage") {
            candidates.push(FileType::OfficeOpenXmlEncrypted);
        }
        if has("WordDocument") {
            candidates.push(FileType::LegacyWordDocument);
        }
        if has("PowerPoint Document") {
            candidates.push(FileType::LegacyPowerpointPresentation);
        }
        if has("Workbook") || has("Book") {
            candidates.push(FileType::LegacyExcelWorksheets);
        }
    }
    candidates.push(FileType::CompoundFileBinaryFormat);
    candidates
}

fn classify_zip(storage: Option<&dyn ReadStorage>) -> Vec<FileType> {
    let mut candidates = Vec::new();
    if let Some(file_type) = storage.and_then(classify_package) {
        candidates.push(file_type);
    }
    candidates.push(FileType::Zip);
    candidates
}

/// Identify an opened package by its defining members.
pub(crate) fn classify_package(storage: &dyn ReadStorage) -> Option<FileType> {
    let mimetype = Path::new("mimetype");
    if storage.is_file(&mimetype)
        && let Ok(content) = storage.read_to_vec(&mimetype)
        && let Some(file_type) = FileType::from_odf_mime_type(&String::from_utf8_lossy(&content))
    {
        return Some(file_type);
    }

    if storage.is_file(&Path::new("[Content_Types].xml")) {
        if storage.is_file(&Path::new("word/document.xml")) {
            return Some(FileType::OfficeOpenXmlDocument);
        }
        if storage.is_file(&Path::new("ppt/presentation.xml")) {
            return Some(FileType::OfficeOpenXmlPresentation);
        }
        if storage.is_file(&Path::new("xl/workbook.xml")) {
            return Some(FileType::OfficeOpenXmlWorkbook);
        }
    }

    // ODF packages without a mimetype member: look at the body element.
    let content = Path::new("content.xml");
    if storage.is_file(&content)
        && let Ok(xml) = storage.read_to_vec(&content)
    {
        return odf_type_from_body(&xml);
    }
    None
}

fn odf_type_from_body(xml: &[u8]) -> Option<FileType> {
    let window = &xml[..xml.len().min(XML_SNIFF_LIMIT * 4)];
    [
        (&b"<office:text"[..], FileType::OpenDocumentText),
        (&b"<office:spreadsheet"[..], FileType::OpenDocumentSpreadsheet),
        (&b"<office:presentation"[..], FileType::OpenDocumentPresentation),
        (&b"<office:drawing"[..], FileType::OpenDocumentGraphics),
    ]
    .into_iter()
    .filter_map(|(marker, file_type)| memmem::find(window, marker).map(|pos| (pos, file_type)))
    .min_by_key(|(pos, _)| *pos)
    .map(|(_, file_type)| file_type)
}

fn classify_xml(data: &[u8]) -> Vec<FileType> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    if data.get(start) != Some(&b'<') {
        return Vec::new();
    }
    let window = &data[start..data.len().min(start + XML_SNIFF_LIMIT)];

    // Flat ODF declares its type on the root element.
    if let Some(pos) = memmem::find(window, b"office:mimetype=\"") {
        let value = &window[pos + b"office:mimetype=\"".len()..];
        if let Some(end) = memchr::memchr(b'"', value)
            && let Some(file_type) = FileType::from_odf_mime_type(&String::from_utf8_lossy(&value[..end]))
        {
            return vec![file_type];
        }
    }
    if memmem::find(window, b"<svg").is_some() {
        return vec![FileType::ScalableVectorGraphics];
    }
    Vec::new()
}
