/// HTML rendering of decoded files.
///
/// Parsed documents (OpenDocument and Office Open XML) are translated by a
/// name-dispatched [`Translator`] walking the document cursor; legacy Word
/// documents and PDFs go through external converters.
///
/// # Quick Start
///
/// ```rust,no_run
/// use odr::file::DecodedFile;
/// use odr::html::{HtmlConfig, convert};
///
/// # fn main() -> Result<(), odr::Error> {
/// let mut file = DecodedFile::open("report.odt")?;
/// let config = HtmlConfig::new().with_table_limit(100, 20);
/// let html = convert(&mut file, "out", &config, None)?;
/// for page in &html.pages {
///     println!("{}: {}", page.name, page.path.display());
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Architecture
///
/// - [`config`]: conversion options
/// - [`translator`]: handler registry and tree walk
/// - [`context`]: output buffer, table window and edit journal of one run
/// - [`odf`] / [`ooxml`]: format front-ends
/// - [`style`]: OpenDocument styles as CSS classes
/// - [`legacy`]: subprocess converters
pub mod config;
pub mod context;
pub mod image;
pub mod legacy;
pub mod odf;
pub mod ooxml;
pub mod style;
pub mod template;
pub mod translator;

pub use config::{HtmlConfig, LegacyConfig};
pub use context::{HtmlAttributes, TableLocation, TableState, TranslationContext};
pub use legacy::{LegacyConverter, PdfConverter};
pub use style::StyleRegistry;
pub use translator::{AttributeHandler, ElementHandler, Translator};

use crate::common::{Error, Result};
use crate::document::{Document, EditJournal};
use crate::file::{DecodedFile, DocumentFile, DocumentType, EncryptionState, FileType, ImageFile};
use std::fs;
use std::path::{Path, PathBuf};

/// Translated document content.
#[derive(Debug)]
pub struct HtmlOutput {
    pub document_type: DocumentType,
    /// Whether text was emitted as editable, journaled spans
    pub editable: bool,
    pub body: String,
    pub css: String,
    pub journal: EditJournal,
}

impl HtmlOutput {
    /// Complete HTML page, with the edit script when editable.
    pub fn to_page(&self) -> String {
        let script = self.editable.then_some(template::EDIT_SCRIPT);
        template::page(&self.css, &self.body, script)
    }
}

/// One written HTML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlPage {
    pub name: String,
    pub path: PathBuf,
}

/// Result of [`convert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Html {
    pub file_type: FileType,
    pub pages: Vec<HtmlPage>,
}

/// Translate a parsed document.
///
/// Fails with [`Error::PasswordRequired`] while the document is locked and
/// with [`Error::Unsupported`] for formats without a parsed model.
pub fn translate(file: &DocumentFile, config: &HtmlConfig) -> Result<HtmlOutput> {
    let document = file.document()?;
    let document_type = document.document_type();
    let (styles, translator) = match document {
        Document::Odf(doc) => (StyleRegistry::from_odf(doc), &*odf::TRANSLATOR),
        Document::Ooxml(_) => (StyleRegistry::default(), ooxml::translator(document_type)),
    };
    log::debug!("translating {:?} with {} styles", file.file_type(), styles.len());

    let mut ctx = TranslationContext::new(config, document, &**file.storage(), &styles);
    translator.translate(document.root(), &mut ctx);
    let editable = ctx.editable();
    let (body, journal) = ctx.finish();

    let mut css = String::from(template::DEFAULT_CSS);
    if document_type == DocumentType::Spreadsheet {
        css.push_str(template::SPREADSHEET_CSS);
    }
    css.push_str(&styles.css());

    Ok(HtmlOutput {
        document_type,
        editable,
        body,
        css,
        journal,
    })
}

/// Convert a decoded file into HTML files under `out_dir`.
///
/// `password` unlocks encrypted packages or is handed to the external
/// converter. The file is decrypted in place, so a successful password stays
/// applied for later calls.
pub fn convert(
    file: &mut DecodedFile,
    out_dir: impl AsRef<Path>,
    config: &HtmlConfig,
    password: Option<&str>,
) -> Result<Html> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).map_err(|e| Error::FileNotCreated(format!("{}: {}", out_dir.display(), e)))?;

    let pages = match file {
        DecodedFile::Unknown(_) => return Err(Error::UnknownFileType),
        DecodedFile::Image(image) => {
            let body = image_body(image)?;
            let path = write_page(out_dir, &config.output_file_name, &template::page(template::DEFAULT_CSS, &body, None))?;
            vec![page_entry(&config.output_file_name, path)]
        },
        DecodedFile::Document(document) => convert_document(document, out_dir, config, password)?,
    };

    Ok(Html {
        file_type: file.file_type(),
        pages,
    })
}

fn convert_document(
    file: &mut DocumentFile,
    out_dir: &Path,
    config: &HtmlConfig,
    password: Option<&str>,
) -> Result<Vec<HtmlPage>> {
    match file.file_type() {
        FileType::LegacyWordDocument => {
            let input = on_disk(file)?;
            let path = LegacyConverter::from_config(&config.legacy).convert(
                input,
                out_dir,
                &config.output_file_name,
                password,
            )?;
            return Ok(vec![page_entry(&config.output_file_name, path)]);
        },
        FileType::PortableDocumentFormat => {
            let input = on_disk(file)?;
            return PdfConverter::from_config(&config.legacy).convert(input, out_dir, &config.output_file_name, password);
        },
        FileType::LegacyPowerpointPresentation | FileType::LegacyExcelWorksheets => {
            return Err(Error::Unsupported(format!("HTML conversion of {:?}", file.file_type())));
        },
        _ => {},
    }

    if file.encryption_state() == EncryptionState::Unknown {
        let Some(password) = password else {
            return Err(Error::PasswordRequired);
        };
        if !file.decrypt(password)? {
            return Err(Error::WrongPassword);
        }
    }

    let output = translate(file, config)?;
    let path = write_page(out_dir, &config.output_file_name, &output.to_page())?;
    Ok(vec![page_entry(&config.output_file_name, path)])
}

fn on_disk(file: &DocumentFile) -> Result<&Path> {
    file.disk_path()
        .ok_or_else(|| Error::Unsupported(format!("converting {:?} without a file on disk", file.file_type())))
}

/// Page body for a standalone image: vector images inline, raster images as
/// a data URI.
fn image_body(image: &ImageFile) -> Result<String> {
    match image.file_type() {
        FileType::StarviewMetafile | FileType::ScalableVectorGraphics => {
            Ok(String::from_utf8_lossy(&image.svg()?).into_owned())
        },
        other => {
            let uri = self::image::data_uri(other.mime_type(), &image.bytes()?);
            let mut body = String::with_capacity(uri.len() + 16);
            write_image_tag(&mut body, &uri);
            Ok(body)
        },
    }
}

fn write_image_tag(out: &mut String, src: &str) {
    out.push_str("<img");
    HtmlAttributes::new().with("src", src).write_to(out);
    out.push('>');
}

fn write_page(out_dir: &Path, file_name: &str, html: &str) -> Result<PathBuf> {
    let path = out_dir.join(file_name);
    fs::write(&path, html).map_err(|e| Error::FileNotCreated(format!("{}: {}", path.display(), e)))?;
    Ok(path)
}

fn page_entry(file_name: &str, path: PathBuf) -> HtmlPage {
    let name = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string();
    HtmlPage { name, path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::zip::fixture::zip_bytes;
    use crate::document::odf::fixture::content_xml;
    use crate::document::ooxml::fixture::xlsx;
    use crate::images::svm::parser::fixture::{SvmWriter, ints};

    fn odt(body: &str) -> Vec<u8> {
        let content = content_xml("office:text", body);
        zip_bytes(&[
            ("mimetype", b"application/vnd.oasis.opendocument.text"),
            ("content.xml", content.as_bytes()),
        ])
    }

    #[test]
    fn test_translate_page() {
        let file = DecodedFile::open_bytes(odt("<text:p>a &amp; b</text:p>"), None).unwrap();
        let output = translate(file.document_file().unwrap(), &HtmlConfig::default()).unwrap();
        assert_eq!(output.document_type, DocumentType::Text);
        assert!(!output.editable);
        assert_eq!(output.body, "<p>a &amp; b</p>");

        let page = output.to_page();
        assert!(page.starts_with(template::HTML_BEGIN));
        assert!(page.contains(template::DEFAULT_CSS));
        assert!(!page.contains(template::SPREADSHEET_CSS));
        assert!(page.contains("<body>\n<p>a &amp; b</p>\n</body>"));
        assert!(!page.contains("<script>"));

        let editable = translate(file.document_file().unwrap(), &HtmlConfig::new().with_editable(true)).unwrap();
        assert!(editable.editable);
        assert!(editable.to_page().contains("generateDiff"));
    }

    #[test]
    fn test_translate_spreadsheet_css() {
        let file = DecodedFile::open_bytes(xlsx(&[("S", r#"<row r="1"><c r="A1"><v>1</v></c></row>"#)], &[]), None)
            .unwrap();
        let output = translate(file.document_file().unwrap(), &HtmlConfig::default()).unwrap();
        assert_eq!(output.document_type, DocumentType::Spreadsheet);
        assert!(!output.editable);
        assert!(output.css.contains(template::SPREADSHEET_CSS));
    }

    #[test]
    fn test_convert_document() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let mut file = DecodedFile::open_bytes(odt("<text:p>hello</text:p>"), None).unwrap();
        let html = convert(&mut file, &out, &HtmlConfig::default(), None).unwrap();
        assert_eq!(html.file_type, FileType::OpenDocumentText);
        assert_eq!(
            html.pages,
            vec![HtmlPage {
                name: "document".to_string(),
                path: out.join("document.html"),
            }]
        );
        let written = fs::read_to_string(&html.pages[0].path).unwrap();
        assert!(written.contains("<p>hello</p>"));

        let config = HtmlConfig::new().with_output_file_name("index.html");
        let html = convert(&mut file, &out, &config, None).unwrap();
        assert_eq!(html.pages[0].name, "index");
        assert!(out.join("index.html").is_file());
    }

    #[test]
    fn test_convert_image() {
        let dir = tempfile::tempdir().unwrap();
        let svm = SvmWriter::new(10, 10).action(103, ints(&[0, 0, 10, 10])).build();
        let mut file = DecodedFile::open_bytes(svm, None).unwrap();
        let html = convert(&mut file, dir.path(), &HtmlConfig::default(), None).unwrap();
        assert_eq!(html.file_type, FileType::StarviewMetafile);
        assert!(fs::read_to_string(&html.pages[0].path).unwrap().contains("<svg"));

        let mut file = DecodedFile::open_bytes(b"\x89PNG\r\n\x1a\nrest".to_vec(), None).unwrap();
        let html = convert(&mut file, dir.path(), &HtmlConfig::default(), None).unwrap();
        let written = fs::read_to_string(&html.pages[0].path).unwrap();
        assert!(written.contains(r#"<img src="data:image/png;base64,"#));
    }

    #[test]
    fn test_convert_pdf_needs_disk_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = DecodedFile::open_bytes(b"%PDF-1.4\n%%EOF\n".to_vec(), None).unwrap();
        assert_eq!(file.file_type(), FileType::PortableDocumentFormat);
        assert!(matches!(
            convert(&mut file, dir.path(), &HtmlConfig::default(), None),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_convert_output_dir_not_creatable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let mut file = DecodedFile::open_bytes(odt("<text:p>x</text:p>"), None).unwrap();
        assert!(matches!(
            convert(&mut file, blocker.join("out"), &HtmlConfig::default(), None),
            Err(Error::FileNotCreated(_))
        ));
    }

    #[cfg(feature = "crypto")]
    #[test]
    fn test_convert_encrypted_package() {
        use crate::access::cfb::fixture::CfbBuilder;
        use crate::document::ooxml::fixture::docx;
        use crate::file::crypto::standard2007::encrypt_package;

        let package = docx("<w:p><w:r><w:t>Secret</w:t></w:r></w:p>");
        let (info, encrypted) = encrypt_package(&package, "pw", &[1u8; 16], &[2u8; 16]).unwrap();
        let cfb = CfbBuilder::new()
            .stream("EncryptionInfo", info)
            .stream("EncryptedPackage", encrypted)
            .build();
        let dir = tempfile::tempdir().unwrap();
        let mut file = DecodedFile::open_bytes(cfb, None).unwrap();
        let config = HtmlConfig::default();

        assert!(matches!(convert(&mut file, dir.path(), &config, None), Err(Error::PasswordRequired)));
        assert!(matches!(convert(&mut file, dir.path(), &config, Some("nope")), Err(Error::WrongPassword)));

        let html = convert(&mut file, dir.path(), &config, Some("pw")).unwrap();
        assert_eq!(html.file_type, FileType::OfficeOpenXmlDocument);
        assert!(fs::read_to_string(&html.pages[0].path).unwrap().contains("Secret"));
    }

    #[cfg(feature = "crypto")]
    #[test]
    fn test_convert_encrypted_odf() {
        use crate::file::crypto::odf::fixture::encrypted_odt;

        let dir = tempfile::tempdir().unwrap();
        let mut file = DecodedFile::open_bytes(encrypted_odt("<text:p>Secret</text:p>", "pw"), None).unwrap();
        let config = HtmlConfig::default();

        assert!(matches!(convert(&mut file, dir.path(), &config, None), Err(Error::PasswordRequired)));
        assert!(matches!(convert(&mut file, dir.path(), &config, Some("nope")), Err(Error::WrongPassword)));

        let html = convert(&mut file, dir.path(), &config, Some("pw")).unwrap();
        assert_eq!(html.file_type, FileType::OpenDocumentText);
        assert!(fs::read_to_string(&html.pages[0].path).unwrap().contains("Secret"));
    }

    #[test]
    fn test_convert_agile_package_is_unsupported() {
        use crate::access::cfb::fixture::CfbBuilder;

        let mut info = vec![4u8, 0, 4, 0, 0x40, 0, 0, 0];
        info.extend_from_slice(b"<encryption/>");
        let cfb = CfbBuilder::new()
            .stream("EncryptionInfo", info)
            .stream("EncryptedPackage", vec![0u8; 64])
            .build();
        let dir = tempfile::tempdir().unwrap();
        let mut file = DecodedFile::open_bytes(cfb, None).unwrap();
        assert_eq!(file.file_type(), FileType::OfficeOpenXmlEncrypted);

        assert!(matches!(
            convert(&mut file, dir.path(), &HtmlConfig::default(), Some("pw")),
            Err(Error::Unsupported(_))
        ));
        assert!(file.file_meta().password_encrypted);
    }
}
