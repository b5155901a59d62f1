//! OpenDocument content model.
//!
//! Packaged documents keep their body in `content.xml` and shared styles in
//! `styles.xml`; flat documents (`.fodt`, `.fods`, ...) hold everything in
//! one XML file. Either way the content tree is part 0 and the translator
//! starts at its root.

use super::cursor::{DocumentTree, NodeRef};
use crate::access::ReadStorage;
use crate::common::xml::{Attribute, NodeId, XmlDocument};
use crate::common::{Error, Path, Result};
use crate::file::{DocumentMeta, DocumentType, EntryMeta, FileType};

pub const CONTENT_XML: &str = "content.xml";
pub const STYLES_XML: &str = "styles.xml";

const TABLE: &str = "table:table";
const TABLE_ROW: &str = "table:table-row";
const TABLE_CELL: &str = "table:table-cell";
const COVERED_TABLE_CELL: &str = "table:covered-table-cell";
const ROW_CONTAINERS: [&str; 3] = [
    "table:table-header-rows",
    "table:table-rows",
    "table:table-row-group",
];

#[derive(Debug, Clone)]
pub struct OdfDocument {
    file_type: FileType,
    content: XmlDocument,
    styles: Option<XmlDocument>,
    flat: bool,
}

impl OdfDocument {
    /// Parse a packaged document from its storage.
    pub fn open(storage: &dyn ReadStorage, file_type: FileType) -> Result<Self> {
        let content_path = Path::new(CONTENT_XML);
        if !storage.is_file(&content_path) {
            return Err(Error::FileNotFound(CONTENT_XML.to_string()));
        }
        let content = XmlDocument::parse(&storage.read_to_vec(&content_path)?)?;

        let styles_path = Path::new(STYLES_XML);
        let styles = if storage.is_file(&styles_path) {
            Some(XmlDocument::parse(&storage.read_to_vec(&styles_path)?)?)
        } else {
            log::debug!("ODF package without {}", STYLES_XML);
            None
        };

        Ok(Self {
            file_type,
            content,
            styles,
            flat: false,
        })
    }

    /// Parse a flat XML document.
    pub fn from_flat_xml(data: &[u8], file_type: FileType) -> Result<Self> {
        Ok(Self {
            file_type,
            content: XmlDocument::parse(data)?,
            styles: None,
            flat: true,
        })
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn document_type(&self) -> DocumentType {
        self.file_type.document_type().unwrap_or(DocumentType::Text)
    }

    pub fn is_flat(&self) -> bool {
        self.flat
    }

    /// The content tree (the whole document for flat files).
    pub fn content(&self) -> &XmlDocument {
        &self.content
    }

    /// `styles.xml` of a package; `None` for flat files.
    pub fn styles(&self) -> Option<&XmlDocument> {
        self.styles.as_ref()
    }

    /// The typed body element (`office:text`, `office:spreadsheet`, ...).
    pub fn body(&self) -> Option<NodeId> {
        let body = self.content.child(self.content.root(), "office:body")?;
        self.content.children(body).find(|&n| self.content.is_element(n))
    }

    /// Sheets of a spreadsheet or pages of a presentation/drawing, in
    /// document order. Text documents have no entries.
    pub fn entries(&self) -> Vec<NodeId> {
        let entry_name = match self.document_type() {
            DocumentType::Spreadsheet => TABLE,
            DocumentType::Presentation | DocumentType::Drawing => "draw:page",
            DocumentType::Text => return Vec::new(),
        };
        let Some(body) = self.body() else {
            return Vec::new();
        };
        self.content
            .children(body)
            .filter(|&n| self.content.name(n) == Some(entry_name))
            .collect()
    }

    /// Rows and columns of a table that hold content.
    ///
    /// Repeated rows and cells count with their repetition, trailing empty
    /// rows and cells (typically a run repeated to the sheet's end) do not.
    pub fn table_dimensions(&self, table: NodeId) -> (u32, u32) {
        let mut dims = TableDimensions::default();
        self.measure_rows(table, &mut dims);
        (dims.rows, dims.columns)
    }

    fn measure_rows(&self, parent: NodeId, dims: &mut TableDimensions) {
        let doc = &self.content;
        for node in doc.children(parent) {
            match doc.name(node) {
                Some(TABLE_ROW) => {
                    let repeated = count_attribute(doc, node, "table:number-rows-repeated");
                    let columns = self.row_extent(node);
                    if columns > 0 {
                        dims.rows = dims.next_row.saturating_add(repeated);
                        dims.columns = dims.columns.max(columns);
                    }
                    dims.next_row = dims.next_row.saturating_add(repeated);
                },
                Some(name) if ROW_CONTAINERS.contains(&name) => self.measure_rows(node, dims),
                _ => {},
            }
        }
    }

    /// Column just past the last non-empty cell of a row.
    fn row_extent(&self, row: NodeId) -> u32 {
        let doc = &self.content;
        let mut column = 0u32;
        let mut extent = 0u32;
        for cell in doc.children(row) {
            if !matches!(doc.name(cell), Some(TABLE_CELL) | Some(COVERED_TABLE_CELL)) {
                continue;
            }
            let repeated = count_attribute(doc, cell, "table:number-columns-repeated");
            column = column.saturating_add(repeated);
            let has_content = doc.first_child(cell).is_some()
                || doc.attribute(cell, "office:value-type").is_some();
            if has_content {
                extent = column;
            }
        }
        extent
    }

    pub fn document_meta(&self) -> DocumentMeta {
        let document_type = self.document_type();
        let entries: Vec<EntryMeta> = self
            .entries()
            .into_iter()
            .map(|entry| match document_type {
                DocumentType::Spreadsheet => {
                    let (row_count, column_count) = self.table_dimensions(entry);
                    EntryMeta {
                        name: self.content.attribute(entry, "table:name").map(str::to_string),
                        row_count,
                        column_count,
                    }
                },
                _ => EntryMeta {
                    name: self.content.attribute(entry, "draw:name").map(str::to_string),
                    ..EntryMeta::default()
                },
            })
            .collect();

        DocumentMeta {
            document_type,
            entry_count: entries.len() as u32,
            entries,
        }
    }

    /// Replace the content of a text node in the content tree.
    pub fn set_text(&mut self, node: NodeRef, text: &str) -> bool {
        node.part == 0 && self.content.set_text(node.node, text)
    }
}

#[derive(Debug, Default)]
struct TableDimensions {
    next_row: u32,
    rows: u32,
    columns: u32,
}

fn count_attribute(doc: &XmlDocument, node: NodeId, name: &str) -> u32 {
    doc.attribute(node, name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1)
}

impl DocumentTree for OdfDocument {
    fn root(&self) -> NodeRef {
        NodeRef::new(0, self.content.root())
    }

    fn name(&self, node: NodeRef) -> Option<&str> {
        self.content.name(node.node)
    }

    fn text(&self, node: NodeRef) -> Option<&str> {
        self.content.text(node.node)
    }

    fn attributes(&self, node: NodeRef) -> &[Attribute] {
        self.content.attributes(node.node)
    }

    fn first_child(&self, node: NodeRef) -> Option<NodeRef> {
        self.content.first_child(node.node).map(|n| NodeRef::new(0, n))
    }

    fn next_sibling(&self, node: NodeRef) -> Option<NodeRef> {
        self.content.next_sibling(node.node).map(|n| NodeRef::new(0, n))
    }

    fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.content.parent(node.node).map(|n| NodeRef::new(0, n))
    }
}


#[cfg(test)]
mod tests {
    use super::fixture::content_xml;
    use super::*;
    use crate::access::ZipStorage;
    use crate::access::zip::fixture::zip_bytes;
    use crate::document::cursor::DocumentCursor;

    fn spreadsheet(body: &str) -> OdfDocument {
        let xml = content_xml("office:spreadsheet", body);
        let storage = ZipStorage::open(zip_bytes(&[
            ("mimetype", b"application/vnd.oasis.opendocument.spreadsheet"),
            ("content.xml", xml.as_bytes()),
        ]))
        .unwrap();
        OdfDocument::open(&storage, FileType::OpenDocumentSpreadsheet).unwrap()
    }

    #[test]
    fn test_table_dimensions_skip_trailing_empty() {
        let doc = spreadsheet(concat!(
            r#"<table:table table:name="Data">"#,
            r#"<table:table-column table:number-columns-repeated="1024"/>"#,
            "<table:table-row><table:table-cell office:value-type=\"string\"><text:p>a</text:p></table:table-cell>",
            r#"<table:table-cell table:number-columns-repeated="2"><text:p>b</text:p></table:table-cell>"#,
            r#"<table:table-cell table:number-columns-repeated="1021"/></table:table-row>"#,
            r#"<table:table-row table:number-rows-repeated="2"><table:table-cell><text:p>c</text:p></table:table-cell></table:table-row>"#,
            r#"<table:table-row table:number-rows-repeated="1048573"><table:table-cell table:number-columns-repeated="1024"/></table:table-row>"#,
            "</table:table>",
            r#"<table:table table:name="Empty"><table:table-row><table:table-cell/></table:table-row></table:table>"#
        ));

        let meta = doc.document_meta();
        assert_eq!(meta.document_type, DocumentType::Spreadsheet);
        assert_eq!(meta.entry_count, 2);
        assert_eq!(meta.entries[0].name.as_deref(), Some("Data"));
        assert_eq!((meta.entries[0].row_count, meta.entries[0].column_count), (3, 3));
        assert_eq!((meta.entries[1].row_count, meta.entries[1].column_count), (0, 0));
    }

    #[test]
    fn test_rows_inside_groups_count() {
        let doc = spreadsheet(concat!(
            "<table:table>",
            "<table:table-header-rows><table:table-row><table:table-cell><text:p>h</text:p></table:table-cell></table:table-row></table:table-header-rows>",
            "<table:table-row-group><table:table-row><table:table-cell/><table:table-cell><text:p>x</text:p></table:table-cell></table:table-row></table:table-row-group>",
            "</table:table>"
        ));
        let entry = doc.entries()[0];
        assert_eq!(doc.table_dimensions(entry), (2, 2));
    }

    #[test]
    fn test_flat_presentation_pages() {
        let xml = br#"<office:document office:mimetype="application/vnd.oasis.opendocument.presentation">
<office:body><office:presentation>
<draw:page draw:name="Intro"/><draw:page draw:name="End"/>
</office:presentation></office:body></office:document>"#;
        let doc = OdfDocument::from_flat_xml(xml, FileType::OpenDocumentPresentation).unwrap();
        assert!(doc.is_flat());
        assert!(doc.styles().is_none());

        let meta = doc.document_meta();
        assert_eq!(meta.entry_count, 2);
        assert_eq!(meta.entries[1].name.as_deref(), Some("End"));
    }

    #[test]
    fn test_text_document_has_no_entries() {
        let xml = content_xml("office:text", "<text:p>Hello</text:p>");
        let storage = ZipStorage::open(zip_bytes(&[("content.xml", xml.as_bytes())])).unwrap();
        let mut doc = OdfDocument::open(&storage, FileType::OpenDocumentText).unwrap();
        assert_eq!(doc.document_meta().entry_count, 0);

        let body = doc.body().unwrap();
        assert_eq!(doc.content().name(body), Some("office:text"));

        let text = {
            let root = DocumentCursor::root(&doc);
            root.path(&["office:body", "office:text", "text:p"])
                .and_then(|p| p.first_child())
                .unwrap()
                .node_ref()
        };
        assert!(doc.set_text(text, "Bye"));
        assert_eq!(doc.content().text(text.node), Some("Bye"));
    }

    #[test]
    fn test_missing_content_is_not_found() {
        let storage = ZipStorage::open(zip_bytes(&[("styles.xml", b"<x/>")])).unwrap();
        assert!(matches!(
            OdfDocument::open(&storage, FileType::OpenDocumentText),
            Err(Error::FileNotFound(_))
        ));
    }
}
