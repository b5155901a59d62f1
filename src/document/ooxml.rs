//! Office Open XML content model.
//!
//! The main part (`word/document.xml`, `ppt/presentation.xml` or
//! `xl/workbook.xml`) is part 0. Slides and worksheets referenced from it are
//! loaded as further parts and spliced into the tree: the children of a
//! `p:sldId` or `sheet` element are the root of the part it references.

use super::cursor::{DocumentTree, NodeRef};
use super::relationships::Relationships;
use crate::access::ReadStorage;
use crate::common::xml::{Attribute, XmlDocument};
use crate::common::{Error, Path, Result};
use crate::file::{DocumentMeta, DocumentType, EntryMeta, FileType};
use std::collections::HashMap;

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

#[derive(Debug, Clone)]
pub struct Part {
    pub path: Path,
    pub xml: XmlDocument,
    pub relationships: Relationships,
    /// Element whose children this part's root replaces
    parent: Option<NodeRef>,
}

#[derive(Debug, Clone)]
pub struct OoxmlDocument {
    file_type: FileType,
    parts: Vec<Part>,
    /// Linking element -> index of the part it references
    links: HashMap<NodeRef, usize>,
    /// Linking elements in document order
    entries: Vec<NodeRef>,
    shared_strings: Vec<String>,
}

impl OoxmlDocument {
    pub fn open(storage: &dyn ReadStorage, file_type: FileType) -> Result<Self> {
        let main_path = main_part_path(storage, file_type)?;
        let main = load_part(storage, main_path, None)?;

        let mut document = Self {
            file_type,
            parts: vec![main],
            links: HashMap::new(),
            entries: Vec::new(),
            shared_strings: Vec::new(),
        };

        match file_type {
            FileType::OfficeOpenXmlPresentation => {
                document.link_parts(storage, &["p:sldIdLst"], "p:sldId")?;
            },
            FileType::OfficeOpenXmlWorkbook => {
                document.link_parts(storage, &["sheets"], "sheet")?;
                document.load_shared_strings(storage)?;
            },
            _ => {},
        }

        Ok(document)
    }

    /// Load every part referenced by `r:id` from the `link` children of the
    /// container found by following `container` from the main root.
    fn link_parts(&mut self, storage: &dyn ReadStorage, container: &[&str], link: &str) -> Result<()> {
        let main = &self.parts[0].xml;
        let Some(list) = container
            .iter()
            .try_fold(main.root(), |node, name| main.child(node, name))
        else {
            return Ok(());
        };

        let mut pending = Vec::new();
        for node in main.children(list) {
            if main.name(node) != Some(link) {
                continue;
            }
            let Some(id) = main.attribute(node, "r:id") else {
                log::warn!("{} without r:id in {}", link, self.parts[0].path);
                continue;
            };
            match self.parts[0].relationships.resolve(id) {
                Some(path) => pending.push((NodeRef::new(0, node), path)),
                None => log::warn!("unresolved relationship {} in {}", id, self.parts[0].path),
            }
        }

        for (node, path) in pending {
            if !storage.is_file(&path) {
                log::warn!("referenced part {} is missing", path);
                continue;
            }
            let part = load_part(storage, path, Some(node))?;
            self.links.insert(node, self.parts.len());
            self.parts.push(part);
            self.entries.push(node);
        }
        Ok(())
    }

    fn load_shared_strings(&mut self, storage: &dyn ReadStorage) -> Result<()> {
        let path = shared_strings_path(&self.parts[0].relationships)
            .unwrap_or_else(|| Path::new("xl/sharedStrings.xml"));
        if !storage.is_file(&path) {
            return Ok(());
        }

        let xml = XmlDocument::parse(&storage.read_to_vec(&path)?)?;
        self.shared_strings = xml
            .children(xml.root())
            .filter(|&si| xml.name(si) == Some("si"))
            .map(|si| {
                // rich text keeps phonetic runs out of the value
                xml.descendants(si)
                    .filter(|&n| xml.name(n) == Some("t") && xml.parent(n).and_then(|p| xml.name(p)) != Some("rPh"))
                    .map(|t| xml.text_content(t))
                    .collect::<String>()
            })
            .collect();
        Ok(())
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn document_type(&self) -> DocumentType {
        self.file_type.document_type().unwrap_or(DocumentType::Text)
    }

    pub fn part(&self, index: usize) -> Option<&Part> {
        self.parts.get(index)
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Relationships of the part holding `node`.
    pub fn relationships(&self, node: NodeRef) -> Option<&Relationships> {
        self.parts.get(node.part).map(|p| &p.relationships)
    }

    pub fn shared_string(&self, index: usize) -> Option<&str> {
        self.shared_strings.get(index).map(String::as_str)
    }

    /// Linking elements (`p:sldId`, `sheet`) in document order.
    pub fn entries(&self) -> &[NodeRef] {
        &self.entries
    }

    /// Root of the part an entry links to.
    pub fn entry_root(&self, entry: NodeRef) -> Option<NodeRef> {
        let index = *self.links.get(&entry)?;
        Some(NodeRef::new(index, self.parts[index].xml.root()))
    }

    /// Rows and columns of a worksheet holding values; `sheet` is the root
    /// of a worksheet part.
    pub fn sheet_dimensions(&self, sheet: NodeRef) -> (u32, u32) {
        sheet_dimensions(self.xml(sheet))
    }

    pub fn document_meta(&self) -> DocumentMeta {
        let document_type = self.document_type();
        let main = &self.parts[0].xml;
        let entries: Vec<EntryMeta> = self
            .entries
            .iter()
            .filter_map(|&entry| {
                let root = self.entry_root(entry)?;
                let xml = &self.parts[root.part].xml;
                Some(match document_type {
                    DocumentType::Spreadsheet => {
                        let (row_count, column_count) = sheet_dimensions(xml);
                        EntryMeta {
                            name: main.attribute(entry.node, "name").map(str::to_string),
                            row_count,
                            column_count,
                        }
                    },
                    _ => EntryMeta {
                        name: xml
                            .child(root.node, "p:cSld")
                            .and_then(|c| xml.attribute(c, "name"))
                            .filter(|n| !n.is_empty())
                            .map(str::to_string),
                        ..EntryMeta::default()
                    },
                })
            })
            .collect();

        DocumentMeta {
            document_type,
            entry_count: entries.len() as u32,
            entries,
        }
    }

    fn xml(&self, node: NodeRef) -> &XmlDocument {
        &self.parts[node.part].xml
    }
}

impl DocumentTree for OoxmlDocument {
    fn root(&self) -> NodeRef {
        NodeRef::new(0, self.parts[0].xml.root())
    }

    fn name(&self, node: NodeRef) -> Option<&str> {
        self.xml(node).name(node.node)
    }

    fn text(&self, node: NodeRef) -> Option<&str> {
        self.xml(node).text(node.node)
    }

    fn attributes(&self, node: NodeRef) -> &[Attribute] {
        self.xml(node).attributes(node.node)
    }

    fn first_child(&self, node: NodeRef) -> Option<NodeRef> {
        if let Some(root) = self.entry_root(node) {
            return Some(root);
        }
        self.xml(node)
            .first_child(node.node)
            .map(|n| NodeRef::new(node.part, n))
    }

    fn next_sibling(&self, node: NodeRef) -> Option<NodeRef> {
        self.xml(node)
            .next_sibling(node.node)
            .map(|n| NodeRef::new(node.part, n))
    }

    fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        let xml = self.xml(node);
        match xml.parent(node.node) {
            Some(parent) => Some(NodeRef::new(node.part, parent)),
            None => self.parts[node.part].parent,
        }
    }
}

fn main_part_path(storage: &dyn ReadStorage, file_type: FileType) -> Result<Path> {
    let package_rels = Path::new("_rels/.rels");
    if storage.is_file(&package_rels) {
        let xml = XmlDocument::parse(&storage.read_to_vec(&package_rels)?)?;
        let rels = Relationships::from_xml(&xml, Path::root());
        let target = xml
            .children(xml.root())
            .filter(|&n| xml.attribute(n, "Type") == Some(REL_OFFICE_DOCUMENT))
            .find_map(|n| xml.attribute(n, "Id"))
            .and_then(|id| rels.resolve(id));
        if let Some(path) = target
            && storage.is_file(&path)
        {
            return Ok(path);
        }
    }

    let default = match file_type {
        FileType::OfficeOpenXmlDocument => "word/document.xml",
        FileType::OfficeOpenXmlPresentation => "ppt/presentation.xml",
        FileType::OfficeOpenXmlWorkbook => "xl/workbook.xml",
        other => {
            return Err(Error::Unsupported(format!("{:?} as an OOXML document", other)));
        },
    };
    let path = Path::new(default);
    if !storage.is_file(&path) {
        return Err(Error::FileNotFound(default.to_string()));
    }
    Ok(path)
}

fn load_part(storage: &dyn ReadStorage, path: Path, parent: Option<NodeRef>) -> Result<Part> {
    let xml = XmlDocument::parse(&storage.read_to_vec(&path)?)?;
    let relationships = Relationships::load(storage, &path)?;
    Ok(Part {
        path,
        xml,
        relationships,
        parent,
    })
}

fn shared_strings_path(rels: &Relationships) -> Option<Path> {
    rels.iter()
        .find(|r| r.rel_type == REL_SHARED_STRINGS)
        .and_then(|r| rels.resolve(&r.id))
}

/// Split a cell reference like `AB12` into zero-based column and one-based row.
pub fn parse_cell_reference(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut column = 0u32;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        column = column
            .checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
    }
    let row = digits.parse().ok()?;
    Some((column - 1, row))
}

/// Rows and columns of a worksheet that hold cells with values.
fn sheet_dimensions(xml: &XmlDocument) -> (u32, u32) {
    let Some(sheet_data) = xml.child(xml.root(), "sheetData") else {
        return (0, 0);
    };
    let mut rows = 0u32;
    let mut columns = 0u32;
    let mut next_row = 1u32;
    for row in xml.children(sheet_data) {
        if xml.name(row) != Some("row") {
            continue;
        }
        let row_number = xml
            .attribute(row, "r")
            .and_then(|r| r.parse().ok())
            .unwrap_or(next_row);
        next_row = row_number.saturating_add(1);

        let mut next_column = 0u32;
        for cell in xml.children(row) {
            if xml.name(cell) != Some("c") {
                continue;
            }
            let column = xml
                .attribute(cell, "r")
                .and_then(parse_cell_reference)
                .map(|(c, _)| c)
                .unwrap_or(next_column);
            next_column = column.saturating_add(1);
            if xml.child(cell, "v").is_some() || xml.child(cell, "is").is_some() {
                rows = rows.max(row_number);
                columns = columns.max(column + 1);
            }
        }
    }
    (rows, columns)
}
