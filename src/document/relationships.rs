//! OOXML package relationships (`_rels/*.rels`).

use crate::access::ReadStorage;
use crate::common::xml::XmlDocument;
use crate::common::{Path, Result};
use std::collections::HashMap;

const TARGET_MODE_EXTERNAL: &str = "External";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Target as written in the relationships part
    pub target: String,
    pub external: bool,
}

/// Relationships of one package part, keyed by relationship id.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Directory of the owning part; internal targets resolve against it
    base: Path,
    by_id: HashMap<String, Relationship>,
}

impl Relationships {
    /// Path of the relationships part that belongs to `part`.
    pub fn rels_path(part: &Path) -> Path {
        let base = part.parent().unwrap_or_default();
        let name = format!("{}.rels", part.file_name().unwrap_or_default());
        base.child("_rels").child(&name)
    }

    /// Load the relationships of `part`; a missing `.rels` file yields an
    /// empty set.
    pub fn load(storage: &dyn ReadStorage, part: &Path) -> Result<Self> {
        let rels = Self::rels_path(part);
        let base = part.parent().unwrap_or_default();
        if !storage.is_file(&rels) {
            return Ok(Self {
                base,
                by_id: HashMap::new(),
            });
        }
        let xml = XmlDocument::parse(&storage.read_to_vec(&rels)?)?;
        Ok(Self::from_xml(&xml, base))
    }

    pub fn from_xml(xml: &XmlDocument, base: Path) -> Self {
        let mut by_id = HashMap::new();
        for node in xml.children(xml.root()) {
            if xml.name(node) != Some("Relationship") {
                continue;
            }
            let (Some(id), Some(target)) = (xml.attribute(node, "Id"), xml.attribute(node, "Target"))
            else {
                log::warn!("relationship without Id or Target in {}", base);
                continue;
            };
            by_id.insert(
                id.to_string(),
                Relationship {
                    id: id.to_string(),
                    rel_type: xml.attribute(node, "Type").unwrap_or_default().to_string(),
                    target: target.to_string(),
                    external: xml.attribute(node, "TargetMode") == Some(TARGET_MODE_EXTERNAL),
                },
            );
        }
        Self { base, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.by_id.values()
    }

    /// Package path of an internal target; `None` for external or unknown ids.
    pub fn resolve(&self, id: &str) -> Option<Path> {
        let rel = self.get(id)?;
        if rel.external {
            return None;
        }
        Some(if rel.target.starts_with('/') {
            Path::new(&rel.target)
        } else {
            self.base.join(&Path::new(&rel.target))
        })
    }

    /// Link target suitable for an `href`: external targets verbatim,
    /// internal ones as package paths.
    pub fn href(&self, id: &str) -> Option<String> {
        let rel = self.get(id)?;
        if rel.external {
            Some(rel.target.clone())
        } else {
            self.resolve(id).map(|p| p.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::ZipStorage;
    use crate::access::zip::fixture::zip_bytes;

    const RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
  <Relationship Id="rId4" Type="x" Target="/docProps/core.xml"/>
</Relationships>"#;

    #[test]
    fn test_rels_path() {
        assert_eq!(
            Relationships::rels_path(&Path::new("ppt/presentation.xml")).to_string(),
            "ppt/_rels/presentation.xml.rels"
        );
        assert_eq!(
            Relationships::rels_path(&Path::new("workbook.xml")).to_string(),
            "_rels/workbook.xml.rels"
        );
    }

    #[test]
    fn test_resolve_relative_to_part() {
        let storage = ZipStorage::open(zip_bytes(&[
            ("ppt/presentation.xml", b"<p:presentation/>"),
            ("ppt/_rels/presentation.xml.rels", RELS),
        ]))
        .unwrap();
        let rels = Relationships::load(&storage, &Path::new("ppt/presentation.xml")).unwrap();

        assert_eq!(rels.len(), 4);
        assert_eq!(rels.resolve("rId1").unwrap().to_string(), "ppt/slides/slide1.xml");
        assert_eq!(rels.resolve("rId2").unwrap().to_string(), "media/image1.png");
        assert_eq!(rels.resolve("rId3"), None);
        assert_eq!(rels.href("rId3").as_deref(), Some("https://example.com/?a=1&b=2"));
        assert_eq!(rels.resolve("rId4").unwrap().to_string(), "docProps/core.xml");
        assert_eq!(rels.resolve("rId9"), None);
    }

    #[test]
    fn test_missing_rels_is_empty() {
        let storage = ZipStorage::open(zip_bytes(&[("word/document.xml", b"<w:document/>")])).unwrap();
        let rels = Relationships::load(&storage, &Path::new("word/document.xml")).unwrap();
        assert!(rels.is_empty());
    }
}
