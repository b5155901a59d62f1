//! OpenDocument styles as CSS classes.
//!
//! Every `style:style` becomes a class named after the (sanitised) style
//! name. An element referencing a style gets the classes of the style and of
//! all its ancestors, nearest first, so inherited properties apply through
//! the cascade.

use crate::common::xml::{NodeId, XmlDocument};
use crate::document::OdfDocument;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

const STYLE_CONTAINERS: [&str; 2] = ["office:styles", "office:automatic-styles"];

/// Direct property renames: ODF attribute -> CSS property.
const CSS_PROPERTIES: &[(&str, &str)] = &[
    ("fo:font-size", "font-size"),
    ("fo:font-weight", "font-weight"),
    ("fo:font-style", "font-style"),
    ("fo:font-family", "font-family"),
    ("fo:color", "color"),
    ("fo:background-color", "background-color"),
    ("fo:margin", "margin"),
    ("fo:margin-top", "margin-top"),
    ("fo:margin-bottom", "margin-bottom"),
    ("fo:margin-left", "margin-left"),
    ("fo:margin-right", "margin-right"),
    ("fo:padding", "padding"),
    ("fo:padding-top", "padding-top"),
    ("fo:padding-bottom", "padding-bottom"),
    ("fo:padding-left", "padding-left"),
    ("fo:padding-right", "padding-right"),
    ("fo:line-height", "line-height"),
    ("fo:text-indent", "text-indent"),
    ("fo:border", "border"),
    ("fo:border-top", "border-top"),
    ("fo:border-bottom", "border-bottom"),
    ("fo:border-left", "border-left"),
    ("fo:border-right", "border-right"),
    ("style:vertical-align", "vertical-align"),
    ("style:column-width", "width"),
    ("style:row-height", "height"),
    ("style:min-row-height", "min-height"),
    ("style:width", "width"),
    ("svg:stroke-color", "border-color"),
];

#[derive(Debug, Clone, Default)]
struct StyleEntry {
    parent: Option<String>,
    css: String,
}

/// Style dependencies and generated CSS of one document.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    styles: HashMap<String, StyleEntry>,
    /// Definition order; later definitions of a name replace earlier ones
    order: Vec<String>,
    /// Style name -> sanitised class names, the style first
    dependencies: HashMap<String, Vec<String>>,
}

impl StyleRegistry {
    /// Collect the styles of `styles.xml` and of the content's own style
    /// sections.
    pub fn from_odf(document: &OdfDocument) -> Self {
        let mut registry = Self::default();
        if let Some(styles) = document.styles() {
            registry.collect(styles);
        }
        registry.collect(document.content());
        registry.resolve_dependencies();
        registry
    }

    fn collect(&mut self, xml: &XmlDocument) {
        let root = xml.root();
        for container in STYLE_CONTAINERS {
            let Some(container) = xml.child(root, container) else {
                continue;
            };
            for style in xml.children(container) {
                if xml.name(style) != Some("style:style") {
                    continue;
                }
                let Some(name) = xml.attribute(style, "style:name") else {
                    log::debug!("style without a name");
                    continue;
                };
                let entry = StyleEntry {
                    parent: xml.attribute(style, "style:parent-style-name").map(str::to_string),
                    css: style_css(xml, style),
                };
                if self.styles.insert(name.to_string(), entry).is_none() {
                    self.order.push(name.to_string());
                }
            }
        }
    }

    fn resolve_dependencies(&mut self) {
        for name in &self.order {
            let mut chain = vec![escape_style_name(name)];
            let mut seen = vec![name.as_str()];
            let mut current = self.styles.get(name).and_then(|s| s.parent.as_deref());
            while let Some(parent) = current {
                if seen.contains(&parent) {
                    log::warn!("cyclic style inheritance at {}", parent);
                    break;
                }
                let Some(entry) = self.styles.get(parent) else {
                    log::warn!("style {} inherits from unknown style {}", name, parent);
                    break;
                };
                chain.push(escape_style_name(parent));
                seen.push(parent);
                current = entry.parent.as_deref();
            }
            self.dependencies.insert(name.clone(), chain);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Classes for an element using `name`; `None` for unknown styles.
    pub fn classes(&self, name: &str) -> Option<String> {
        self.dependencies.get(name).map(|chain| chain.join(" "))
    }

    /// Stylesheet with one rule per style.
    ///
    /// Rules are ordered by inheritance depth, so a parent rule always
    /// precedes the rules of styles deriving from it; styles of equal depth
    /// keep their definition order.
    pub fn css(&self) -> String {
        let mut names: Vec<&String> = self.order.iter().collect();
        names.sort_by_key(|name| self.dependencies.get(*name).map_or(1, Vec::len));

        let mut out = String::new();
        for name in names {
            let Some(entry) = self.styles.get(name) else {
                continue;
            };
            if entry.css.is_empty() {
                continue;
            }
            let _ = writeln!(out, ".{}{{{}}}", escape_style_name(name), entry.css);
        }
        out
    }
}

/// CSS class name for a style name.
pub fn escape_style_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len() + 1);
    if name.starts_with(|c: char| c.is_ascii_digit()) || name.is_empty() {
        escaped.push('_');
    }
    escaped.extend(
        name.chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' }),
    );
    escaped
}

/// Declarations for all property children of a style element.
fn style_css(xml: &XmlDocument, style: NodeId) -> String {
    let mut css = String::new();
    for properties in xml.children(style) {
        if !xml.name(properties).is_some_and(|n| n.ends_with("-properties")) {
            continue;
        }
        let mut decorations = Vec::new();
        for attribute in xml.attributes(properties) {
            let value = attribute.value.as_str();
            match attribute.name.as_str() {
                "fo:text-align" => push_declaration(&mut css, "text-align", text_align(value)),
                "style:font-name" => push_declaration(&mut css, "font-family", &format!("\"{}\"", value)),
                "style:text-underline-style" if value != "none" => decorations.push("underline"),
                "style:text-line-through-style" if value != "none" => decorations.push("line-through"),
                "draw:fill-color" if xml.attribute(properties, "draw:fill") == Some("solid") => {
                    push_declaration(&mut css, "background-color", value)
                },
                "fo:wrap-option" if value == "no-wrap" => push_declaration(&mut css, "white-space", "nowrap"),
                name => {
                    if let Some((_, property)) = CSS_PROPERTIES.iter().find(|(odf, _)| *odf == name) {
                        push_declaration(&mut css, property, value);
                    }
                },
            }
        }
        if !decorations.is_empty() {
            push_declaration(&mut css, "text-decoration", &decorations.join(" "));
        }
    }
    css
}

fn push_declaration(css: &mut String, property: &str, value: &str) {
    css.push_str(property);
    css.push(':');
    css.push_str(value);
    css.push(';');
}

fn text_align(value: &str) -> &str {
    match value {
        "start" => "left",
        "end" => "right",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileType;

    fn flat(styles: &str) -> OdfDocument {
        let xml = format!(
            concat!(
                r#"<office:document xmlns:office="o" xmlns:style="s" xmlns:fo="f">"#,
                "<office:styles>{}</office:styles>",
                r#"<office:automatic-styles><style:style style:name="P1" style:parent-style-name="Heading 1"><style:paragraph-properties fo:text-align="end"/></style:style></office:automatic-styles>"#,
                "<office:body><office:text/></office:body></office:document>"
            ),
            styles
        );
        OdfDocument::from_flat_xml(xml.as_bytes(), FileType::OpenDocumentText).unwrap()
    }

    #[test]
    fn test_dependency_chain_nearest_first() {
        let registry = StyleRegistry::from_odf(&flat(concat!(
            r#"<style:style style:name="Standard"><style:text-properties fo:font-size="12pt"/></style:style>"#,
            r#"<style:style style:name="Heading 1" style:parent-style-name="Standard">"#,
            r#"<style:text-properties fo:font-weight="bold" style:text-underline-style="solid" style:text-line-through-style="none"/></style:style>"#
        )));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.classes("P1").as_deref(), Some("P1 Heading_1 Standard"));
        assert_eq!(registry.classes("Standard").as_deref(), Some("Standard"));
        assert_eq!(registry.classes("Nope"), None);

        let css = registry.css();
        assert!(css.contains(".Standard{font-size:12pt;}"));
        assert!(css.contains(".Heading_1{font-weight:bold;text-decoration:underline;}"));
        assert!(css.contains(".P1{text-align:right;}"));
        // parents are emitted before the styles deriving from them
        assert!(css.find(".Standard").unwrap() < css.find(".P1").unwrap());
    }

    #[test]
    fn test_parent_defined_after_child_comes_first() {
        let registry = StyleRegistry::from_odf(&flat(concat!(
            r##"<style:style style:name="Child" style:parent-style-name="Base"><style:text-properties fo:color="#000001"/></style:style>"##,
            r##"<style:style style:name="Other"><style:text-properties fo:color="#000002"/></style:style>"##,
            r##"<style:style style:name="Base"><style:text-properties fo:color="#000003"/></style:style>"##
        )));
        let css = registry.css();
        let position = |rule: &str| css.find(rule).unwrap();
        assert!(position(".Base{") < position(".Child{"));
        // same depth: definition order
        assert!(position(".Other{") < position(".Base{"));
    }

    #[test]
    fn test_cycles_and_unknown_parents_terminate() {
        let registry = StyleRegistry::from_odf(&flat(concat!(
            r#"<style:style style:name="A" style:parent-style-name="B"/>"#,
            r#"<style:style style:name="B" style:parent-style-name="A"/>"#,
            r#"<style:style style:name="Heading 1" style:parent-style-name="Gone"/>"#
        )));
        assert_eq!(registry.classes("A").as_deref(), Some("A B"));
        assert_eq!(registry.classes("P1").as_deref(), Some("P1 Heading_1"));
    }

    #[test]
    fn test_escape_style_name() {
        assert_eq!(escape_style_name("Heading 1"), "Heading_1");
        assert_eq!(escape_style_name("1st.Style"), "_1st_Style");
        assert_eq!(escape_style_name("ce-1_x"), "ce-1_x");
    }

    #[test]
    fn test_graphic_fill() {
        let registry = StyleRegistry::from_odf(&flat(concat!(
            r##"<style:style style:name="gr1"><style:graphic-properties draw:fill="solid" draw:fill-color="#ff0000"/></style:style>"##,
            r##"<style:style style:name="gr2"><style:graphic-properties draw:fill="none" draw:fill-color="#00ff00"/></style:style>"##
        )));
        let css = registry.css();
        assert!(css.contains(".gr1{background-color:#ff0000;}"));
        assert!(!css.contains("gr2"));
    }
}
