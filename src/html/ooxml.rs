//! Office Open XML content to HTML.
//!
//! Word and PowerPoint formatting lives in property children (`w:rPr`,
//! `a:pPr`, `p:spPr`, ...) rather than in named styles, so it is translated
//! to inline CSS of the element owning the properties.

use super::context::{HtmlAttributes, TableState, TranslationContext};
use super::image::{embed_from_storage, missing_image_alt};
use super::translator::{ElementHandler, Translator, close_tag, write_open_tag};
use crate::document::ooxml::parse_cell_reference;
use crate::document::{Document, DocumentCursor, OoxmlDocument};
use crate::file::DocumentType;
use once_cell::sync::Lazy;

use ElementHandler::{Custom, Ignore, Wrap};

const EMUS_PER_INCH: f64 = 914_400.0;
const EMUS_PER_POINT: f64 = 12_700.0;
const TWIPS_PER_POINT: f64 = 20.0;

pub static TEXT_TRANSLATOR: Lazy<Translator> = Lazy::new(|| {
    Translator::new()
        .elements(
            &[
                "w:pPr",
                "w:rPr",
                "w:tblPr",
                "w:tblGrid",
                "w:trPr",
                "w:tcPr",
                "w:sectPr",
                "w:proofErr",
                "w:bookmarkEnd",
                "w:lastRenderedPageBreak",
                "w:fldChar",
                "w:instrText",
                "w:commentRangeStart",
                "w:commentRangeEnd",
                "w:commentReference",
                "wp:docPr",
                "wp:cNvGraphicFramePr",
                "wp:effectExtent",
                "wp:simplePos",
                "wp:positionH",
                "wp:positionV",
                "pic:nvPicPr",
                "pic:spPr",
            ],
            Ignore,
        )
        .element("w:p", Custom(word_paragraph))
        .element("w:r", Wrap("span"))
        .element("w:tab", Custom(tab))
        .elements(&["w:br", "w:cr"], Custom(line_break))
        .element("w:hyperlink", Custom(word_hyperlink))
        .element("w:bookmarkStart", Custom(word_bookmark))
        .element("w:tbl", Custom(table))
        .element("w:tr", Wrap("tr"))
        .element("w:tc", Custom(word_cell))
        .element("pic:pic", Custom(picture))
        .with_element_attributes(word_style)
});

pub static PRESENTATION_TRANSLATOR: Lazy<Translator> = Lazy::new(|| {
    Translator::new()
        .elements(
            &[
                "p:sldSz",
                "p:notesSz",
                "p:sldMasterIdLst",
                "p:notesMasterIdLst",
                "p:handoutMasterIdLst",
                "p:defaultTextStyle",
                "p:extLst",
                "p:nvGrpSpPr",
                "p:grpSpPr",
                "p:nvSpPr",
                "p:nvPicPr",
                "p:nvGraphicFramePr",
                "p:spPr",
                "p:xfrm",
                "p:style",
                "p:clrMapOvr",
                "p:timing",
                "p:transition",
                "a:bodyPr",
                "a:lstStyle",
                "a:pPr",
                "a:rPr",
                "a:endParaRPr",
                "a:tcPr",
                "a:tblPr",
            ],
            Ignore,
        )
        .element("p:sldId", Custom(entry))
        .element("p:cSld", Custom(slide))
        .elements(&["p:sp", "p:grpSp", "p:graphicFrame"], Wrap("div"))
        .element("a:p", Custom(drawing_paragraph))
        .element("a:r", Custom(drawing_run))
        .element("a:br", Custom(line_break))
        .element("a:tbl", Custom(table))
        .element("a:tblGrid", Wrap("colgroup"))
        .element("a:gridCol", Custom(void_element))
        .element("a:tr", Wrap("tr"))
        .element("a:tc", Custom(drawing_cell))
        .element("p:pic", Custom(picture))
        .with_element_attributes(drawing_style)
});

pub static WORKBOOK_TRANSLATOR: Lazy<Translator> = Lazy::new(|| {
    Translator::new()
        .elements(
            &[
                "fileVersion",
                "workbookPr",
                "bookViews",
                "calcPr",
                "definedNames",
                "extLst",
                "sheetPr",
                "dimension",
                "sheetViews",
                "sheetFormatPr",
                "cols",
                "mergeCells",
                "conditionalFormatting",
                "dataValidations",
                "pageMargins",
                "pageSetup",
                "headerFooter",
                "printOptions",
                "drawing",
                "legacyDrawing",
                "autoFilter",
                "tableParts",
            ],
            Ignore,
        )
        .element("sheet", Custom(entry))
        .element("sheetData", Custom(sheet_data))
});

/// Translator for the content of an OOXML document of the given type.
pub fn translator(document_type: DocumentType) -> &'static Translator {
    match document_type {
        DocumentType::Presentation => &PRESENTATION_TRANSLATOR,
        DocumentType::Spreadsheet => &WORKBOOK_TRANSLATOR,
        DocumentType::Text | DocumentType::Drawing => &TEXT_TRANSLATOR,
    }
}

fn ooxml<'a>(ctx: &TranslationContext<'a>) -> Option<&'a OoxmlDocument> {
    match ctx.document {
        Document::Ooxml(doc) => Some(doc),
        Document::Odf(_) => None,
    }
}

/// Resolve a relationship id of the part holding `cursor` to a link target.
fn relationship_href(cursor: DocumentCursor<'_>, ctx: &TranslationContext<'_>, id: &str) -> Option<String> {
    let href = ooxml(ctx)?.relationships(cursor.node_ref())?.href(id);
    if href.is_none() {
        log::warn!("unresolved relationship {}", id);
    }
    href
}

/// Number with at most four decimals and no trailing zeros.
fn format_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 { "0".to_string() } else { rounded.to_string() }
}

fn length(value: &str, per_unit: f64, unit: &str) -> Option<String> {
    let value: f64 = value.trim().parse().ok()?;
    Some(format!("{}{}", format_number(value / per_unit), unit))
}

fn emu_inches(value: &str) -> Option<String> {
    length(value, EMUS_PER_INCH, "in")
}

fn has_content(cursor: DocumentCursor<'_>, property_names: &[&str]) -> bool {
    cursor
        .children()
        .any(|c| !c.name().is_some_and(|n| property_names.contains(&n)))
}

fn tab(_: &Translator, _: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    ctx.write("<span class=\"whitespace\">\t</span>");
}

fn line_break(_: &Translator, _: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    ctx.write("<br>");
}

fn void_element(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let tag = match cursor.name() {
        Some("a:gridCol") => "col",
        _ => return,
    };
    tr.open_tag(tag, cursor, ctx, HtmlAttributes::new());
}

fn table(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let enclosing = ctx.enter_table(TableState::new(ctx.config));
    let attrs = HtmlAttributes::new()
        .with("border", "0")
        .with("cellspacing", "0")
        .with("cellpadding", "0");
    tr.wrap("table", cursor, ctx, attrs);
    ctx.leave_table(enclosing);
}

/// Slides and worksheets: the linked part is only translated inside the
/// entry window.
fn entry(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    if ctx.enter_entry() {
        tr.translate_children(cursor, ctx);
    }
}

fn picture(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let blip = cursor
        .path(&["pic:blipFill", "a:blip"])
        .or_else(|| cursor.path(&["p:blipFill", "a:blip"]));
    let id = blip.and_then(|b| b.attribute("r:embed")).unwrap_or_default();
    let path = ooxml(ctx)
        .and_then(|doc| doc.relationships(cursor.node_ref()))
        .and_then(|rels| rels.resolve(id));

    let mut attrs = HtmlAttributes::new();
    tr.translate_attributes(cursor, ctx, &mut attrs);
    let shown = path.as_ref().map(|p| p.to_string()).unwrap_or_else(|| id.to_string());
    attrs.push("alt", missing_image_alt(&shown));
    let src = match &path {
        Some(path) if ctx.config.embed_images => embed_from_storage(ctx.storage, path),
        Some(path) => Some(path.to_string()),
        None => {
            log::warn!("picture without a resolvable image {:?}", id);
            None
        },
    };
    if let Some(src) = src {
        attrs.push("src", src);
    }
    write_open_tag(ctx, "img", &attrs);
}

// Word

fn word_paragraph(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    tr.open_tag("p", cursor, ctx, HtmlAttributes::new());
    if has_content(cursor, &["w:pPr"]) {
        tr.translate_children(cursor, ctx);
    } else {
        ctx.write("<br>");
    }
    close_tag(ctx, "p");
}

fn word_hyperlink(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let mut attrs = HtmlAttributes::new();
    if let Some(href) = cursor.attribute("r:id").and_then(|id| relationship_href(cursor, ctx, id)) {
        attrs.push("href", href);
    } else if let Some(anchor) = cursor.attribute("w:anchor") {
        attrs.push("target", "_self");
        attrs.push("href", format!("#{}", anchor));
    } else {
        log::warn!("empty link");
    }
    tr.wrap("a", cursor, ctx, attrs);
}

fn word_bookmark(_: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let Some(name) = cursor.attribute("w:name") else {
        log::warn!("bookmark without a name");
        return;
    };
    write_open_tag(ctx, "a", &HtmlAttributes::new().with("id", name));
    close_tag(ctx, "a");
}

fn word_cell(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let mut attrs = HtmlAttributes::new();
    if let Some(span) = cursor
        .path(&["w:tcPr", "w:gridSpan"])
        .and_then(|s| s.attribute("w:val"))
    {
        attrs.push("colspan", span);
    }
    tr.wrap("td", cursor, ctx, attrs);
}

fn word_style(cursor: DocumentCursor<'_>, _: &mut TranslationContext<'_>, attrs: &mut HtmlAttributes) {
    for properties in cursor.children() {
        match properties.name() {
            Some("w:pPr") => word_paragraph_properties(properties, attrs),
            Some("w:rPr") => word_run_properties(properties, attrs),
            Some("w:tcPr") => {
                if let Some(fill) = properties.child("w:shd").and_then(|s| s.attribute("w:fill"))
                    && fill != "auto"
                {
                    attrs.push_style("background-color", &format!("#{}", fill));
                }
            },
            _ => {},
        }
    }
}

fn word_paragraph_properties(properties: DocumentCursor<'_>, attrs: &mut HtmlAttributes) {
    if let Some(jc) = properties.child("w:jc").and_then(|j| j.attribute("w:val")) {
        let align = match jc {
            "left" | "start" => "left",
            "center" => "center",
            "right" | "end" => "right",
            "both" | "distribute" => "justify",
            _ => "",
        };
        if !align.is_empty() {
            attrs.push_style("text-align", align);
        }
    }
    if let Some(ind) = properties.child("w:ind") {
        for (source, property) in [
            ("w:left", "margin-left"),
            ("w:start", "margin-left"),
            ("w:right", "margin-right"),
            ("w:end", "margin-right"),
            ("w:firstLine", "text-indent"),
        ] {
            if let Some(value) = ind.attribute(source).and_then(|v| length(v, TWIPS_PER_POINT, "pt")) {
                attrs.push_style(property, &value);
            }
        }
    }
}

fn toggled(properties: DocumentCursor<'_>, name: &str) -> bool {
    properties
        .child(name)
        .is_some_and(|p| !matches!(p.attribute("w:val"), Some("0" | "false" | "none")))
}

fn word_run_properties(properties: DocumentCursor<'_>, attrs: &mut HtmlAttributes) {
    if toggled(properties, "w:b") {
        attrs.push_style("font-weight", "bold");
    }
    if toggled(properties, "w:i") {
        attrs.push_style("font-style", "italic");
    }
    let mut decorations = Vec::new();
    if toggled(properties, "w:u") {
        decorations.push("underline");
    }
    if toggled(properties, "w:strike") {
        decorations.push("line-through");
    }
    if !decorations.is_empty() {
        attrs.push_style("text-decoration", &decorations.join(" "));
    }
    if let Some(size) = properties
        .child("w:sz")
        .and_then(|s| s.attribute("w:val"))
        .and_then(|v| length(v, 2.0, "pt"))
    {
        attrs.push_style("font-size", &size);
    }
    if let Some(color) = properties.child("w:color").and_then(|c| c.attribute("w:val"))
        && color != "auto"
    {
        attrs.push_style("color", &format!("#{}", color));
    }
    if let Some(highlight) = properties.child("w:highlight").and_then(|h| h.attribute("w:val"))
        && highlight != "none"
    {
        attrs.push_style("background-color", highlight);
    }
    if let Some(font) = properties.child("w:rFonts").and_then(|f| f.attribute("w:ascii")) {
        attrs.push_style("font-family", &format!("\"{}\"", font));
    }
}

// PowerPoint

fn slide(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let mut attrs = HtmlAttributes::new().with("class", "slide");
    if let Some(size) = ctx.document.root().child("p:sldSz") {
        if let Some(width) = size.attribute("cx").and_then(emu_inches) {
            attrs.push_style("width", &width);
        }
        if let Some(height) = size.attribute("cy").and_then(emu_inches) {
            attrs.push_style("height", &height);
        }
    }
    tr.wrap("div", cursor, ctx, attrs);
}

fn drawing_paragraph(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    tr.open_tag("p", cursor, ctx, HtmlAttributes::new());
    if has_content(cursor, &["a:pPr", "a:endParaRPr"]) {
        tr.translate_children(cursor, ctx);
    } else {
        ctx.write("<br>");
    }
    close_tag(ctx, "p");
}

fn drawing_run(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let href = cursor
        .path(&["a:rPr", "a:hlinkClick"])
        .and_then(|link| link.attribute("r:id"))
        .and_then(|id| relationship_href(cursor, ctx, id));
    if let Some(href) = &href {
        write_open_tag(ctx, "a", &HtmlAttributes::new().with("href", href.as_str()));
    }
    tr.wrap("span", cursor, ctx, HtmlAttributes::new());
    if href.is_some() {
        close_tag(ctx, "a");
    }
}

fn drawing_cell(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let merged = |name: &str| matches!(cursor.attribute(name), Some("1" | "true"));
    if merged("hMerge") || merged("vMerge") {
        return;
    }
    let mut attrs = HtmlAttributes::new();
    if let Some(span) = cursor.attribute("gridSpan") {
        attrs.push("colspan", span);
    }
    if let Some(span) = cursor.attribute("rowSpan") {
        attrs.push("rowspan", span);
    }
    tr.wrap("td", cursor, ctx, attrs);
}

fn drawing_style(cursor: DocumentCursor<'_>, _: &mut TranslationContext<'_>, attrs: &mut HtmlAttributes) {
    for (source, property) in [("w", "width"), ("h", "height")] {
        if let Some(value) = cursor.attribute(source).and_then(emu_inches) {
            attrs.push_style(property, &value);
        }
    }
    for properties in cursor.children() {
        match properties.name() {
            Some("p:spPr") => {
                if let Some(xfrm) = properties.child("a:xfrm") {
                    transform_style(xfrm, attrs);
                }
                fill_style(properties, "background-color", attrs);
            },
            Some("p:xfrm") => transform_style(properties, attrs),
            Some("a:pPr") => {
                for (source, property) in [("marL", "margin-left"), ("marR", "margin-right")] {
                    if let Some(value) = properties.attribute(source).and_then(emu_inches) {
                        attrs.push_style(property, &value);
                    }
                }
                let align = match properties.attribute("algn") {
                    Some("l") => "left",
                    Some("ctr") => "center",
                    Some("r") => "right",
                    Some("just") => "justify",
                    _ => "",
                };
                if !align.is_empty() {
                    attrs.push_style("text-align", align);
                }
            },
            Some("a:rPr") => {
                if let Some(size) = properties.attribute("sz").and_then(|v| length(v, 100.0, "pt")) {
                    attrs.push_style("font-size", &size);
                }
                if properties.attribute("b") == Some("1") {
                    attrs.push_style("font-weight", "bold");
                }
                if properties.attribute("i") == Some("1") {
                    attrs.push_style("font-style", "italic");
                }
                if properties.attribute("u").is_some_and(|u| u != "none") {
                    attrs.push_style("text-decoration", "underline");
                }
                fill_style(properties, "color", attrs);
                if let Some(font) = properties.child("a:latin").and_then(|f| f.attribute("typeface")) {
                    attrs.push_style("font-family", &format!("\"{}\"", font));
                }
            },
            Some("a:tcPr") => {
                for (line, side) in [("a:lnL", "left"), ("a:lnR", "right"), ("a:lnT", "top"), ("a:lnB", "bottom")] {
                    if let Some(line) = properties.child(line) {
                        border_style(line, side, attrs);
                    }
                }
                fill_style(properties, "background-color", attrs);
            },
            _ => {},
        }
    }
}

fn transform_style(xfrm: DocumentCursor<'_>, attrs: &mut HtmlAttributes) {
    if let Some(offset) = xfrm.child("a:off") {
        attrs.push_style("position", "absolute");
        for (source, property) in [("x", "left"), ("y", "top")] {
            if let Some(value) = offset.attribute(source).and_then(emu_inches) {
                attrs.push_style(property, &value);
            }
        }
    }
    if let Some(extent) = xfrm.child("a:ext") {
        for (source, property) in [("cx", "width"), ("cy", "height")] {
            if let Some(value) = extent.attribute(source).and_then(emu_inches) {
                attrs.push_style(property, &value);
            }
        }
    }
}

fn solid_color(properties: DocumentCursor<'_>) -> Option<&str> {
    properties.path(&["a:solidFill", "a:srgbClr"])?.attribute("val")
}

fn fill_style(properties: DocumentCursor<'_>, property: &str, attrs: &mut HtmlAttributes) {
    if let Some(color) = solid_color(properties) {
        attrs.push_style(property, &format!("#{}", color));
    }
}

fn border_style(line: DocumentCursor<'_>, side: &str, attrs: &mut HtmlAttributes) {
    let width = line
        .attribute("w")
        .and_then(|w| length(w, EMUS_PER_POINT, "pt"))
        .unwrap_or_else(|| "1pt".to_string());
    match solid_color(line) {
        Some(color) => attrs.push_style(&format!("border-{}", side), &format!("{} solid #{}", width, color)),
        None if line.child("a:noFill").is_some() => {},
        None => attrs.push_style(&format!("border-{}", side), &format!("{} solid", width)),
    }
}

// Excel

/// A worksheet's rows as a table. Rows and cells carry their own
/// coordinates; gaps inside the window are filled with empty rows and cells.
fn sheet_data(_: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let mut state = TableState::new(ctx.config);
    if ctx.config.table_limit_by_dimensions
        && let Some(doc) = ooxml(ctx)
        && let Some(worksheet) = cursor.parent()
    {
        let (rows, cols) = doc.sheet_dimensions(worksheet.node_ref());
        state.clamp_to(rows, cols);
    }
    let enclosing = ctx.enter_table(state);
    write_open_tag(
        ctx,
        "table",
        &HtmlAttributes::new()
            .with("border", "0")
            .with("cellspacing", "0")
            .with("cellpadding", "0"),
    );

    for row in cursor.children().filter(|c| c.name() == Some("row")) {
        let next = ctx.table.location.next_row();
        let index = row
            .attribute("r")
            .and_then(|r| r.trim().parse::<u32>().ok())
            .map(|r| r.saturating_sub(1))
            .filter(|&r| r >= next)
            .unwrap_or(next);
        while ctx.table.location.next_row() < index && ctx.table.location.next_row() < ctx.table.row_end {
            if ctx.table.row_visible(ctx.table.location.next_row()) {
                ctx.write("<tr></tr>");
            }
            ctx.table.location.end_row(1);
        }
        if index >= ctx.table.row_end {
            break;
        }
        ctx.table.location.end_row(index - ctx.table.location.next_row());
        if ctx.table.row_visible(index) {
            ctx.write("<tr>");
            sheet_row(row, ctx);
            ctx.write("</tr>");
        }
        ctx.table.location.end_row(1);
    }

    ctx.write("</table>");
    ctx.leave_table(enclosing);
}

fn sheet_row(row: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    ctx.table.location.start_row();
    for cell in row.children().filter(|c| c.name() == Some("c")) {
        let next = ctx.table.location.next_col();
        let col = cell
            .attribute("r")
            .and_then(parse_cell_reference)
            .map(|(c, _)| c)
            .filter(|&c| c >= next)
            .unwrap_or(next);
        while ctx.table.location.next_col() < col && ctx.table.location.next_col() < ctx.table.col_end {
            if ctx.table.col_visible(ctx.table.location.next_col()) {
                ctx.write("<td></td>");
            }
            ctx.table.location.add_cell(1, 1);
        }
        if col >= ctx.table.col_end {
            break;
        }
        ctx.table.location.skip_cells(col - ctx.table.location.next_col(), 1);
        if ctx.table.col_visible(col) {
            ctx.write("<td>");
            let value = cell_value(cell, ctx);
            if !value.is_empty() {
                ctx.write("<p>");
                ctx.write_escaped(&value);
                ctx.write("</p>");
            }
            ctx.write("</td>");
        }
        ctx.table.location.add_cell(1, 1);
    }
}

/// Display text of a cell: shared strings, inline strings, booleans and raw
/// values.
fn cell_value(cell: DocumentCursor<'_>, ctx: &TranslationContext<'_>) -> String {
    let raw = cell.child("v").map(|v| v.text_content()).unwrap_or_default();
    match cell.attribute("t") {
        Some("s") => {
            let shared = raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| ooxml(ctx)?.shared_string(i));
            match shared {
                Some(text) => text.to_string(),
                None => {
                    log::warn!("unknown shared string {:?}", raw);
                    String::new()
                },
            }
        },
        Some("inlineStr") => cell.child("is").map(|is| is.text_content()).unwrap_or_default(),
        Some("b") => match raw.trim() {
            "1" => "TRUE".to_string(),
            "0" => "FALSE".to_string(),
            other => other.to_string(),
        },
        Some("str") | Some("e") => raw,
        _ => match raw.trim().parse::<f64>() {
            Ok(number) if raw.contains(['.', 'E', 'e']) => format_number(number),
            _ => raw,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ooxml::fixture::{docx, pptx, xlsx};
    use crate::file::DecodedFile;
    use crate::html::{HtmlConfig, translate};

    fn body(data: Vec<u8>, config: &HtmlConfig) -> String {
        let file = DecodedFile::open_bytes(data, None).unwrap();
        translate(file.document_file().unwrap(), config).unwrap().body
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.123456), "0.1235");
        assert_eq!(format_number(-0.00001), "0");
        assert_eq!(emu_inches("914400").as_deref(), Some("1in"));
        assert_eq!(emu_inches("457200").as_deref(), Some("0.5in"));
        assert_eq!(emu_inches("x"), None);
    }

    #[test]
    fn test_word_text() {
        let html = body(
            docx(concat!(
                r#"<w:p><w:pPr><w:jc w:val="center"/><w:ind w:left="720"/></w:pPr>"#,
                r#"<w:r><w:rPr><w:b/><w:i w:val="0"/><w:sz w:val="24"/><w:color w:val="FF0000"/></w:rPr><w:t>Bold &amp; red</w:t></w:r>"#,
                r#"<w:r><w:tab/><w:t>x</w:t><w:br/></w:r></w:p>"#,
                "<w:p><w:pPr/></w:p>",
                r#"<w:p><w:hyperlink r:id="rId5"><w:r><w:t>site</w:t></w:r></w:hyperlink><w:hyperlink w:anchor="top"><w:r><w:t>up</w:t></w:r></w:hyperlink><w:bookmarkStart w:id="0" w:name="top"/><w:bookmarkEnd w:id="0"/></w:p>"#,
                r#"<w:sectPr><w:pgSz w:w="12240"/></w:sectPr>"#
            )),
            &HtmlConfig::default(),
        );
        assert!(html.starts_with(r#"<p style="text-align:center;margin-left:36pt;"><span style="font-weight:bold;font-size:12pt;color:#FF0000;">Bold &amp; red</span>"#));
        assert!(html.contains("<span><span class=\"whitespace\">\t</span>x<br></span>"));
        assert!(html.contains("<p><br></p>"));
        assert!(html.contains(r#"<a href="https://example.com"><span>site</span></a>"#));
        assert!(html.contains(r##"<a target="_self" href="#top"><span>up</span></a><a id="top"></a>"##));
        assert!(!html.contains("12240"));
    }

    #[test]
    fn test_word_text_in_edit_mode() {
        let file = DecodedFile::open_bytes(
            docx("<w:p><w:r><w:t>one</w:t></w:r><w:r><w:t>two</w:t></w:r></w:p>"),
            None,
        )
        .unwrap();
        let document_file = file.document_file().unwrap();
        let output = translate(document_file, &HtmlConfig::new().with_editable(true)).unwrap();
        assert!(output.editable);
        assert_eq!(output.journal.len(), 2);
        assert_eq!(
            output.body,
            concat!(
                r#"<p><span><span contenteditable="true" data-odr-cid="0">one</span></span>"#,
                r#"<span><span contenteditable="true" data-odr-cid="1">two</span></span></p>"#
            )
        );

        let document = document_file.document().unwrap();
        let texts: Vec<String> = output
            .journal
            .iter()
            .map(|(_, node)| document.tree().text(node).unwrap_or_default().to_string())
            .collect();
        assert_eq!(texts, ["one", "two"]);
        // journaled, but only OpenDocument files can be saved back
        assert!(!document_file.editable());
    }

    #[test]
    fn test_word_table_and_picture() {
        let html = body(
            docx(concat!(
                r#"<w:tbl><w:tblPr/><w:tblGrid><w:gridCol w:w="100"/></w:tblGrid>"#,
                r#"<w:tr><w:tc><w:tcPr><w:gridSpan w:val="2"/><w:shd w:fill="00FF00"/></w:tcPr><w:p><w:r><w:t>wide</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
                r#"<w:p><w:r><w:drawing><wp:inline><wp:docPr id="1" name="Picture 1"/><a:graphic><a:graphicData>"#,
                r#"<pic:pic><pic:nvPicPr/><pic:blipFill><a:blip r:embed="rId6"/></pic:blipFill></pic:pic>"#,
                r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
            )),
            &HtmlConfig::default(),
        );
        assert!(html.starts_with(r#"<table border="0" cellspacing="0" cellpadding="0"><tr><td colspan="2" style="background-color:#00FF00;"><p><span>wide</span></p></td></tr></table>"#));
        assert!(html.contains(r#"alt="Error: image not found or unsupported: word/media/image1.png" src="data:image/png;base64,"#));
    }

    #[test]
    fn test_presentation_slides() {
        let data = pptx(&[
            concat!(
                "<p:spTree><p:nvGrpSpPr/><p:grpSpPr/>",
                r#"<p:sp><p:nvSpPr/><p:spPr><a:xfrm><a:off x="914400" y="0"/><a:ext cx="1828800" cy="457200"/></a:xfrm></p:spPr>"#,
                r#"<p:txBody><a:bodyPr/><a:p><a:pPr algn="ctr"/><a:r><a:rPr sz="2400" b="1"><a:solidFill><a:srgbClr val="112233"/></a:solidFill></a:rPr><a:t>Title</a:t></a:r></a:p>"#,
                r#"<a:p><a:endParaRPr/></a:p></p:txBody></p:sp>"#,
                r#"<p:pic><p:nvPicPr/><p:blipFill><a:blip r:embed="rId1"/></p:blipFill><p:spPr/></p:pic>"#,
                "</p:spTree>"
            ),
            "<p:spTree><p:sp><p:txBody><a:p><a:r><a:t>second</a:t></a:r></a:p></p:txBody></p:sp></p:spTree>",
        ]);
        let html = body(data.clone(), &HtmlConfig::default());
        assert_eq!(html.matches(r#"<div class="slide" style="width:10in;height:7.5in;">"#).count(), 2);
        assert!(html.contains(r#"<div style="position:absolute;left:1in;top:0in;width:2in;height:0.5in;">"#));
        assert!(html.contains(r#"<p style="text-align:center;"><span style="font-size:24pt;font-weight:bold;color:#112233;">Title</span></p><p><br></p>"#));
        assert!(html.contains(r#"src="data:image/png;base64,"#));
        assert!(html.contains("second"));

        let html = body(data, &HtmlConfig::new().with_entry_window(1, Some(1)));
        assert_eq!(html.matches(r#"class="slide""#).count(), 1);
        assert!(!html.contains("Title"));
        assert!(html.contains("second"));
    }

    #[test]
    fn test_presentation_table() {
        let html = body(
            pptx(&[concat!(
                r#"<p:spTree><p:graphicFrame><p:xfrm><a:off x="0" y="0"/><a:ext cx="914400" cy="914400"/></p:xfrm>"#,
                r#"<a:graphic><a:graphicData><a:tbl><a:tblPr/><a:tblGrid><a:gridCol w="914400"/></a:tblGrid>"#,
                r#"<a:tr h="457200"><a:tc gridSpan="2"><a:txBody><a:p><a:r><a:t>c</a:t></a:r></a:p></a:txBody>"#,
                r#"<a:tcPr><a:lnL w="12700"><a:solidFill><a:srgbClr val="000000"/></a:solidFill></a:lnL>"#,
                r#"<a:solidFill><a:srgbClr val="FFFFFF"/></a:solidFill></a:tcPr></a:tc><a:tc hMerge="1"/></a:tr>"#,
                "</a:tbl></a:graphicData></a:graphic></p:graphicFrame></p:spTree>"
            )]),
            &HtmlConfig::default(),
        );
        assert!(html.contains(r#"<table border="0" cellspacing="0" cellpadding="0"><colgroup><col style="width:1in;"></colgroup>"#));
        assert!(html.contains(r#"<tr style="height:0.5in;"><td colspan="2" style="border-left:1pt solid #000000;background-color:#FFFFFF;"><p><span>c</span></p></td></tr>"#));
    }

    #[test]
    fn test_workbook_cells() {
        let data = xlsx(
            &[
                (
                    "First",
                    concat!(
                        r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1"><v>2.50</v></c></row>"#,
                        r#"<row r="3"><c r="B3" t="inlineStr"><is><t>a&lt;b</t></is></c><c r="C3" t="b"><v>1</v></c></row>"#
                    ),
                ),
                ("Second", r#"<row r="1"><c r="A1"><v>42</v></c></row>"#),
            ],
            &["shared"],
        );
        let html = body(data.clone(), &HtmlConfig::default());
        assert!(html.contains(concat!(
            r#"<table border="0" cellspacing="0" cellpadding="0">"#,
            "<tr><td><p>shared</p></td><td></td><td><p>2.5</p></td></tr>",
            "<tr></tr>",
            "<tr><td></td><td><p>a&lt;b</p></td><td><p>TRUE</p></td></tr>",
            "</table>"
        )));
        assert!(html.contains("<td><p>42</p></td>"));

        let html = body(data, &HtmlConfig::new().with_table_offset(2, 1).with_table_limit(1, 1));
        assert!(html.contains("<tr><td><p>a&lt;b</p></td></tr>"));
        assert!(!html.contains("shared"));

        let data = xlsx(&[("S", r#"<row r="1"><c r="A1"><v>1</v></c></row>"#), ("T", "")], &[]);
        let html = body(data, &HtmlConfig::new().with_entry_window(1, None));
        assert!(!html.contains("<p>1</p>"));
        assert!(html.contains("<table border=\"0\" cellspacing=\"0\" cellpadding=\"0\"></table>"));
    }
}
