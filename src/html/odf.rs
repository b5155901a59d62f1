//! OpenDocument content to HTML.

use super::context::{HtmlAttributes, TableState, TranslationContext};
use super::image::{embed_base64, embed_from_storage, missing_image_alt};
use super::translator::{AttributeHandler, ElementHandler, Translator, close_tag, write_open_tag};
use crate::common::Path;
use crate::common::xml::Attribute;
use crate::document::{Document, DocumentCursor};
use crate::file::DocumentType;
use once_cell::sync::Lazy;

use ElementHandler::{Custom, Ignore, Wrap};

const STYLE_ATTRIBUTES: [&str; 5] = [
    "text:style-name",
    "table:style-name",
    "draw:style-name",
    "draw:text-style-name",
    "presentation:style-name",
];

pub static TRANSLATOR: Lazy<Translator> = Lazy::new(|| {
    let mut translator = Translator::new()
        .elements(
            &[
                "office:scripts",
                "office:font-face-decls",
                "office:automatic-styles",
                "office:styles",
                "office:master-styles",
                "office:settings",
                "office:meta",
                "office:forms",
                "office:annotation",
                "text:tracked-changes",
                "text:sequence-decls",
                "table:covered-table-cell",
                "svg:desc",
                "svg:title",
                "presentation:notes",
                "office:binary-data",
            ],
            Ignore,
        )
        .elements(&["text:p", "text:h"], Custom(paragraph))
        .element("text:span", Wrap("span"))
        .element("text:s", Custom(spaces))
        .element("text:tab", Custom(tab))
        .element("text:line-break", Custom(line_break))
        .element("text:a", Custom(link))
        .element("text:list", Wrap("ul"))
        .element("text:list-item", Wrap("li"))
        .elements(&["text:bookmark", "text:bookmark-start"], Custom(bookmark))
        .element("table:table", Custom(table))
        .element("table:table-column", Custom(table_column))
        .element("table:table-row", Custom(table_row))
        .element("table:table-cell", Custom(table_cell))
        .element("draw:page", Custom(page))
        .elements(&["draw:frame", "draw:custom-shape", "draw:rect", "draw:ellipse"], Custom(frame))
        .element("draw:image", Custom(image))
        .attribute("table:number-columns-spanned", AttributeHandler::Rename("colspan"))
        .attribute("table:number-rows-spanned", AttributeHandler::Rename("rowspan"));
    for name in STYLE_ATTRIBUTES {
        translator = translator.attribute(name, AttributeHandler::Custom(style_class));
    }
    translator
});

/// `class` from a style reference. Unknown styles are logged and dropped.
fn style_class(attribute: &Attribute, ctx: &mut TranslationContext<'_>, attrs: &mut HtmlAttributes) {
    match ctx.styles.classes(&attribute.value) {
        Some(classes) => attrs.push("class", classes),
        None => log::warn!("unknown style {:?} referenced by {}", attribute.value, attribute.name),
    }
}

fn paragraph(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    tr.open_tag("p", cursor, ctx, HtmlAttributes::new());
    if cursor.first_child().is_none() {
        ctx.write("<br>");
    } else {
        tr.translate_children(cursor, ctx);
    }
    close_tag(ctx, "p");
}

fn spaces(_: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let count = cursor.count_attribute("text:c", 1) as usize;
    ctx.write(r#"<span class="whitespace">"#);
    ctx.write(&" ".repeat(count));
    ctx.write("</span>");
}

fn tab(_: &Translator, _: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    ctx.write("<span class=\"whitespace\">\t</span>");
}

fn line_break(_: &Translator, _: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    ctx.write("<br>");
}

fn link(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let mut attrs = HtmlAttributes::new();
    match cursor.attribute("xlink:href") {
        Some(href) => {
            if href.starts_with('#') {
                attrs.push("target", "_self");
            }
            attrs.push("href", href);
        },
        None => log::warn!("empty link"),
    }
    tr.wrap("a", cursor, ctx, attrs);
}

fn bookmark(_: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let Some(name) = cursor.attribute("text:name") else {
        log::warn!("bookmark without a name");
        return;
    };
    write_open_tag(ctx, "a", &HtmlAttributes::new().with("id", name));
    close_tag(ctx, "a");
}

/// Whether `cursor` is a sheet or a page rather than an element nested in one.
fn is_entry(cursor: DocumentCursor<'_>) -> bool {
    cursor
        .parent()
        .and_then(|p| p.name())
        .is_some_and(|n| matches!(n, "office:spreadsheet" | "office:presentation" | "office:drawing"))
}

fn table(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let entry = is_entry(cursor);
    if entry && !ctx.enter_entry() {
        return;
    }

    let mut state = TableState::new(ctx.config);
    if entry
        && ctx.config.table_limit_by_dimensions
        && let Document::Odf(odf) = ctx.document
        && odf.document_type() == DocumentType::Spreadsheet
    {
        let (rows, cols) = odf.table_dimensions(cursor.node_ref().node);
        state.clamp_to(rows, cols);
    }

    let enclosing = ctx.enter_table(state);
    let attrs = HtmlAttributes::new()
        .with("border", "0")
        .with("cellspacing", "0")
        .with("cellpadding", "0");
    tr.wrap("table", cursor, ctx, attrs);
    ctx.leave_table(enclosing);
}

fn table_column(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let repeat = cursor.count_attribute("table:number-columns-repeated", 1);
    let default_style = cursor.attribute("table:default-cell-style-name");
    for _ in 0..repeat {
        let col = ctx.table.location.next_col();
        if col >= ctx.table.col_end {
            break;
        }
        if col >= ctx.table.col_start {
            tr.open_tag("col", cursor, ctx, HtmlAttributes::new());
        }
        if let Some(style) = default_style {
            ctx.table.default_cell_styles.insert(col, style.to_string());
        }
        ctx.table.location.add_col(1);
    }
}

fn table_row(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let repeat = cursor.count_attribute("table:number-rows-repeated", 1);
    for _ in 0..repeat {
        let row = ctx.table.location.next_row();
        if row >= ctx.table.row_end {
            break;
        }
        ctx.table.location.start_row();
        if row >= ctx.table.row_start {
            tr.wrap("tr", cursor, ctx, HtmlAttributes::new());
        } else {
            skip_row_cells(cursor, ctx);
        }
        ctx.table.location.end_row(1);
    }
}

/// Position bookkeeping for a row above the window, so row spans reaching
/// into the window still reserve their columns.
fn skip_row_cells(row: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    for cell in row.children().filter(|c| c.name() == Some("table:table-cell")) {
        let repeat = cell.count_attribute("table:number-columns-repeated", 1);
        let colspan = cell.count_attribute("table:number-columns-spanned", 1);
        let rowspan = cell.count_attribute("table:number-rows-spanned", 1);
        if ctx.table.location.next_col() >= ctx.table.col_end {
            break;
        }
        for _ in 0..repeat.min(ctx.table.col_end) {
            ctx.table.location.add_cell(colspan, rowspan);
        }
    }
}

fn table_cell(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let repeat = cursor.count_attribute("table:number-columns-repeated", 1);
    let colspan = cursor.count_attribute("table:number-columns-spanned", 1);
    let rowspan = cursor.count_attribute("table:number-rows-spanned", 1);
    let has_style = cursor.attribute("table:style-name").is_some();
    for i in 0..repeat {
        let col = ctx.table.location.next_col();
        if col >= ctx.table.col_end {
            ctx.table.location.skip_cells(repeat - i, colspan);
            break;
        }
        if col >= ctx.table.col_start {
            let mut attrs = HtmlAttributes::new();
            if !has_style && let Some(style) = ctx.table.default_cell_styles.get(&col).cloned() {
                tr.translate_attribute(&Attribute::new("table:style-name", style), ctx, &mut attrs);
            }
            tr.wrap("td", cursor, ctx, attrs);
        }
        ctx.table.location.add_cell(colspan, rowspan);
    }
}

fn page(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    if !ctx.enter_entry() {
        return;
    }
    tr.wrap("div", cursor, ctx, HtmlAttributes::new().with("class", "slide"));
}

fn frame(tr: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let mut attrs = HtmlAttributes::new();
    if cursor.parent().and_then(|p| p.name()) == Some("draw:page") {
        attrs.push_style("position", "absolute");
    }
    for (source, property) in [
        ("svg:width", "width"),
        ("svg:height", "height"),
        ("svg:x", "left"),
        ("svg:y", "top"),
    ] {
        if let Some(value) = cursor.attribute(source) {
            attrs.push_style(property, value);
        }
    }
    tr.wrap("div", cursor, ctx, attrs);
}

fn image(_: &Translator, cursor: DocumentCursor<'_>, ctx: &mut TranslationContext<'_>) {
    let href = cursor.attribute("xlink:href").unwrap_or_default();
    let mut attrs = HtmlAttributes::new()
        .with("style", "width:100%;height:100%")
        .with("alt", missing_image_alt(href));

    let src = if let Some(data) = cursor.child("office:binary-data") {
        embed_base64(&data.text_content())
    } else if href.is_empty() {
        log::warn!("image without a reference");
        None
    } else if is_external(href) || !ctx.config.embed_images {
        Some(href.to_string())
    } else {
        embed_from_storage(ctx.storage, &Path::new(href))
    };
    if let Some(src) = src {
        attrs.push("src", src);
    }
    write_open_tag(ctx, "img", &attrs);
}

fn is_external(href: &str) -> bool {
    href.contains("://") || href.starts_with("data:")
}
