/// Mutable state of one translation run.
///
/// The context owns the output buffer, the edit journal and the bookkeeping
/// of the table currently being translated. Handlers never fail; anything
/// they cannot render is logged and skipped.
use super::config::HtmlConfig;
use super::style::StyleRegistry;
use crate::access::ReadStorage;
use crate::common::xml::{escape_attribute, escape_text};
use crate::document::{Document, DocumentCursor, EditJournal};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as FmtWrite;

pub struct TranslationContext<'a> {
    pub config: &'a HtmlConfig,
    pub document: &'a Document,
    pub storage: &'a dyn ReadStorage,
    pub styles: &'a StyleRegistry,
    pub table: TableState,
    editable: bool,
    out: String,
    journal: EditJournal,
    next_entry: u32,
}

impl<'a> TranslationContext<'a> {
    pub fn new(
        config: &'a HtmlConfig,
        document: &'a Document,
        storage: &'a dyn ReadStorage,
        styles: &'a StyleRegistry,
    ) -> Self {
        Self {
            config,
            document,
            storage,
            styles,
            table: TableState::new(config),
            editable: config.editable,
            out: String::with_capacity(8192),
            journal: EditJournal::new(),
            next_entry: 0,
        }
    }

    #[inline]
    pub fn editable(&self) -> bool {
        self.editable
    }

    #[inline]
    pub fn write(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Write character data, escaped.
    #[inline]
    pub fn write_escaped(&mut self, s: &str) {
        self.out.push_str(&escape_text(s));
    }

    /// Emit a text node of the document.
    ///
    /// In edit mode the text is wrapped in an editable span whose
    /// `data-odr-cid` is the journal id of the node.
    pub fn text(&mut self, cursor: DocumentCursor<'_>) {
        let Some(text) = cursor.text() else {
            return;
        };
        if self.editable {
            let id = self.journal.record(cursor.node_ref());
            let _ = write!(self.out, r#"<span contenteditable="true" data-odr-cid="{}">"#, id);
            self.write_escaped(text);
            self.out.push_str("</span>");
        } else {
            self.write_escaped(text);
        }
    }

    /// Claim the next sheet or slide; `false` if it is outside the entry
    /// window and must not be rendered.
    pub fn enter_entry(&mut self) -> bool {
        let index = self.next_entry;
        self.next_entry += 1;
        self.config.entry_in_window(index)
    }

    /// Start a table, returning the state of the enclosing one.
    pub fn enter_table(&mut self, state: TableState) -> TableState {
        std::mem::replace(&mut self.table, state)
    }

    pub fn leave_table(&mut self, enclosing: TableState) {
        self.table = enclosing;
    }

    pub fn finish(self) -> (String, EditJournal) {
        (self.out, self.journal)
    }
}

/// HTML attributes collected for one opening tag.
///
/// `class` and `style` accumulate: several source attributes may each
/// contribute classes or declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlAttributes {
    entries: Vec<(&'static str, String)>,
}

impl HtmlAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) if name == "class" => {
                existing.push(' ');
                existing.push_str(&value);
            },
            Some((_, existing)) if name == "style" => existing.push_str(&value),
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Append one CSS declaration to `style`.
    pub fn push_style(&mut self, property: &str, value: &str) {
        self.push("style", format!("{}:{};", property, value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn write_to(&self, out: &mut String) {
        for (name, value) in &self.entries {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
    }
}

/// Visible window and position tracking of the table being translated.
#[derive(Debug, Clone, Default)]
pub struct TableState {
    pub row_start: u32,
    pub row_end: u32,
    pub col_start: u32,
    pub col_end: u32,
    pub location: TableLocation,
    /// Column -> style name applied to cells without their own style
    pub default_cell_styles: HashMap<u32, String>,
}

impl TableState {
    /// Window from the configured offsets and limits.
    pub fn new(config: &HtmlConfig) -> Self {
        Self {
            row_start: config.table_offset_rows,
            row_end: config.table_offset_rows.saturating_add(config.table_limit_rows),
            col_start: config.table_offset_cols,
            col_end: config.table_offset_cols.saturating_add(config.table_limit_cols),
            ..Self::default()
        }
    }

    /// Tighten the window to a table with `rows` rows and `cols` columns.
    pub fn clamp_to(&mut self, rows: u32, cols: u32) {
        self.row_end = self.row_end.min(rows);
        self.col_end = self.col_end.min(cols);
    }

    #[inline]
    pub fn row_visible(&self, row: u32) -> bool {
        row >= self.row_start && row < self.row_end
    }

    #[inline]
    pub fn col_visible(&self, col: u32) -> bool {
        col >= self.col_start && col < self.col_end
    }
}

/// Absolute position of the next row and cell.
///
/// Every repetition advances the position, visible or not. Cells spanning
/// several rows reserve their columns in the rows below so the cells that
/// follow land in the right column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableLocation {
    next_row: u32,
    next_col: u32,
    /// First column of a row span -> (first row after the span, width)
    spans: BTreeMap<u32, (u32, u32)>,
}

impl TableLocation {
    #[inline]
    pub fn next_row(&self) -> u32 {
        self.next_row
    }

    #[inline]
    pub fn next_col(&self) -> u32 {
        self.next_col
    }

    /// Account for `repeat` column definitions.
    pub fn add_col(&mut self, repeat: u32) {
        self.next_col = self.next_col.saturating_add(repeat);
    }

    /// Rewind to the first free column of the current row.
    pub fn start_row(&mut self) {
        self.next_col = 0;
        self.skip_covered();
    }

    /// Move past `repeat` rows.
    pub fn end_row(&mut self, repeat: u32) {
        self.next_row = self.next_row.saturating_add(repeat);
        self.next_col = 0;
        let row = self.next_row;
        self.spans.retain(|_, (until, _)| *until > row);
    }

    /// Account for one cell covering `colspan` columns and `rowspan` rows.
    pub fn add_cell(&mut self, colspan: u32, rowspan: u32) {
        let colspan = colspan.max(1);
        if rowspan > 1 {
            self.spans
                .insert(self.next_col, (self.next_row.saturating_add(rowspan), colspan));
        }
        self.next_col = self.next_col.saturating_add(colspan);
        self.skip_covered();
    }

    /// Advance past `count` cells outside the window without tracking their
    /// spans.
    pub fn skip_cells(&mut self, count: u32, colspan: u32) {
        self.next_col = self
            .next_col
            .saturating_add(count.saturating_mul(colspan.max(1)));
    }

    fn skip_covered(&mut self) {
        while let Some(&(until, width)) = self.spans.get(&self.next_col) {
            if until <= self.next_row {
                break;
            }
            self.next_col = self.next_col.saturating_add(width);
        }
    }
}
