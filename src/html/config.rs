/// Configuration for HTML translation.
///
/// Table windowing selects which part of large tables is rendered: rows and
/// columns before the offset are skipped, at most `limit` of each are
/// emitted. Entry windowing does the same for sheets and slides.
///
/// # Examples
///
/// ```rust
/// use odr::html::HtmlConfig;
///
/// let config = HtmlConfig::new()
///     .with_editable(true)
///     .with_table_offset(2, 1)
///     .with_table_limit(3, 2);
/// assert_eq!(config.table_offset_rows, 2);
/// ```
use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Wrap every text node in a `contenteditable` span and journal it
    pub editable: bool,
    /// First sheet or slide to render
    pub entry_offset: u32,
    /// Maximum number of sheets or slides, unlimited if `None`
    pub entry_limit: Option<u32>,
    pub table_offset_rows: u32,
    pub table_offset_cols: u32,
    pub table_limit_rows: u32,
    pub table_limit_cols: u32,
    /// Clamp the table window to the cells a sheet actually uses
    pub table_limit_by_dimensions: bool,
    /// Embed referenced images as data URIs
    pub embed_images: bool,
    /// File name of the main page written by [`convert`](super::convert)
    pub output_file_name: String,
    pub legacy: LegacyConfig,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            editable: false,
            entry_offset: 0,
            entry_limit: None,
            table_offset_rows: 0,
            table_offset_cols: 0,
            table_limit_rows: 10000,
            table_limit_cols: 500,
            table_limit_by_dimensions: true,
            embed_images: true,
            output_file_name: "document.html".to_string(),
            legacy: LegacyConfig::default(),
        }
    }
}

impl HtmlConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML configuration; missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| Error::Config(format!("invalid HTML config: {}", e)))
    }

    #[inline]
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    #[inline]
    pub fn with_entry_window(mut self, offset: u32, limit: Option<u32>) -> Self {
        self.entry_offset = offset;
        self.entry_limit = limit;
        self
    }

    #[inline]
    pub fn with_table_offset(mut self, rows: u32, cols: u32) -> Self {
        self.table_offset_rows = rows;
        self.table_offset_cols = cols;
        self
    }

    #[inline]
    pub fn with_table_limit(mut self, rows: u32, cols: u32) -> Self {
        self.table_limit_rows = rows;
        self.table_limit_cols = cols;
        self
    }

    #[inline]
    pub fn with_table_limit_by_dimensions(mut self, enabled: bool) -> Self {
        self.table_limit_by_dimensions = enabled;
        self
    }

    #[inline]
    pub fn with_embed_images(mut self, embed: bool) -> Self {
        self.embed_images = embed;
        self
    }

    #[inline]
    pub fn with_output_file_name(mut self, name: impl Into<String>) -> Self {
        self.output_file_name = name.into();
        self
    }

    /// Whether the `index`-th sheet or slide falls inside the entry window.
    pub fn entry_in_window(&self, index: u32) -> bool {
        index >= self.entry_offset
            && self
                .entry_limit
                .is_none_or(|limit| index - self.entry_offset < limit)
    }
}

/// External converter programs for formats without a parsed model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    /// Legacy Word converter
    pub wv_ware: String,
    /// PDF converter
    pub pdf2htmlex: String,
    /// Extra arguments appended before the input file
    pub pdf2htmlex_args: Vec<String>,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            wv_ware: "wvWare".to_string(),
            pdf2htmlex: "pdf2htmlEX".to_string(),
            pdf2htmlex_args: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = HtmlConfig::new()
            .with_editable(true)
            .with_table_offset(2, 1)
            .with_table_limit(3, 2)
            .with_table_limit_by_dimensions(false)
            .with_output_file_name("index.html");
        assert!(config.editable);
        assert_eq!((config.table_offset_rows, config.table_offset_cols), (2, 1));
        assert_eq!((config.table_limit_rows, config.table_limit_cols), (3, 2));
        assert!(!config.table_limit_by_dimensions);
        assert_eq!(config.output_file_name, "index.html");
    }

    #[test]
    fn test_defaults() {
        let config = HtmlConfig::default();
        assert!(!config.editable);
        assert_eq!(config.table_limit_rows, 10000);
        assert_eq!(config.table_limit_cols, 500);
        assert!(config.table_limit_by_dimensions);
        assert_eq!(config.legacy.wv_ware, "wvWare");
    }

    #[test]
    fn test_entry_window() {
        let config = HtmlConfig::new().with_entry_window(1, Some(2));
        let selected: Vec<u32> = (0..5).filter(|&i| config.entry_in_window(i)).collect();
        assert_eq!(selected, vec![1, 2]);
        assert!(HtmlConfig::new().entry_in_window(1000));
    }

    #[test]
    fn test_from_yaml() {
        let config = HtmlConfig::from_yaml("editable: true\ntable_limit_rows: 50\nlegacy:\n  wv_ware: /opt/wv/bin/wvWare\n").unwrap();
        assert!(config.editable);
        assert_eq!(config.table_limit_rows, 50);
        assert_eq!(config.table_limit_cols, 500);
        assert_eq!(config.legacy.wv_ware, "/opt/wv/bin/wvWare");
        assert_eq!(config.legacy.pdf2htmlex, "pdf2htmlEX");

        assert!(matches!(HtmlConfig::from_yaml("editable: [1, 2"), Err(Error::Config(_))));
    }
}
