// Image conversion
//
// Legacy vector metafiles embedded in documents are converted to SVG so
// browsers can display them. Raster images pass through unchanged.

pub mod svg_utils;
pub mod svm;

use crate::common::Result;
use crate::file::FileType;

/// Pure metafile-to-SVG conversion.
pub trait MetafileConverter {
    /// Whether `data` looks like this converter's format.
    fn can_convert(&self, data: &[u8]) -> bool;

    fn convert_to_svg(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Best-effort MIME type of embedded image bytes.
pub fn sniff_mime_type(data: &[u8]) -> &'static str {
    match crate::file::detect(data, None) {
        FileType::Unknown => "application/octet-stream",
        file_type => file_type.mime_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::svm::SvmConverter;

    #[test]
    fn test_sniff_mime_type() {
        assert_eq!(sniff_mime_type(b"\x89PNG\r\n\x1a\n"), "image/png");
        assert_eq!(sniff_mime_type(b"\xFF\xD8\xFF\xE1"), "image/jpeg");
        assert_eq!(sniff_mime_type(b"???"), "application/octet-stream");
    }

    #[test]
    fn test_converter_dispatch() {
        let converter = SvmConverter;
        assert!(converter.can_convert(b"VCLMTF...."));
        assert!(!converter.can_convert(b"GIF89a"));
        assert!(converter.convert_to_svg(b"VCLMTF").is_err());
    }
}
