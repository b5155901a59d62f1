// StarView Metafile (SVM) support
//
// SVM is the native vector metafile of StarOffice/LibreOffice and shows up
// as embedded previews and pictures inside OpenDocument packages. Only
// uncompressed metafiles are read.

pub mod parser;
pub mod svg_converter;

pub use parser::{SVM_MAGIC, SvmHeader, SvmParser};
pub use svg_converter::SvmSvgConverter;

use super::MetafileConverter;
use crate::common::Result;

/// Convert SVM data to an SVG document.
pub fn convert_svm_to_svg(data: &[u8]) -> Result<Vec<u8>> {
    let parser = SvmParser::new(data)?;
    SvmSvgConverter::new(parser).convert_to_svg_bytes()
}

/// [`MetafileConverter`] for StarView metafiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvmConverter;

impl MetafileConverter for SvmConverter {
    fn can_convert(&self, data: &[u8]) -> bool {
        data.starts_with(SVM_MAGIC)
    }

    fn convert_to_svg(&self, data: &[u8]) -> Result<Vec<u8>> {
        convert_svm_to_svg(data)
    }
}
