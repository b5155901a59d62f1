/// Embedding of referenced images as data URIs.
use crate::access::ReadStorage;
use crate::common::Path;
use crate::images::svm::SvmConverter;
use crate::images::{MetafileConverter, sniff_mime_type};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Placeholder text shown when an image cannot be embedded.
pub fn missing_image_alt(path: &str) -> String {
    format!("Error: image not found or unsupported: {}", path)
}

pub fn data_uri(mime: &str, data: &[u8]) -> String {
    let mut uri = String::with_capacity(data.len() * 4 / 3 + mime.len() + 16);
    uri.push_str("data:");
    uri.push_str(mime);
    uri.push_str(";base64,");
    STANDARD.encode_string(data, &mut uri);
    uri
}

/// Data URI for image bytes. StarView metafiles, recognised by name or by
/// magic, are converted to SVG first; `None` if that conversion fails.
pub fn embed_bytes(name: &str, data: &[u8]) -> Option<String> {
    let converter = SvmConverter;
    let is_metafile = name.contains("ObjectReplacements") || name.ends_with(".svm") || converter.can_convert(data);
    if !is_metafile {
        return Some(data_uri(sniff_mime_type(data), data));
    }
    match converter.convert_to_svg(data) {
        Ok(svg) => Some(data_uri("image/svg+xml", &svg)),
        Err(e) => {
            log::warn!("cannot convert metafile {}: {}", name, e);
            None
        },
    }
}

/// Data URI for an image stored at `path`; `None` if the image is missing or
/// cannot be converted.
pub fn embed_from_storage(storage: &dyn ReadStorage, path: &Path) -> Option<String> {
    if !storage.is_file(path) {
        log::warn!("image not found: {}", path);
        return None;
    }
    match storage.read_to_vec(path) {
        Ok(data) => embed_bytes(&path.to_string(), &data),
        Err(e) => {
            log::warn!("cannot read image {}: {}", path, e);
            None
        },
    }
}

/// Data URI for base64 image data inlined in a flat document.
pub fn embed_base64(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    match STANDARD.decode(compact.as_bytes()) {
        Ok(data) => embed_bytes("", &data),
        Err(e) => {
            log::warn!("invalid inline image data: {}", e);
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::ZipStorage;
    use crate::access::zip::fixture::zip_bytes;
    use crate::images::svm::parser::fixture::{SvmWriter, ints};

    #[test]
    fn test_data_uri() {
        assert_eq!(data_uri("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_embed_raster_and_metafile() {
        let png = b"\x89PNG\r\n\x1a\nrest";
        assert!(embed_bytes("Pictures/a.png", png).unwrap().starts_with("data:image/png;base64,"));

        let svm = SvmWriter::new(10, 10).action(103, ints(&[0, 0, 10, 10])).build();
        let uri = embed_bytes("ObjectReplacements/Object 1", &svm).unwrap();
        assert!(uri.starts_with("data:image/svg+xml;base64,"));
        let svg = STANDARD.decode(&uri["data:image/svg+xml;base64,".len()..]).unwrap();
        assert!(String::from_utf8(svg).unwrap().contains("<svg"));

        assert_eq!(embed_bytes("ObjectReplacements/Object 2", b"not a metafile"), None);
    }

    #[test]
    fn test_embed_from_storage() {
        let storage = ZipStorage::open(zip_bytes(&[("Pictures/a.gif", b"GIF89a....")])).unwrap();
        let uri = embed_from_storage(&storage, &Path::new("Pictures/a.gif")).unwrap();
        assert!(uri.starts_with("data:image/gif;base64,"));
        assert_eq!(embed_from_storage(&storage, &Path::new("Pictures/missing.png")), None);
    }

    #[test]
    fn test_embed_base64() {
        let encoded = STANDARD.encode(b"\x89PNG\r\n\x1a\nx");
        let wrapped = format!("{}\n  {}", &encoded[..4], &encoded[4..]);
        assert!(embed_base64(&wrapped).unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(embed_base64("@@@"), None);
    }
}
