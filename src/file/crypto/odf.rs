//! OpenDocument package encryption.
//!
//! Each protected member is deflated and then encrypted with its own key.
//! `META-INF/manifest.xml` records, per member, the cipher and IV, how the
//! start key is hashed from the password, the PBKDF2 salt and iteration
//! count, and a checksum over the first kilobyte of the decrypted (still
//! deflated) stream. A failed checksum is how a wrong password shows.

use crate::access::ReadStorage;
use crate::access::zip::write_archive;
use crate::common::xml::{NodeId, XmlDocument, escape_xml};
use crate::common::{Error, Path, Result};
use aes::Aes256;
use aes::cipher::block_padding::{Iso10126, Pkcs7};
use aes::cipher::{AsyncStreamCipher, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use blowfish::Blowfish;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha1::{Digest, Sha1};
use sha2::Sha256;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Read, Write};

pub const MANIFEST: &str = "META-INF/manifest.xml";

const FILE_ENTRY: &str = "manifest:file-entry";
const ENCRYPTION_DATA: &str = "manifest:encryption-data";

const AES256_CBC: &str = "http://www.w3.org/2001/04/xmlenc#aes256-cbc";
const BLOWFISH_CFB: &str = "Blowfish CFB";
const PBKDF2: &str = "PBKDF2";

const SHA1_NAMES: [&str; 2] = ["SHA1", "http://www.w3.org/2000/09/xmldsig#sha1"];
const SHA256_NAMES: [&str; 3] = [
    "SHA256",
    "http://www.w3.org/2000/09/xmldsig#sha256",
    "http://www.w3.org/2001/04/xmlenc#sha256",
];
const SHA1_1K: [&str; 2] = ["SHA1/1K", "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0#sha1-1k"];
const SHA256_1K: &str = "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0#sha256-1k";

/// Bytes of the decrypted stream covered by the checksum.
const CHECKSUM_LENGTH: usize = 1024;
/// Key size when the manifest does not state one (Blowfish packages)
const DEFAULT_KEY_SIZE: usize = 16;
/// Upper bound for buffers sized from a declared member size.
const MAX_PREALLOCATION: u64 = 1 << 20;

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Aes256Cbc,
    BlowfishCfb,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Aes256Cbc => AES256_CBC,
            Algorithm::BlowfishCfb => BLOWFISH_CFB,
        }
    }

    fn iv_size(self) -> usize {
        match self {
            Algorithm::Aes256Cbc => 16,
            Algorithm::BlowfishCfb => 8,
        }
    }
}

/// Hash used for the start key and for checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestKind {
    Sha1,
    Sha256,
}

impl DigestKind {
    fn from_start_key_name(name: &str) -> Option<Self> {
        if SHA1_NAMES.contains(&name) {
            Some(DigestKind::Sha1)
        } else if SHA256_NAMES.contains(&name) {
            Some(DigestKind::Sha256)
        } else {
            None
        }
    }

    fn from_checksum_name(name: &str) -> Option<Self> {
        if SHA1_1K.contains(&name) {
            Some(DigestKind::Sha1)
        } else if name == SHA256_1K {
            Some(DigestKind::Sha256)
        } else {
            None
        }
    }

    fn start_key_name(self) -> &'static str {
        match self {
            DigestKind::Sha1 => SHA1_NAMES[1],
            DigestKind::Sha256 => SHA256_NAMES[1],
        }
    }

    fn checksum_name(self) -> &'static str {
        match self {
            DigestKind::Sha1 => SHA1_1K[1],
            DigestKind::Sha256 => SHA256_1K,
        }
    }

    fn output_size(self) -> usize {
        match self {
            DigestKind::Sha1 => 20,
            DigestKind::Sha256 => 32,
        }
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestKind::Sha1 => Sha1::digest(data).to_vec(),
            DigestKind::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

/// Encryption parameters of one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionData {
    pub algorithm: Algorithm,
    pub iv: Vec<u8>,
    pub start_key: DigestKind,
    pub key_size: usize,
    pub iterations: u32,
    pub salt: Vec<u8>,
    pub checksum: Option<(DigestKind, Vec<u8>)>,
}

impl EncryptionData {
    fn parse(xml: &XmlDocument, node: NodeId) -> Result<Self> {
        let algorithm_node = required_child(xml, node, "manifest:algorithm")?;
        let algorithm = match xml.attribute(algorithm_node, "manifest:algorithm-name") {
            Some(AES256_CBC) => Algorithm::Aes256Cbc,
            Some(BLOWFISH_CFB) => Algorithm::BlowfishCfb,
            other => {
                return Err(Error::Unsupported(format!(
                    "ODF encryption algorithm {}",
                    other.unwrap_or("(none)")
                )));
            },
        };
        let iv = base64_attribute(xml, algorithm_node, "manifest:initialisation-vector")?;
        if iv.len() != algorithm.iv_size() {
            return Err(Error::ConversionFailure(format!(
                "{}-byte IV for {}",
                iv.len(),
                algorithm.name()
            )));
        }

        let derivation = required_child(xml, node, "manifest:key-derivation")?;
        match xml.attribute(derivation, "manifest:key-derivation-name") {
            Some(PBKDF2) => {},
            other => {
                return Err(Error::Unsupported(format!(
                    "ODF key derivation {}",
                    other.unwrap_or("(none)")
                )));
            },
        }
        let iterations = number_attribute(xml, derivation, "manifest:iteration-count")?
            .ok_or_else(|| Error::ConversionFailure("PBKDF2 without an iteration count".to_string()))?;
        let key_size = number_attribute(xml, derivation, "manifest:key-size")?.unwrap_or(DEFAULT_KEY_SIZE);
        let salt = base64_attribute(xml, derivation, "manifest:salt")?;

        let start_key = match xml.child(node, "manifest:start-key-generation") {
            None => DigestKind::Sha1,
            Some(generation) => {
                let name = xml
                    .attribute(generation, "manifest:start-key-generation-name")
                    .unwrap_or(SHA1_NAMES[0]);
                DigestKind::from_start_key_name(name)
                    .ok_or_else(|| Error::Unsupported(format!("ODF start key generation {}", name)))?
            },
        };

        let checksum = match xml.attribute(node, "manifest:checksum-type") {
            None => None,
            Some(name) => {
                let kind = DigestKind::from_checksum_name(name)
                    .ok_or_else(|| Error::Unsupported(format!("ODF checksum {}", name)))?;
                Some((kind, base64_attribute(xml, node, "manifest:checksum")?))
            },
        };

        Ok(Self {
            algorithm,
            iv,
            start_key,
            key_size,
            iterations,
            salt,
            checksum,
        })
    }

    /// `manifest:encryption-data` element describing these parameters.
    pub fn to_manifest_xml(&self) -> String {
        let mut xml = String::from("<manifest:encryption-data");
        if let Some((kind, checksum)) = &self.checksum {
            let _ = write!(
                xml,
                r#" manifest:checksum-type="{}" manifest:checksum="{}""#,
                kind.checksum_name(),
                BASE64_STANDARD.encode(checksum)
            );
        }
        let _ = write!(
            xml,
            r#"><manifest:algorithm manifest:algorithm-name="{}" manifest:initialisation-vector="{}"/>"#,
            escape_xml(self.algorithm.name()),
            BASE64_STANDARD.encode(&self.iv)
        );
        let _ = write!(
            xml,
            r#"<manifest:start-key-generation manifest:start-key-generation-name="{}" manifest:key-size="{}"/>"#,
            self.start_key.start_key_name(),
            self.start_key.output_size()
        );
        let _ = write!(
            xml,
            r#"<manifest:key-derivation manifest:key-derivation-name="{}" manifest:key-size="{}" manifest:iteration-count="{}" manifest:salt="{}"/>"#,
            PBKDF2,
            self.key_size,
            self.iterations,
            BASE64_STANDARD.encode(&self.salt)
        );
        xml.push_str("</manifest:encryption-data>");
        xml
    }

    fn derive_key(&self, password: &str) -> Result<Vec<u8>> {
        let start_key = self.start_key.digest(password.as_bytes());
        let mut key = vec![0u8; self.key_size];
        pbkdf2::<HmacSha1>(&start_key, &self.salt, self.iterations, &mut key)
            .map_err(|_| Error::ConversionFailure("invalid PBKDF2 parameters".to_string()))?;
        Ok(key)
    }

    /// Decrypted, still deflated stream; `None` when the padding is invalid.
    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Option<Vec<u8>>> {
        let invalid = |_| {
            Error::ConversionFailure(format!(
                "{}-byte key for {}",
                key.len(),
                self.algorithm.name()
            ))
        };
        match self.algorithm {
            Algorithm::Aes256Cbc => {
                let cipher = cbc::Decryptor::<Aes256>::new_from_slices(key, &self.iv).map_err(invalid)?;
                Ok(cipher.decrypt_padded_vec_mut::<Iso10126>(ciphertext).ok())
            },
            Algorithm::BlowfishCfb => {
                let cipher = cfb_mode::Decryptor::<Blowfish>::new_from_slices(key, &self.iv).map_err(invalid)?;
                let mut plain = ciphertext.to_vec();
                cipher.decrypt(&mut plain);
                Ok(Some(plain))
            },
        }
    }

    fn checksum_matches(&self, decrypted: &[u8]) -> bool {
        match &self.checksum {
            Some((kind, expected)) => kind.digest(&decrypted[..decrypted.len().min(CHECKSUM_LENGTH)]) == *expected,
            None => true,
        }
    }
}

fn required_child(xml: &XmlDocument, node: NodeId, name: &str) -> Result<NodeId> {
    xml.child(node, name)
        .ok_or_else(|| Error::ConversionFailure(format!("{} without {}", ENCRYPTION_DATA, name)))
}

fn base64_attribute(xml: &XmlDocument, node: NodeId, name: &str) -> Result<Vec<u8>> {
    let value = xml
        .attribute(node, name)
        .ok_or_else(|| Error::ConversionFailure(format!("missing {}", name)))?;
    BASE64_STANDARD
        .decode(value.trim())
        .map_err(|e| Error::ConversionFailure(format!("{}: {}", name, e)))
}

fn number_attribute<T: std::str::FromStr>(xml: &XmlDocument, node: NodeId, name: &str) -> Result<Option<T>> {
    match xml.attribute(node, name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::ConversionFailure(format!("{}=\"{}\" is not a number", name, value))),
    }
}

/// One `manifest:file-entry`.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub path: Path,
    /// Uncompressed size of the member
    pub size: Option<u64>,
    pub encryption: Option<EncryptionData>,
}

/// A parsed `META-INF/manifest.xml`.
#[derive(Debug, Clone)]
pub struct Manifest {
    xml: XmlDocument,
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let xml = XmlDocument::parse(data)?;
        let mut entries = Vec::new();
        for node in xml.children(xml.root()) {
            if xml.name(node) != Some(FILE_ENTRY) {
                continue;
            }
            let Some(full_path) = xml.attribute(node, "manifest:full-path") else {
                log::warn!("manifest entry without a path");
                continue;
            };
            let encryption = match xml.child(node, ENCRYPTION_DATA) {
                Some(data) => Some(EncryptionData::parse(&xml, data)?),
                None => None,
            };
            entries.push(ManifestEntry {
                path: Path::new(full_path),
                size: number_attribute(&xml, node, "manifest:size")?,
                encryption,
            });
        }
        Ok(Self { xml, entries })
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn is_encrypted(&self) -> bool {
        self.entries.iter().any(|e| e.encryption.is_some())
    }

    /// The manifest of the decrypted package.
    pub fn to_plain_xml(&self) -> String {
        self.xml.to_xml_without(&[ENCRYPTION_DATA])
    }
}

/// Inflate a decrypted member. Members stored without compression are
/// recognised by their declared size.
fn inflate(entry: &ManifestEntry, decrypted: Vec<u8>) -> Result<Vec<u8>> {
    let limit = entry.size.map_or(u64::MAX, |size| size.saturating_add(1));
    let mut inflated = Vec::with_capacity(entry.size.unwrap_or(0).min(MAX_PREALLOCATION) as usize);
    let result = DeflateDecoder::new(decrypted.as_slice())
        .take(limit)
        .read_to_end(&mut inflated);

    let size_matches = |len: usize| entry.size.is_none_or(|size| size == len as u64);
    match result {
        Ok(_) if size_matches(inflated.len()) => Ok(inflated),
        _ if entry.size == Some(decrypted.len() as u64) => Ok(decrypted),
        Ok(_) => Err(Error::ConversionFailure(format!(
            "{}: {} bytes declared, {} inflated",
            entry.path,
            entry.size.unwrap_or(0),
            inflated.len()
        ))),
        Err(e) => Err(Error::ConversionFailure(format!("{}: {}", entry.path, e))),
    }
}

/// Decrypt every protected member of an ODF package.
///
/// Returns the plaintext package, with the encryption data removed from its
/// manifest, or `None` when the password does not match.
pub fn decrypt_package(storage: &dyn ReadStorage, password: &str) -> Result<Option<Vec<u8>>> {
    let manifest = Manifest::parse(&storage.read_to_vec(&Path::new(MANIFEST))?)?;
    let mut keys: HashMap<(DigestKind, Vec<u8>, u32, usize), Vec<u8>> = HashMap::new();
    let mut replacements = HashMap::new();

    for entry in manifest.entries() {
        let Some(data) = &entry.encryption else {
            continue;
        };
        if !storage.is_file(&entry.path) {
            log::warn!("encrypted member {} missing from the package", entry.path);
            continue;
        }

        let cache_key = (data.start_key, data.salt.clone(), data.iterations, data.key_size);
        let key = match keys.get(&cache_key) {
            Some(key) => key.clone(),
            None => {
                let key = data.derive_key(password)?;
                keys.insert(cache_key, key.clone());
                key
            },
        };

        let ciphertext = storage.read_to_vec(&entry.path)?;
        let Some(decrypted) = data.decrypt(&key, &ciphertext)? else {
            return Ok(None);
        };
        if !data.checksum_matches(&decrypted) {
            return Ok(None);
        }
        let plaintext = match inflate(entry, decrypted) {
            Ok(plaintext) => plaintext,
            // without a checksum a wrong key only shows as garbage
            Err(_) if data.checksum.is_none() => return Ok(None),
            Err(e) => return Err(e),
        };
        replacements.insert(entry.path.clone(), plaintext);
    }

    if replacements.is_empty() {
        return Err(Error::ConversionFailure("no encrypted member to decrypt".to_string()));
    }
    log::debug!("decrypted {} package members", replacements.len());
    replacements.insert(Path::new(MANIFEST), manifest.to_plain_xml().into_bytes());
    let package = write_archive(storage, &replacements, Cursor::new(Vec::new()))?.into_inner();
    Ok(Some(package))
}

/// Deflate and encrypt one member with AES-256-CBC, a SHA-256 start key and
/// a SHA-256 checksum.
///
/// Salt and IV are caller-supplied so output is reproducible.
pub fn encrypt_member(
    plaintext: &[u8],
    password: &str,
    salt: &[u8; 16],
    iv: &[u8; 16],
    iterations: u32,
) -> Result<(Vec<u8>, EncryptionData)> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(plaintext)?;
    let deflated = encoder.finish()?;

    let mut data = EncryptionData {
        algorithm: Algorithm::Aes256Cbc,
        iv: iv.to_vec(),
        start_key: DigestKind::Sha256,
        key_size: 32,
        iterations,
        salt: salt.to_vec(),
        checksum: None,
    };
    data.checksum = Some((
        DigestKind::Sha256,
        DigestKind::Sha256.digest(&deflated[..deflated.len().min(CHECKSUM_LENGTH)]),
    ));

    let key = data.derive_key(password)?;
    let cipher = cbc::Encryptor::<Aes256>::new_from_slices(&key, iv)
        .map_err(|_| Error::ConversionFailure("invalid AES-256 key or IV".to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(&deflated);
    Ok((ciphertext, data))
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;
    use crate::access::zip::fixture::zip_bytes;
    use crate::document::odf::fixture::content_xml;

    /// Password protected text document with `body` as its only content.
    pub(crate) fn encrypted_odt(body: &str, password: &str) -> Vec<u8> {
        let content = content_xml("office:text", body);
        let (ciphertext, data) = encrypt_member(content.as_bytes(), password, &[5u8; 16], &[6u8; 16], 1024).unwrap();
        let manifest = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.3">"#,
                r#"<manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.text"/>"#,
                r#"<manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml" manifest:size="{}">{}</manifest:file-entry>"#,
                "</manifest:manifest>"
            ),
            content.len(),
            data.to_manifest_xml()
        );
        zip_bytes(&[
            ("mimetype", b"application/vnd.oasis.opendocument.text"),
            ("content.xml", ciphertext.as_slice()),
            ("META-INF/manifest.xml", manifest.as_bytes()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::fixture::encrypted_odt;
    use super::*;
    use crate::access::ZipStorage;

    #[test]
    fn test_decrypt_round_trip() {
        let storage = ZipStorage::open(encrypted_odt("<text:p>Secret</text:p>", "pw")).unwrap();
        let manifest = Manifest::parse(&storage.read_to_vec(&Path::new(MANIFEST)).unwrap()).unwrap();
        assert!(manifest.is_encrypted());
        let content = &manifest.entries()[1];
        assert_eq!(content.path, Path::new("content.xml"));
        let data = content.encryption.as_ref().unwrap();
        assert_eq!(data.algorithm, Algorithm::Aes256Cbc);
        assert_eq!(data.start_key, DigestKind::Sha256);
        assert_eq!((data.key_size, data.iterations), (32, 1024));

        let package = decrypt_package(&storage, "pw").unwrap().unwrap();
        let plain = ZipStorage::open(package).unwrap();
        let xml = String::from_utf8(plain.read_to_vec(&Path::new("content.xml")).unwrap()).unwrap();
        assert!(xml.contains("<text:p>Secret</text:p>"));
        assert_eq!(
            plain.read_to_vec(&Path::new("mimetype")).unwrap(),
            b"application/vnd.oasis.opendocument.text"
        );

        let manifest = Manifest::parse(&plain.read_to_vec(&Path::new(MANIFEST)).unwrap()).unwrap();
        assert!(!manifest.is_encrypted());
        assert_eq!(manifest.entries()[1].size, Some(xml.len() as u64));
    }

    #[test]
    fn test_wrong_password() {
        let storage = ZipStorage::open(encrypted_odt("<text:p>Secret</text:p>", "pw")).unwrap();
        assert_eq!(decrypt_package(&storage, "Pw").unwrap(), None);
        assert_eq!(decrypt_package(&storage, "").unwrap(), None);
    }

    #[test]
    fn test_encryption_data_round_trip() {
        let (_, data) = encrypt_member(b"x", "pw", &[1u8; 16], &[2u8; 16], 10).unwrap();
        let xml = XmlDocument::parse(data.to_manifest_xml().as_bytes()).unwrap();
        assert_eq!(EncryptionData::parse(&xml, xml.root()).unwrap(), data);
    }

    fn blowfish_manifest_entry(checksum: &[u8], iv: &[u8], salt: &[u8], size: usize) -> String {
        format!(
            concat!(
                r#"<manifest:manifest><manifest:file-entry manifest:full-path="content.xml" manifest:size="{}">"#,
                r#"<manifest:encryption-data manifest:checksum-type="SHA1/1K" manifest:checksum="{}">"#,
                r#"<manifest:algorithm manifest:algorithm-name="Blowfish CFB" manifest:initialisation-vector="{}"/>"#,
                r#"<manifest:key-derivation manifest:key-derivation-name="PBKDF2" manifest:iteration-count="1024" manifest:salt="{}"/>"#,
                "</manifest:encryption-data></manifest:file-entry></manifest:manifest>"
            ),
            size,
            BASE64_STANDARD.encode(checksum),
            BASE64_STANDARD.encode(iv),
            BASE64_STANDARD.encode(salt)
        )
    }

    #[test]
    fn test_blowfish_member() {
        let plaintext = b"<office:document-content/>";
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(plaintext).unwrap();
        let deflated = encoder.finish().unwrap();

        let (iv, salt) = ([9u8; 8], [4u8; 16]);
        let start_key = Sha1::digest(b"pw");
        let mut key = [0u8; 16];
        pbkdf2::<HmacSha1>(&start_key, &salt, 1024, &mut key).unwrap();
        let mut ciphertext = deflated.clone();
        cfb_mode::Encryptor::<Blowfish>::new_from_slices(&key, &iv)
            .unwrap()
            .encrypt(&mut ciphertext);

        let manifest = blowfish_manifest_entry(&Sha1::digest(&deflated), &iv, &salt, plaintext.len());
        let storage = ZipStorage::open(crate::access::zip::fixture::zip_bytes(&[
            ("content.xml", ciphertext.as_slice()),
            ("META-INF/manifest.xml", manifest.as_bytes()),
        ]))
        .unwrap();
        let manifest = Manifest::parse(manifest.as_bytes()).unwrap();
        let entry = &manifest.entries()[0];
        let data = entry.encryption.as_ref().unwrap();
        assert_eq!((data.algorithm, data.start_key, data.key_size), (Algorithm::BlowfishCfb, DigestKind::Sha1, 16));

        let package = decrypt_package(&storage, "pw").unwrap().unwrap();
        let plain = ZipStorage::open(package).unwrap();
        assert_eq!(plain.read_to_vec(&Path::new("content.xml")).unwrap(), plaintext);
        assert_eq!(decrypt_package(&storage, "nope").unwrap(), None);
    }

    #[test]
    fn test_unsupported_algorithm() {
        let manifest = concat!(
            r#"<manifest:manifest><manifest:file-entry manifest:full-path="content.xml">"#,
            r#"<manifest:encryption-data><manifest:algorithm manifest:algorithm-name="http://www.w3.org/2009/xmlenc11#aes256-gcm" manifest:initialisation-vector="AAAAAAAAAAAAAAAA"/>"#,
            r#"<manifest:key-derivation manifest:key-derivation-name="urn:org:documentfoundation:names:experimental:office:manifest:argon2id"/>"#,
            "</manifest:encryption-data></manifest:file-entry></manifest:manifest>"
        );
        assert!(matches!(Manifest::parse(manifest.as_bytes()), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_stored_member_is_not_inflated() {
        let entry = ManifestEntry {
            path: Path::new("Pictures/a.png"),
            size: Some(4),
            encryption: None,
        };
        assert_eq!(inflate(&entry, b"\x89PNG".to_vec()).unwrap(), b"\x89PNG");

        let entry = ManifestEntry { size: Some(100), ..entry };
        assert!(inflate(&entry, b"\x89PNG".to_vec()).is_err());
    }
}
