//! Decryption of password protected packages.
//!
//! Encrypted OOXML packages are compound files holding an `EncryptionInfo`
//! stream (key derivation parameters and a password verifier) and an
//! `EncryptedPackage` stream (the ciphertext of the original ZIP). Only the
//! Standard (AES-ECB, SHA-1) scheme is decrypted; Agile and Extensible
//! packages are recognised and rejected as unsupported.
//!
//! Encrypted ODF packages stay ZIP archives whose manifest describes how each
//! protected member was encrypted (see [`odf`]).

#[cfg(feature = "crypto")]
pub mod odf;
#[cfg(feature = "crypto")]
pub mod standard2007;

use crate::access::ReadStorage;
use crate::common::{Error, Result};

/// Encryption scheme declared by an `EncryptionInfo` version header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionScheme {
    Standard,
    Agile,
    Extensible,
}

impl EncryptionScheme {
    pub fn from_encryption_info(info: &[u8]) -> Result<Self> {
        if info.len() < 4 {
            return Err(Error::ConversionFailure(
                "EncryptionInfo stream too short".to_string(),
            ));
        }
        let major = u16::from_le_bytes([info[0], info[1]]);
        let minor = u16::from_le_bytes([info[2], info[3]]);
        match (major, minor) {
            (4, 4) => Ok(EncryptionScheme::Agile),
            (2..=4, 2) => Ok(EncryptionScheme::Standard),
            (3 | 4, 3) => Ok(EncryptionScheme::Extensible),
            _ => Err(Error::Unsupported(format!(
                "EncryptionInfo version {}.{}",
                major, minor
            ))),
        }
    }
}

/// Decrypt an `EncryptedPackage` stream into the plaintext ZIP package.
///
/// `Ok(None)` means the password was rejected by the verifier.
pub fn decrypt_package(
    encryption_info: &[u8],
    encrypted_package: &[u8],
    password: &str,
) -> Result<Option<Vec<u8>>> {
    match EncryptionScheme::from_encryption_info(encryption_info)? {
        #[cfg(feature = "crypto")]
        EncryptionScheme::Standard => {
            standard2007::decrypt_package(encryption_info, encrypted_package, password)
        },
        #[cfg(not(feature = "crypto"))]
        EncryptionScheme::Standard => {
            let _ = (encrypted_package, password);
            Err(Error::Unsupported(
                "Standard encryption (built without the crypto feature)".to_string(),
            ))
        },
        EncryptionScheme::Agile => Err(Error::Unsupported("Agile encryption".to_string())),
        EncryptionScheme::Extensible => {
            Err(Error::Unsupported("Extensible encryption".to_string()))
        },
    }
}

/// Decrypt the protected members of an ODF package into a plaintext package.
///
/// `Ok(None)` means the password does not match the manifest checksums.
pub fn decrypt_odf_package(storage: &dyn ReadStorage, password: &str) -> Result<Option<Vec<u8>>> {
    #[cfg(feature = "crypto")]
    {
        odf::decrypt_package(storage, password)
    }
    #[cfg(not(feature = "crypto"))]
    {
        let _ = (storage, password);
        Err(Error::Unsupported(
            "ODF encryption (built without the crypto feature)".to_string(),
        ))
    }
}

#[cfg_attr(not(feature = "crypto"), allow(dead_code))]
fn password_to_utf16le(password: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(password.len() * 2);
    for ch in password.encode_utf16() {
        buf.extend_from_slice(&ch.to_le_bytes());
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_from_version() {
        assert_eq!(
            EncryptionScheme::from_encryption_info(&[3, 0, 2, 0]).unwrap(),
            EncryptionScheme::Standard
        );
        assert_eq!(
            EncryptionScheme::from_encryption_info(&[4, 0, 4, 0]).unwrap(),
            EncryptionScheme::Agile
        );
        assert_eq!(
            EncryptionScheme::from_encryption_info(&[3, 0, 3, 0]).unwrap(),
            EncryptionScheme::Extensible
        );
        assert!(EncryptionScheme::from_encryption_info(&[1, 0, 1, 0]).is_err());
        assert!(EncryptionScheme::from_encryption_info(&[3]).is_err());
    }

    #[test]
    fn test_agile_is_unsupported() {
        let info = [4u8, 0, 4, 0, 0x40, 0, 0, 0];
        assert!(matches!(
            decrypt_package(&info, &[0u8; 32], "pw"),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_password_encoding() {
        assert_eq!(password_to_utf16le("Ab"), vec![0x41, 0, 0x62, 0]);
        assert_eq!(password_to_utf16le("é"), vec![0xE9, 0]);
    }
}
