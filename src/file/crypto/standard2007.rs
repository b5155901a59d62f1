use crate::common::{Error, Result};
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit, generic_array::GenericArray};
use aes::{Aes128, Aes192, Aes256};
use sha1::{Digest, Sha1};

use super::password_to_utf16le;

const SPIN_COUNT: u32 = 50_000;
const BLOCK_SIZE: usize = 16;

const CALG_AES_128: u32 = 0x660E;
const CALG_AES_192: u32 = 0x660F;
const CALG_AES_256: u32 = 0x6610;
const CALG_SHA1: u32 = 0x8004;

const FLAG_CRYPTO_API: u32 = 0x04;
const FLAG_EXTERNAL: u32 = 0x10;
const FLAG_AES: u32 = 0x20;

const CSP_NAME: &str = "Microsoft Enhanced RSA and AES Cryptographic Provider";

#[derive(Debug, Clone, Copy)]
struct Standard2007Verifier {
    key_size: usize,
    salt: [u8; 16],
    encrypted_verifier: [u8; 16],
    encrypted_verifier_hash: [u8; 32],
}

/// AES in ECB mode with any of the key sizes Standard encryption allows.
enum Cipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl Cipher {
    fn new(key: &[u8]) -> Result<Self> {
        let invalid = |_| Error::ConversionFailure(format!("invalid AES key length {}", key.len()));
        Ok(match key.len() {
            16 => Cipher::Aes128(Aes128::new_from_slice(key).map_err(invalid)?),
            24 => Cipher::Aes192(Aes192::new_from_slice(key).map_err(invalid)?),
            32 => Cipher::Aes256(Aes256::new_from_slice(key).map_err(invalid)?),
            other => {
                return Err(Error::Unsupported(format!("AES key of {} bytes", other)));
            },
        })
    }

    fn encrypt(&self, data: &mut [u8]) {
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(chunk);
            match self {
                Cipher::Aes128(c) => c.encrypt_block(block),
                Cipher::Aes192(c) => c.encrypt_block(block),
                Cipher::Aes256(c) => c.encrypt_block(block),
            }
        }
    }

    fn decrypt(&self, data: &mut [u8]) {
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(chunk);
            match self {
                Cipher::Aes128(c) => c.decrypt_block(block),
                Cipher::Aes192(c) => c.decrypt_block(block),
                Cipher::Aes256(c) => c.decrypt_block(block),
            }
        }
    }
}

/// Decrypt a Standard-encrypted `EncryptedPackage` stream.
///
/// Returns `Ok(None)` when the password does not match the verifier.
pub fn decrypt_package(
    encryption_info: &[u8],
    encrypted_package: &[u8],
    password: &str,
) -> Result<Option<Vec<u8>>> {
    let verifier = parse_encryption_info(encryption_info)?;
    let key = derive_key(password, &verifier.salt, SPIN_COUNT, verifier.key_size)?;
    if !verify_password(&key, &verifier)? {
        return Ok(None);
    }
    decrypt_package_stream(&key, encrypted_package).map(Some)
}

/// Encrypt an OOXML package with AES-128 Standard encryption.
///
/// Returns the `EncryptionInfo` and `EncryptedPackage` stream contents.
/// Salt and verifier are caller-supplied so output is reproducible.
pub fn encrypt_package(
    package: &[u8],
    password: &str,
    salt: &[u8; 16],
    verifier: &[u8; 16],
) -> Result<(Vec<u8>, Vec<u8>)> {
    if package.is_empty() {
        return Err(Error::ConversionFailure(
            "cannot encrypt an empty package".to_string(),
        ));
    }

    let key = derive_key(password, salt, SPIN_COUNT, 16)?;
    let (encrypted_verifier, encrypted_verifier_hash) = encrypt_verifier(&key, verifier)?;
    let info = build_encryption_info(salt, &encrypted_verifier, &encrypted_verifier_hash);
    let encrypted = encrypt_package_stream(&key, package)?;
    Ok((info, encrypted))
}

fn derive_key(password: &str, salt: &[u8; 16], spin_count: u32, key_size: usize) -> Result<Vec<u8>> {
    if key_size == 0 || key_size > 32 {
        return Err(Error::Unsupported(format!(
            "key size of {} bytes for Standard encryption",
            key_size
        )));
    }

    let pw_bytes = password_to_utf16le(password);

    let mut sha = Sha1::new();
    sha.update(salt);
    sha.update(&pw_bytes);
    let mut hash = sha.finalize().to_vec();

    for i in 0..spin_count {
        let mut sha = Sha1::new();
        sha.update(i.to_le_bytes());
        sha.update(&hash);
        hash = sha.finalize().to_vec();
    }

    let block_key = [0u8; 4];
    let mut sha = Sha1::new();
    sha.update(&hash);
    sha.update(block_key);
    let derived = sha.finalize().to_vec();

    let x1 = fill_and_xor_sha1(&derived, 0x36);
    let x2 = fill_and_xor_sha1(&derived, 0x5c);

    let mut combined = Vec::with_capacity(x1.len() + x2.len());
    combined.extend_from_slice(&x1);
    combined.extend_from_slice(&x2);
    combined.truncate(key_size);
    Ok(combined)
}

fn fill_and_xor_sha1(input: &[u8], fill: u8) -> Vec<u8> {
    let mut buff = [fill; 64];
    for (b, i) in buff.iter_mut().zip(input) {
        *b ^= i;
    }
    let mut sha = Sha1::new();
    sha.update(buff);
    sha.finalize().to_vec()
}

fn encrypt_verifier(key: &[u8], verifier: &[u8; 16]) -> Result<([u8; 16], [u8; 32])> {
    let cipher = Cipher::new(key)?;

    let mut encrypted_verifier = *verifier;
    cipher.encrypt(&mut encrypted_verifier);

    let mut sha = Sha1::new();
    sha.update(verifier);
    let hash = sha.finalize();

    let mut encrypted_hash = [0u8; 32];
    encrypted_hash[..hash.len()].copy_from_slice(&hash);
    cipher.encrypt(&mut encrypted_hash);

    Ok((encrypted_verifier, encrypted_hash))
}

fn build_encryption_info(
    salt: &[u8; 16],
    encrypted_verifier: &[u8; 16],
    encrypted_verifier_hash: &[u8; 32],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    buf.extend_from_slice(&3u16.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&(FLAG_CRYPTO_API | FLAG_AES).to_le_bytes());

    let header_start = buf.len();
    buf.extend_from_slice(&0u32.to_le_bytes());

    buf.extend_from_slice(&(FLAG_CRYPTO_API | FLAG_AES).to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&CALG_AES_128.to_le_bytes());
    buf.extend_from_slice(&CALG_SHA1.to_le_bytes());
    buf.extend_from_slice(&128u32.to_le_bytes());
    buf.extend_from_slice(&0x18u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());

    for ch in CSP_NAME.encode_utf16() {
        buf.extend_from_slice(&ch.to_le_bytes());
    }
    buf.extend_from_slice(&0u16.to_le_bytes());

    let header_size = (buf.len() - header_start - 4) as u32;
    buf[header_start..header_start + 4].copy_from_slice(&header_size.to_le_bytes());

    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(salt);
    buf.extend_from_slice(encrypted_verifier);
    buf.extend_from_slice(&20u32.to_le_bytes());
    buf.extend_from_slice(encrypted_verifier_hash);

    buf
}

fn encrypt_package_stream(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let cipher = Cipher::new(key)?;

    let mut buf = Vec::with_capacity(8 + data.len() + BLOCK_SIZE);
    buf.extend_from_slice(&(data.len() as u64).to_le_bytes());

    let mut padded = data.to_vec();
    padded.resize(data.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE, 0);
    cipher.encrypt(&mut padded);

    buf.extend_from_slice(&padded);
    Ok(buf)
}

fn read_u32(info: &[u8], offset: usize) -> Result<u32> {
    info.get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| {
            Error::ConversionFailure(format!("EncryptionInfo truncated at offset {}", offset))
        })
}

fn parse_encryption_info(info: &[u8]) -> Result<Standard2007Verifier> {
    if info.len() < 12 {
        return Err(Error::ConversionFailure(
            "EncryptionInfo stream too short for Standard header".to_string(),
        ));
    }

    let flags = read_u32(info, 4)?;
    if flags & FLAG_EXTERNAL != 0 {
        return Err(Error::Unsupported("extensible encryption".to_string()));
    }

    let header_size = read_u32(info, 8)? as usize;
    let header_start = 12usize;
    if header_size < 32 {
        return Err(Error::ConversionFailure(format!(
            "EncryptionInfo header of {} bytes",
            header_size
        )));
    }

    let alg_id = read_u32(info, header_start + 8)?;
    let key_bits = read_u32(info, header_start + 16)?;
    let key_size = match (alg_id, key_bits) {
        (CALG_AES_128, 128) | (0, 128) => 16,
        (CALG_AES_192, 192) => 24,
        (CALG_AES_256, 256) => 32,
        _ => {
            return Err(Error::Unsupported(format!(
                "Standard encryption with algorithm {:#06x} and {} bit key",
                alg_id, key_bits
            )));
        },
    };

    let mut offset = header_start.checked_add(header_size).ok_or_else(|| {
        Error::ConversionFailure("EncryptionInfo header size overflow".to_string())
    })?;
    if info.len() < offset + 4 + 16 + 16 + 4 + 32 {
        return Err(Error::ConversionFailure(
            "EncryptionInfo stream too short for Standard verifier".to_string(),
        ));
    }

    let salt_size = read_u32(info, offset)?;
    offset += 4;
    if salt_size != 16 {
        return Err(Error::ConversionFailure(format!(
            "unexpected salt size {} (expected 16)",
            salt_size
        )));
    }

    let mut salt = [0u8; 16];
    salt.copy_from_slice(&info[offset..offset + 16]);
    offset += 16;

    let mut encrypted_verifier = [0u8; 16];
    encrypted_verifier.copy_from_slice(&info[offset..offset + 16]);
    offset += 16;

    let hash_size = read_u32(info, offset)?;
    offset += 4;
    if hash_size != 20 {
        return Err(Error::ConversionFailure(format!(
            "unexpected verifier hash size {} (expected 20)",
            hash_size
        )));
    }

    let mut encrypted_verifier_hash = [0u8; 32];
    encrypted_verifier_hash.copy_from_slice(&info[offset..offset + 32]);

    Ok(Standard2007Verifier {
        key_size,
        salt,
        encrypted_verifier,
        encrypted_verifier_hash,
    })
}

fn verify_password(key: &[u8], verifier: &Standard2007Verifier) -> Result<bool> {
    let cipher = Cipher::new(key)?;

    let mut decrypted_verifier = verifier.encrypted_verifier;
    cipher.decrypt(&mut decrypted_verifier);

    let mut sha = Sha1::new();
    sha.update(decrypted_verifier);
    let verifier_hash = sha.finalize();

    let mut decrypted_hash = verifier.encrypted_verifier_hash;
    cipher.decrypt(&mut decrypted_hash);

    Ok(decrypted_hash[..verifier_hash.len()] == verifier_hash[..])
}

fn decrypt_package_stream(key: &[u8], encrypted: &[u8]) -> Result<Vec<u8>> {
    let cipher = Cipher::new(key)?;

    if encrypted.len() < 8 {
        return Err(Error::ConversionFailure(
            "EncryptedPackage stream too short".to_string(),
        ));
    }

    let mut size_bytes = [0u8; 8];
    size_bytes.copy_from_slice(&encrypted[..8]);
    let stream_size = u64::from_le_bytes(size_bytes);

    // Writers pad the last block arbitrarily; the declared size decides.
    let mut data = encrypted[8..].to_vec();
    data.truncate(data.len() / BLOCK_SIZE * BLOCK_SIZE);
    if (data.len() as u64) < stream_size {
        return Err(Error::ConversionFailure(format!(
            "EncryptedPackage holds {} bytes for a declared size of {}",
            data.len(),
            stream_size
        )));
    }

    cipher.decrypt(&mut data);
    data.truncate(stream_size as usize);
    Ok(data)
}
