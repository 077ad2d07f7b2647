//! Utility functions for key material handling.

use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroize;

use super::aes_ctr::AES_CTR_IV_SIZE;
use super::key::CipherKey;

#[derive(Debug, Error)]
pub enum UtilError {
    #[error("Invalid hex string")]
    InvalidHex,
}

/// Generate cryptographically secure random bytes.
pub fn generate_random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    buf
}

/// Generate a random AES key of `len` bytes.
pub fn generate_file_key(len: usize) -> CipherKey {
    CipherKey::from(generate_random_bytes(len))
}

/// Generate a random 16-byte CTR IV.
pub fn generate_iv() -> [u8; AES_CTR_IV_SIZE] {
    let mut iv = [0u8; AES_CTR_IV_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut iv);
    iv
}

/// Convert a hex string to bytes.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, UtilError> {
    hex::decode(hex.trim()).map_err(|_| UtilError::InvalidHex)
}

/// Convert bytes to a hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Zeroize sensitive data in a byte slice.
pub fn clear_bytes(buf: &mut [u8]) {
    buf.zeroize();
}
