//! AES-CTR keystream primitive.
//!
//! Symmetric decryption for media file content using CTR mode.
//! CTR mode enables random-access decryption (any byte range without
//! processing preceding bytes), required for streaming media playback.
//!
//! Uses Ctr128BE (big-endian counter over the full 16-byte block) to match
//! `AES/CTR/NoPadding`, where the whole IV is incremented once per block.
//!
//! SECURITY NOTE: AES-CTR does NOT provide authentication. Integrity must be
//! provided by whatever delivered the ciphertext.

use aes::{Aes128, Aes192, Aes256};
use ctr::cipher::{KeyIvInit, StreamCipher};
use thiserror::Error;

use super::counter::{derive_counter, BLOCK_SIZE};
use super::key::CipherKey;

/// AES-CTR IV size in bytes (128-bit counter block).
pub const AES_CTR_IV_SIZE: usize = BLOCK_SIZE;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;
type Aes192Ctr = ctr::Ctr128BE<Aes192>;
type Aes256Ctr = ctr::Ctr128BE<Aes256>;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Invalid key size: {0} bytes (expected 16, 24 or 32)")]
    InvalidKeySize(usize),
    #[error("Invalid IV size: {0} bytes (expected {AES_CTR_IV_SIZE})")]
    InvalidIvSize(usize),
    #[error("Cipher used before a counter was set")]
    NotInitialized,
    #[error("Keystream exhausted")]
    KeystreamExhausted,
    #[error("Invalid range")]
    InvalidRange,
}

/// A counter-mode keystream cipher with a fixed key.
///
/// `process` XORs the keystream into the buffer in place, so it both encrypts
/// and decrypts. `init` repositions the keystream at a new counter block.
pub trait KeystreamCipher {
    /// Width of one cipher block (and of the counter field) in bytes.
    fn block_size(&self) -> usize;

    /// Re-key the keystream so the next byte produced is the first byte of
    /// the block for `counter`.
    fn init(&mut self, counter: &[u8]) -> Result<(), CipherError>;

    /// Apply the keystream to `buf` in place.
    fn process(&mut self, buf: &mut [u8]) -> Result<(), CipherError>;

    /// Drop any keystream state. The cipher must be re-initialized before use.
    fn reset(&mut self);
}

enum AesCtrState {
    Aes128(Aes128Ctr),
    Aes192(Aes192Ctr),
    Aes256(Aes256Ctr),
}

/// AES-128/192/256 in CTR mode, variant chosen by key length.
pub struct AesCtrCipher {
    key: CipherKey,
    state: Option<AesCtrState>,
}

impl AesCtrCipher {
    /// Create a cipher for `key`. No keystream exists until `init` is called.
    pub fn new(key: CipherKey) -> Result<Self, CipherError> {
        match key.len() {
            16 | 24 | 32 => Ok(Self { key, state: None }),
            other => Err(CipherError::InvalidKeySize(other)),
        }
    }

    /// Create a cipher already positioned at `iv`.
    pub fn with_iv(key: CipherKey, iv: &[u8]) -> Result<Self, CipherError> {
        let mut cipher = Self::new(key)?;
        cipher.init(iv)?;
        Ok(cipher)
    }
}

impl KeystreamCipher for AesCtrCipher {
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn init(&mut self, counter: &[u8]) -> Result<(), CipherError> {
        if counter.len() != AES_CTR_IV_SIZE {
            return Err(CipherError::InvalidIvSize(counter.len()));
        }
        let key = self.key.as_bytes();
        let invalid_key = |_| CipherError::InvalidKeySize(key.len());
        let state = match key.len() {
            16 => AesCtrState::Aes128(Aes128Ctr::new_from_slices(key, counter).map_err(invalid_key)?),
            24 => AesCtrState::Aes192(Aes192Ctr::new_from_slices(key, counter).map_err(invalid_key)?),
            32 => AesCtrState::Aes256(Aes256Ctr::new_from_slices(key, counter).map_err(invalid_key)?),
            other => return Err(CipherError::InvalidKeySize(other)),
        };
        self.state = Some(state);
        Ok(())
    }

    fn process(&mut self, buf: &mut [u8]) -> Result<(), CipherError> {
        let state = self.state.as_mut().ok_or(CipherError::NotInitialized)?;
        let result = match state {
            AesCtrState::Aes128(c) => c.try_apply_keystream(buf),
            AesCtrState::Aes192(c) => c.try_apply_keystream(buf),
            AesCtrState::Aes256(c) => c.try_apply_keystream(buf),
        };
        result.map_err(|_| CipherError::KeystreamExhausted)
    }

    fn reset(&mut self) {
        self.state = None;
    }
}

/// Encrypt data using AES-CTR.
///
/// Each encryption MUST use a unique IV with the same key.
/// Reusing IV+key pairs is catastrophic for AES-CTR security.
///
/// CTR output is the same size as the input (no authentication tag).
pub fn encrypt_aes_ctr(
    plaintext: &[u8],
    key: &CipherKey,
    iv: &[u8; AES_CTR_IV_SIZE],
) -> Result<Vec<u8>, CipherError> {
    let mut cipher = AesCtrCipher::with_iv(key.clone(), iv)?;

    let mut output = plaintext.to_vec();
    cipher.process(&mut output)?;

    Ok(output)
}

/// Decrypt data encrypted with AES-CTR.
///
/// CTR encrypt == decrypt (XOR is symmetric), but provided as a separate
/// function for API clarity.
pub fn decrypt_aes_ctr(
    ciphertext: &[u8],
    key: &CipherKey,
    iv: &[u8; AES_CTR_IV_SIZE],
) -> Result<Vec<u8>, CipherError> {
    encrypt_aes_ctr(ciphertext, key, iv)
}

/// Decrypt an arbitrary byte range from AES-CTR encrypted data held in memory.
///
/// The counter for the first block is `iv + floor(start_byte / 16)` over the
/// full 128-bit block. Only the block-aligned range covering
/// `[start_byte, end_byte]` (inclusive) is decrypted.
pub fn decrypt_aes_ctr_range(
    ciphertext: &[u8],
    key: &CipherKey,
    iv: &[u8; AES_CTR_IV_SIZE],
    start_byte: usize,
    end_byte: usize,
) -> Result<Vec<u8>, CipherError> {
    if start_byte > end_byte {
        return Err(CipherError::InvalidRange);
    }

    if ciphertext.is_empty() || start_byte >= ciphertext.len() {
        return Ok(Vec::new());
    }

    let clamped_end = end_byte.min(ciphertext.len() - 1);

    let start_block = start_byte / BLOCK_SIZE;
    let end_block = clamped_end / BLOCK_SIZE;
    let block_aligned_start = start_block * BLOCK_SIZE;
    let block_aligned_end = ((end_block + 1) * BLOCK_SIZE).min(ciphertext.len());

    let counter = derive_counter(iv, start_block as u64);
    let mut cipher = AesCtrCipher::with_iv(key.clone(), &counter)?;

    let mut decrypted = ciphertext[block_aligned_start..block_aligned_end].to_vec();
    cipher.process(&mut decrypted)?;

    let offset_in_first_block = start_byte - block_aligned_start;
    let requested_length = clamped_end - start_byte + 1;
    Ok(decrypted[offset_in_first_block..offset_in_first_block + requested_length].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(len: usize) -> CipherKey {
        CipherKey::from_slice(&(0..len as u8).collect::<Vec<_>>())
    }

    // NIST SP 800-38A F.5.1 (CTR-AES128.Encrypt), first two blocks.
    const NIST_KEY: [u8; 16] = [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f,
        0x3c,
    ];
    const NIST_IV: [u8; 16] = [
        0xf0, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa, 0xfb, 0xfc, 0xfd, 0xfe,
        0xff,
    ];
    const NIST_PLAINTEXT: [u8; 32] = [
        0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, 0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93, 0x17,
        0x2a, 0xae, 0x2d, 0x8a, 0x57, 0x1e, 0x03, 0xac, 0x9c, 0x9e, 0xb7, 0x6f, 0xac, 0x45, 0xaf,
        0x8e, 0x51,
    ];
    const NIST_CIPHERTEXT: [u8; 32] = [
        0x87, 0x4d, 0x61, 0x91, 0xb6, 0x20, 0xe3, 0x26, 0x1b, 0xef, 0x68, 0x64, 0x99, 0x0d, 0xb6,
        0xce, 0x98, 0x06, 0xf6, 0x6b, 0x79, 0x70, 0xfd, 0xff, 0x86, 0x17, 0x18, 0x7b, 0xb9, 0xff,
        0xfd, 0xff,
    ];

    #[test]
    fn test_nist_vector() {
        let key = CipherKey::from_slice(&NIST_KEY);
        let ciphertext = encrypt_aes_ctr(&NIST_PLAINTEXT, &key, &NIST_IV).unwrap();
        assert_eq!(ciphertext, NIST_CIPHERTEXT);
    }

    #[test]
    fn test_nist_second_block_via_derived_counter() {
        let key = CipherKey::from_slice(&NIST_KEY);
        let counter = derive_counter(&NIST_IV, 1);
        let mut cipher = AesCtrCipher::with_iv(key, &counter).unwrap();
        let mut block = NIST_CIPHERTEXT[16..].to_vec();
        cipher.process(&mut block).unwrap();
        assert_eq!(block, &NIST_PLAINTEXT[16..]);
    }

    #[test]
    fn test_all_key_sizes_roundtrip() {
        let iv = [7u8; 16];
        let plaintext = b"Counter mode is its own inverse.";
        for len in [16, 24, 32] {
            let k = key(len);
            let ciphertext = encrypt_aes_ctr(plaintext, &k, &iv).unwrap();
            assert_ne!(&ciphertext[..], &plaintext[..]);
            assert_eq!(ciphertext.len(), plaintext.len());
            assert_eq!(decrypt_aes_ctr(&ciphertext, &k, &iv).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_rejects_bad_key_size() {
        assert!(matches!(
            AesCtrCipher::new(key(20)),
            Err(CipherError::InvalidKeySize(20))
        ));
    }

    #[test]
    fn test_rejects_bad_iv_size() {
        let mut cipher = AesCtrCipher::new(key(16)).unwrap();
        assert!(matches!(
            cipher.init(&[0u8; 12]),
            Err(CipherError::InvalidIvSize(12))
        ));
    }

    #[test]
    fn test_process_before_init_fails() {
        let mut cipher = AesCtrCipher::new(key(32)).unwrap();
        let mut buf = [0u8; 4];
        assert!(matches!(
            cipher.process(&mut buf),
            Err(CipherError::NotInitialized)
        ));
    }

    #[test]
    fn test_reset_drops_keystream() {
        let mut cipher = AesCtrCipher::with_iv(key(16), &[0u8; 16]).unwrap();
        cipher.reset();
        assert!(cipher.process(&mut [0u8; 1]).is_err());
    }

    #[test]
    fn test_counter_wraps_past_all_ff() {
        // Ctr128BE must wrap the full block exactly as derive_counter does.
        let k = key(16);
        let iv = [0xffu8; 16];
        let data = [0u8; 32];
        let full = encrypt_aes_ctr(&data, &k, &iv).unwrap();

        let wrapped = derive_counter(&iv, 1);
        assert_eq!(wrapped, [0u8; 16]);
        let second = encrypt_aes_ctr(&data[16..], &k, &wrapped).unwrap();
        assert_eq!(&full[16..], &second[..]);
    }

    #[test]
    fn test_range_matches_full_decrypt() {
        let k = key(32);
        let iv = [0u8, 1, 2, 3, 4, 5, 6, 7, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe];
        let plaintext: Vec<u8> = (0..200u8).collect();
        let ciphertext = encrypt_aes_ctr(&plaintext, &k, &iv).unwrap();

        for (start, end) in [(0, 0), (0, 15), (5, 40), (16, 31), (17, 199), (150, 500)] {
            let range = decrypt_aes_ctr_range(&ciphertext, &k, &iv, start, end).unwrap();
            let clamped_end = end.min(plaintext.len() - 1);
            assert_eq!(range, &plaintext[start..=clamped_end], "range {start}..={end}");
        }
    }

    #[test]
    fn test_range_edge_cases() {
        let k = key(16);
        let iv = [0u8; 16];
        assert!(matches!(
            decrypt_aes_ctr_range(b"abc", &k, &iv, 2, 1),
            Err(CipherError::InvalidRange)
        ));
        assert!(decrypt_aes_ctr_range(&[], &k, &iv, 0, 10).unwrap().is_empty());
        assert!(decrypt_aes_ctr_range(b"abc", &k, &iv, 3, 10).unwrap().is_empty());
    }
}
