//! Stream configuration: key material and base counter.
//!
//! Values come either from hex strings (CLI flags) or from the environment:
//!   CIPHERBOX_STREAM_KEY  hex-encoded AES key (16, 24 or 32 bytes)
//!   CIPHERBOX_STREAM_IV   hex-encoded 16-byte initial counter block
//! A `.env` file in the working directory is loaded first when present.

use thiserror::Error;

use crate::crypto::counter::{CounterBlock, BLOCK_SIZE};
use crate::crypto::key::CipherKey;
use crate::crypto::utils::hex_to_bytes;

pub const KEY_ENV: &str = "CIPHERBOX_STREAM_KEY";
pub const IV_ENV: &str = "CIPHERBOX_STREAM_IV";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing {0}")]
    Missing(&'static str),
    #[error("Invalid hex in {0}")]
    InvalidHex(&'static str),
    #[error("Invalid key size: {0} bytes (expected 16, 24 or 32)")]
    InvalidKeySize(usize),
    #[error("Invalid IV size: {0} bytes (expected {BLOCK_SIZE})")]
    InvalidIvSize(usize),
}

/// Everything a stream needs besides its source: `{key, base counter}`.
/// The block size is fixed by AES at [`BLOCK_SIZE`].
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub key: CipherKey,
    pub iv: CounterBlock,
}

impl StreamConfig {
    pub fn new(key: CipherKey, iv: CounterBlock) -> Result<Self, ConfigError> {
        match key.len() {
            16 | 24 | 32 => Ok(Self { key, iv }),
            other => Err(ConfigError::InvalidKeySize(other)),
        }
    }

    pub fn from_hex(key_hex: &str, iv_hex: &str) -> Result<Self, ConfigError> {
        let key = CipherKey::from(hex_to_bytes(key_hex).map_err(|_| ConfigError::InvalidHex("key"))?);
        let iv_bytes = hex_to_bytes(iv_hex).map_err(|_| ConfigError::InvalidHex("iv"))?;
        let iv: CounterBlock = iv_bytes
            .as_slice()
            .try_into()
            .map_err(|_| ConfigError::InvalidIvSize(iv_bytes.len()))?;
        Self::new(key, iv)
    }

    /// Load from `CIPHERBOX_STREAM_KEY` / `CIPHERBOX_STREAM_IV`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key_hex = lookup(KEY_ENV).ok_or(ConfigError::Missing(KEY_ENV))?;
        let iv_hex = lookup(IV_ENV).ok_or(ConfigError::Missing(IV_ENV))?;
        Self::from_hex(&key_hex, &iv_hex)
    }

    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}
