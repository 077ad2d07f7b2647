//! Symmetric key material.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Raw AES key bytes (16, 24 or 32 bytes). Zeroed on drop, never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey(Vec<u8>);

impl CipherKey {
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for CipherKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherKey([REDACTED; {}])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let key = CipherKey::from_slice(&[0xab; 32]);
        let printed = format!("{:?}", key);
        assert_eq!(printed, "CipherKey([REDACTED; 32])");
        assert!(!printed.contains("ab"));
    }

    #[test]
    fn test_zeroize_clears_bytes() {
        let mut key = CipherKey::from_slice(&[0x11; 16]);
        key.zeroize();
        assert!(key.is_empty());
    }
}
