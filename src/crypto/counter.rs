//! Counter-block arithmetic for seeking into a CTR keystream.
//!
//! The counter block is an unsigned big-endian integer exactly one cipher
//! block wide. The keystream for block `n` is generated from
//! `(base + n) mod 2^(8 * width)`, so seeking to a byte offset only needs the
//! base IV and `offset / width`.
//!
//! Arithmetic is done directly on the byte array with carry propagation from
//! the least-significant byte; the carry out of the top byte is dropped.

/// Cipher block width in bytes (AES).
pub const BLOCK_SIZE: usize = 16;

/// A counter block for a 128-bit block cipher.
pub type CounterBlock = [u8; BLOCK_SIZE];

/// Derive the counter block for `block_index` blocks past `base`.
///
/// Returns `(base + block_index) mod 2^(8 * N)` encoded as exactly `N`
/// big-endian bytes. Index bytes that fall above the field width are
/// discarded, as is any carry out of the most-significant byte.
pub fn derive_counter<const N: usize>(base: &[u8; N], block_index: u64) -> [u8; N] {
    let mut out = *base;
    let index = block_index.to_be_bytes();

    let mut carry = 0u16;
    let mut index_bytes = index.iter().rev();
    for byte in out.iter_mut().rev() {
        let addend = index_bytes.next().copied().unwrap_or(0);
        if addend == 0 && carry == 0 && index_bytes.len() == 0 {
            break;
        }
        let sum = u16::from(*byte) + u16::from(addend) + carry;
        *byte = sum as u8;
        carry = sum >> 8;
    }

    out
}

/// Fit an arbitrary-length big-endian encoding into exactly `N` bytes.
///
/// Short encodings are left-padded with zeros. Long encodings (e.g. with a
/// leading sign byte) keep only their `N` least-significant bytes.
pub fn fit_to_width<const N: usize>(encoded: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    if encoded.len() >= N {
        out.copy_from_slice(&encoded[encoded.len() - N..]);
    } else {
        out[N - encoded.len()..].copy_from_slice(encoded);
    }
    out
}

/// Split a byte offset into `(block_index, in_block_offset)`.
pub fn block_position(offset: u64, block_size: usize) -> (u64, usize) {
    let block_size = block_size as u64;
    (offset / block_size, (offset % block_size) as usize)
}
