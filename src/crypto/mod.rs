//! Counter-mode crypto primitives for the seekable data source.
//!
//! `counter` holds the block-index arithmetic, `aes_ctr` the AES keystream
//! cipher that the stream re-keys on every seek.

pub mod aes_ctr;
pub mod counter;
pub mod key;
pub mod utils;


// Re-export primary items for convenience
pub use aes_ctr::{
    decrypt_aes_ctr, decrypt_aes_ctr_range, encrypt_aes_ctr, AesCtrCipher, CipherError,
    KeystreamCipher, AES_CTR_IV_SIZE,
};
pub use counter::{block_position, derive_counter, fit_to_width, CounterBlock, BLOCK_SIZE};
pub use key::CipherKey;
pub use utils::{bytes_to_hex, clear_bytes, generate_file_key, generate_iv, hex_to_bytes};
