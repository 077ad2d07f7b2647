//! Seekable AES-CTR decryption for media playback.
//!
//! [`stream::EncryptedDataSource`] turns an encrypted file into a byte
//! source that can be opened at any offset without decrypting what comes
//! before it. The counter block for the offset is derived with
//! [`crypto::derive_counter`], the cipher is re-keyed there, and the
//! in-block remainder of keystream is discarded.

pub mod config;
pub mod crypto;
pub mod factory;
pub mod source;
pub mod stream;

pub use config::StreamConfig;
pub use factory::{EncryptedDataSourceFactory, FileDataSource};
pub use stream::{ByteRange, DataSourceError, EncryptedDataSource, ReadOutcome, TransferObserver};
