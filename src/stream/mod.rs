//! Seekable decrypting stream over counter-mode ciphertext.
//!
//! Opening at an offset skips the raw source to that byte, re-keys the
//! cipher at the counter block containing it and burns the in-block
//! remainder of that block's keystream. After that every ciphertext byte read
//! is decrypted one-to-one, with no buffering.
//!
//! Lifecycle: `Closed --open--> Open --read*--> Open --close--> Closed`.
//! All operations take `&mut self`; one caller drives a stream at a time.

use std::io;
use std::sync::Arc;

use crate::crypto::aes_ctr::{CipherError, KeystreamCipher};
use crate::crypto::counter::{block_position, derive_counter, CounterBlock, BLOCK_SIZE};
use crate::crypto::utils::clear_bytes;
use crate::source::{RawSource, SourceOpener};

mod error;
mod observer;


pub use error::DataSourceError;
pub use observer::{ByteRange, LoggingObserver, TransferObserver};

/// Result of a successful `read` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many plaintext bytes were written to the front of the buffer.
    Data(usize),
    EndOfStream,
}

struct OpenStream<S> {
    source: S,
    /// `None` when the length is unknown.
    bytes_remaining: Option<u64>,
    uri: String,
}

enum StreamState<S> {
    Closed,
    Open(OpenStream<S>),
}

/// Decrypting data source that can be opened at any byte offset.
pub struct EncryptedDataSource<O: SourceOpener, C: KeystreamCipher> {
    opener: O,
    cipher: C,
    base_counter: CounterBlock,
    observer: Option<Arc<dyn TransferObserver>>,
    state: StreamState<O::Source>,
}

impl<O: SourceOpener, C: KeystreamCipher> EncryptedDataSource<O, C> {
    /// Create a closed stream. `base_counter` is the IV the file was
    /// encrypted with; it must be exactly one cipher block wide.
    pub fn new(opener: O, cipher: C, base_counter: CounterBlock) -> Result<Self, CipherError> {
        if cipher.block_size() != BLOCK_SIZE {
            return Err(CipherError::InvalidIvSize(cipher.block_size()));
        }
        Ok(Self {
            opener,
            cipher,
            base_counter,
            observer: None,
            state: StreamState::Closed,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn TransferObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, StreamState::Open(_))
    }

    /// Remaining byte budget while open. `None` when closed or unbounded.
    pub fn bytes_remaining(&self) -> Option<u64> {
        match &self.state {
            StreamState::Open(open) => open.bytes_remaining,
            StreamState::Closed => None,
        }
    }

    /// Location of the open source, `None` when closed.
    pub fn uri(&self) -> Option<&str> {
        match &self.state {
            StreamState::Open(open) => Some(&open.uri),
            StreamState::Closed => None,
        }
    }

    /// Open the stream so the next read returns plaintext byte `offset`.
    ///
    /// Returns the remaining byte budget: `declared_length` when given, else
    /// the source's available-byte hint, else `None`. Calling `open` on an
    /// open stream does nothing and returns the current budget.
    pub fn open(
        &mut self,
        offset: u64,
        declared_length: Option<u64>,
    ) -> Result<Option<u64>, DataSourceError> {
        if let StreamState::Open(open) = &self.state {
            return Ok(open.bytes_remaining);
        }

        let mut source = self
            .opener
            .open()
            .map_err(DataSourceError::SourceUnavailable)?;

        if let Err(e) = self.position(&mut source, offset) {
            self.cipher.reset();
            if let Err(close_err) = source.close() {
                log::warn!("Failed to release source after open error: {}", close_err);
            }
            return Err(e);
        }

        let bytes_remaining = declared_length.or_else(|| source.available_hint());
        let range = ByteRange::new(offset, declared_length);
        self.state = StreamState::Open(OpenStream {
            source,
            bytes_remaining,
            uri: self.opener.describe(),
        });

        if let Some(observer) = &self.observer {
            observer.on_open(&range);
        }
        Ok(bytes_remaining)
    }

    /// Skip the source to `offset` and align the keystream with it.
    fn position(&mut self, source: &mut O::Source, offset: u64) -> Result<(), DataSourceError> {
        let mut skipped = 0u64;
        while skipped < offset {
            let n = source
                .skip(offset - skipped)
                .map_err(DataSourceError::SourceUnavailable)?;
            if n == 0 {
                break;
            }
            skipped += n;
        }
        if skipped < offset {
            return Err(DataSourceError::SourceUnavailable(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("source ended at byte {} before offset {}", skipped, offset),
            )));
        }

        let (block_index, in_block_offset) = block_position(offset, BLOCK_SIZE);
        let counter = derive_counter(&self.base_counter, block_index);
        self.cipher
            .init(&counter)
            .map_err(DataSourceError::StreamOpenFailed)?;

        if in_block_offset > 0 {
            let mut discard = [0u8; BLOCK_SIZE];
            let result = self.cipher.process(&mut discard[..in_block_offset]);
            clear_bytes(&mut discard);
            result.map_err(DataSourceError::StreamOpenFailed)?;
        }

        log::debug!(
            "Positioned {} at offset {} (block {}, discarded {} keystream bytes)",
            self.opener.describe(),
            offset,
            block_index,
            in_block_offset
        );
        Ok(())
    }

    /// Read and decrypt up to `buf.len()` bytes into the front of `buf`.
    ///
    /// An empty `buf` always yields `Data(0)`, even at the end of the stream.
    /// When the source runs dry before a declared length is exhausted the
    /// read fails with `TruncatedStream`.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, DataSourceError> {
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }
        let open = match &mut self.state {
            StreamState::Open(open) => open,
            StreamState::Closed => return Err(DataSourceError::NotOpen),
        };

        let to_read = match open.bytes_remaining {
            Some(0) => return Ok(ReadOutcome::EndOfStream),
            Some(remaining) => usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len())),
            None => buf.len(),
        };

        let chunk = &mut buf[..to_read];
        let n = open
            .source
            .read(chunk)
            .map_err(DataSourceError::ReadFailed)?;
        if n == 0 {
            return match open.bytes_remaining {
                Some(missing) => Err(DataSourceError::TruncatedStream { missing }),
                None => Ok(ReadOutcome::EndOfStream),
            };
        }

        if let Err(e) = self.cipher.process(&mut chunk[..n]) {
            // Ciphertext was consumed without keystream; the stream is misaligned.
            if let Err(close_err) = self.close() {
                log::warn!("Failed to release source after decrypt error: {}", close_err);
            }
            return Err(DataSourceError::DecryptFailed(e));
        }

        if let Some(remaining) = open.bytes_remaining.as_mut() {
            *remaining -= n as u64;
        }
        if let Some(observer) = &self.observer {
            observer.on_bytes(n);
        }
        Ok(ReadOutcome::Data(n))
    }

    /// Release the source and keystream. Always leaves the stream closed;
    /// a release failure is returned once as `CloseFailed`.
    pub fn close(&mut self) -> Result<(), DataSourceError> {
        let state = std::mem::replace(&mut self.state, StreamState::Closed);
        self.cipher.reset();

        let StreamState::Open(mut open) = state else {
            return Ok(());
        };
        let result = open.source.close();
        drop(open);

        if let Some(observer) = &self.observer {
            observer.on_close();
        }
        result.map_err(DataSourceError::CloseFailed)
    }
}

impl<O: SourceOpener, C: KeystreamCipher> io::Read for EncryptedDataSource<O, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match EncryptedDataSource::read(self, buf)? {
            ReadOutcome::Data(n) => Ok(n),
            ReadOutcome::EndOfStream => Ok(0),
        }
    }
}

impl<O: SourceOpener, C: KeystreamCipher> Drop for EncryptedDataSource<O, C> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to close encrypted data source: {}", e);
        }
    }
}
