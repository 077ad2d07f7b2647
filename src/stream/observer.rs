//! Transfer notifications for the surrounding pipeline.
//!
//! Observers are informational only: nothing they do can change what the
//! stream returns.

/// The byte range requested by an `open` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Offset into the plaintext (== offset into the ciphertext).
    pub position: u64,
    /// Declared length, or `None` to read until the source ends.
    pub length: Option<u64>,
}

impl ByteRange {
    pub fn new(position: u64, length: Option<u64>) -> Self {
        Self { position, length }
    }
}

pub trait TransferObserver: Send + Sync {
    fn on_open(&self, range: &ByteRange);

    fn on_bytes(&self, count: usize);

    fn on_close(&self);
}

/// Observer that reports transfers through the `log` facade.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl TransferObserver for LoggingObserver {
    fn on_open(&self, range: &ByteRange) {
        log::info!(
            "Transfer started at offset {} (length {:?})",
            range.position,
            range.length
        );
    }

    fn on_bytes(&self, count: usize) {
        log::trace!("Transferred {} bytes", count);
    }

    fn on_close(&self) {
        log::info!("Transfer ended");
    }
}
