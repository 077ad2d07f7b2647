//! Raw ciphertext sources.
//!
//! The decrypting stream never touches the filesystem itself. It asks a
//! [`SourceOpener`] for a fresh [`RawSource`] positioned at byte 0, then
//! positions it with sequential skips.

use std::io;

mod file;
mod reader;

pub use file::{FileOpener, FileSource};
pub use reader::{MemoryOpener, ReaderSource, SharedBytes};

/// A sequential byte source holding ciphertext.
pub trait RawSource {
    /// Skip up to `n` bytes and return how many were skipped. May skip
    /// fewer than `n`; `Ok(0)` for `n > 0` means the source has ended.
    fn skip(&mut self, n: u64) -> io::Result<u64>;

    /// Read up to `buf.len()` bytes. `Ok(0)` for a non-empty `buf` means the
    /// source has no more data.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Bytes remaining from the current position, if known.
    fn available_hint(&self) -> Option<u64>;

    /// Release the underlying resource.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Opens a [`RawSource`] at absolute position 0.
pub trait SourceOpener {
    type Source: RawSource;

    fn open(&self) -> io::Result<Self::Source>;

    /// Human-readable location of the source (path, `memory:` tag, ...).
    fn describe(&self) -> String;
}
