//! `RawSource` over any `io::Read`, plus an in-memory opener.

use std::io::{self, Cursor, Read};
use std::sync::Arc;

use super::{RawSource, SourceOpener};

/// Wraps a reader. Skips are performed by reading and dropping bytes.
pub struct ReaderSource<R> {
    inner: R,
    /// Remaining byte count, when the total length was known up front.
    remaining: Option<u64>,
}

impl<R: Read> ReaderSource<R> {
    /// Reader of unknown length.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            remaining: None,
        }
    }

    /// Reader whose total length is `len` bytes.
    pub fn with_len(inner: R, len: u64) -> Self {
        Self {
            inner,
            remaining: Some(len),
        }
    }

    fn consumed(&mut self, n: u64) {
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(n);
        }
    }
}

impl<R: Read> RawSource for ReaderSource<R> {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        let skipped = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())?;
        self.consumed(skipped);
        Ok(skipped)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => {
                    self.consumed(n as u64);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn available_hint(&self) -> Option<u64> {
        self.remaining
    }
}

/// Opens independent cursors over a shared in-memory ciphertext.
#[derive(Clone)]
pub struct MemoryOpener {
    data: Arc<[u8]>,
}

impl MemoryOpener {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }
}

/// Shared buffer viewed as a byte slice, so cursors can share one allocation.
#[derive(Clone)]
pub struct SharedBytes(Arc<[u8]>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl SourceOpener for MemoryOpener {
    type Source = ReaderSource<Cursor<SharedBytes>>;

    fn open(&self) -> io::Result<Self::Source> {
        let len = self.data.len() as u64;
        Ok(ReaderSource::with_len(
            Cursor::new(SharedBytes(Arc::clone(&self.data))),
            len,
        ))
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_and_read() {
        let mut source = ReaderSource::with_len(Cursor::new(b"0123456789".to_vec()), 10);
        assert_eq!(source.skip(4).unwrap(), 4);
        assert_eq!(source.available_hint(), Some(6));

        let mut buf = [0u8; 3];
        assert_eq!(RawSource::read(&mut source, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"456");
        assert_eq!(source.available_hint(), Some(3));
    }

    #[test]
    fn test_short_skip_at_end() {
        let mut source = ReaderSource::new(Cursor::new(b"abc".to_vec()));
        assert_eq!(source.skip(10).unwrap(), 3);
        assert_eq!(source.available_hint(), None);
        let mut buf = [0u8; 4];
        assert_eq!(RawSource::read(&mut source, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_memory_opener_independent_cursors() {
        let opener = MemoryOpener::new(b"hello".to_vec());
        let mut a = opener.open().unwrap();
        let mut b = opener.open().unwrap();
        a.skip(2).unwrap();

        let mut buf = [0u8; 5];
        let n = RawSource::read(&mut b, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
        assert_eq!(a.available_hint(), Some(3));
        assert_eq!(opener.describe(), "memory:5");
    }
}
