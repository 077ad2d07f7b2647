//! File-backed ciphertext source.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::{RawSource, SourceOpener};

/// An encrypted file opened for sequential reading.
///
/// Skips use a relative seek clamped to the file length so the reported
/// skip count matches what a sequential read would have consumed.
pub struct FileSource {
    file: Option<File>,
    len: u64,
    pos: u64,
}

impl FileSource {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file: Some(file),
            len,
            pos: 0,
        })
    }

    fn file(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "file source closed"))
    }
}

impl RawSource for FileSource {
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        let step = n.min(self.len.saturating_sub(self.pos));
        let target = self.pos + step;
        self.file()?.seek(SeekFrom::Start(target))?;
        self.pos = target;
        Ok(step)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let file = self.file()?;
        let n = loop {
            match file.read(buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        self.pos += n as u64;
        Ok(n)
    }

    fn available_hint(&self) -> Option<u64> {
        Some(self.len.saturating_sub(self.pos))
    }

    fn close(&mut self) -> io::Result<()> {
        drop(self.file.take());
        Ok(())
    }
}

/// Opens an encrypted file by path.
#[derive(Debug, Clone)]
pub struct FileOpener {
    path: PathBuf,
}

impl FileOpener {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SourceOpener for FileOpener {
    type Source = FileSource;

    fn open(&self) -> io::Result<FileSource> {
        FileSource::open(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_file(name: &str, content: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cipherbox-stream-{}", name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_skip_read_and_available() {
        let path = temp_file("file-source-skip", b"0123456789");
        let mut source = FileSource::open(&path).unwrap();
        assert_eq!(source.available_hint(), Some(10));

        assert_eq!(source.skip(7).unwrap(), 7);
        assert_eq!(source.available_hint(), Some(3));

        let mut buf = [0u8; 8];
        let n = source.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"789");
        assert_eq!(source.available_hint(), Some(0));

        source.close().unwrap();
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_skip_clamps_to_length() {
        let path = temp_file("file-source-clamp", b"abc");
        let mut source = FileSource::open(&path).unwrap();
        assert_eq!(source.skip(100).unwrap(), 3);
        assert_eq!(source.skip(1).unwrap(), 0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_read_after_close_fails() {
        let path = temp_file("file-source-closed", b"abc");
        let mut source = FileSource::open(&path).unwrap();
        source.close().unwrap();
        source.close().unwrap();
        assert!(source.read(&mut [0u8; 1]).is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_opener_missing_file() {
        let opener = FileOpener::new(std::env::temp_dir().join("cipherbox-stream-does-not-exist"));
        let err = opener.open().err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
