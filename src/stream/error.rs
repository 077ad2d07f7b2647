use std::io;

use thiserror::Error;

use crate::crypto::aes_ctr::CipherError;

#[derive(Debug, Error)]
pub enum DataSourceError {
    /// The raw source could not be opened or positioned at the requested offset.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[source] io::Error),
    /// Re-keying the cipher or discarding keystream failed during open.
    #[error("Stream open failed: {0}")]
    StreamOpenFailed(#[source] CipherError),
    /// The declared length runs past the end of the ciphertext.
    #[error("Truncated stream: {missing} declared bytes missing")]
    TruncatedStream { missing: u64 },
    /// Releasing the raw source failed. The stream is closed regardless.
    #[error("Close failed: {0}")]
    CloseFailed(#[source] io::Error),
    #[error("Read failed: {0}")]
    ReadFailed(#[source] io::Error),
    #[error("Decrypt failed: {0}")]
    DecryptFailed(#[source] CipherError),
    #[error("Stream is not open")]
    NotOpen,
}

impl From<DataSourceError> for io::Error {
    fn from(err: DataSourceError) -> Self {
        let kind = match &err {
            DataSourceError::SourceUnavailable(e)
            | DataSourceError::CloseFailed(e)
            | DataSourceError::ReadFailed(e) => e.kind(),
            DataSourceError::TruncatedStream { .. } => io::ErrorKind::UnexpectedEof,
            DataSourceError::NotOpen => io::ErrorKind::NotConnected,
            DataSourceError::StreamOpenFailed(_) | DataSourceError::DecryptFailed(_) => {
                io::ErrorKind::InvalidData
            }
        };
        io::Error::new(kind, err)
    }
}
