//! Factory producing file-backed decrypting data sources.
//!
//! A media pipeline asks for a new data source per load; every source shares
//! the same key, base counter and optional transfer observer.

use std::path::Path;
use std::sync::Arc;

use crate::config::StreamConfig;
use crate::crypto::aes_ctr::{AesCtrCipher, CipherError};
use crate::source::FileOpener;
use crate::stream::{EncryptedDataSource, TransferObserver};

/// Data source type handed out by [`EncryptedDataSourceFactory`].
pub type FileDataSource = EncryptedDataSource<FileOpener, AesCtrCipher>;

pub struct EncryptedDataSourceFactory {
    config: StreamConfig,
    observer: Option<Arc<dyn TransferObserver>>,
}

impl EncryptedDataSourceFactory {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TransferObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Create a closed data source for the encrypted file at `path`.
    pub fn create_data_source(&self, path: &Path) -> Result<FileDataSource, CipherError> {
        let cipher = AesCtrCipher::new(self.config.key.clone())?;
        let source = EncryptedDataSource::new(FileOpener::new(path), cipher, self.config.iv)?;
        Ok(match &self.observer {
            Some(observer) => source.with_observer(Arc::clone(observer)),
            None => source,
        })
    }
}
