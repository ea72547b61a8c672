use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Failed to read `{key}` from storage: {source}")]
    StorageRead {
        key: String,
        #[source]
        source: BoxError,
    },
    #[error("Failed to write `{key}` to storage: {source}")]
    StorageWrite {
        key: String,
        #[source]
        source: BoxError,
    },
}

impl LedgerError {
    pub(crate) fn read(key: &str, source: LedgerError) -> Self {
        Self::StorageRead {
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn write(key: &str, source: LedgerError) -> Self {
        Self::StorageWrite {
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
