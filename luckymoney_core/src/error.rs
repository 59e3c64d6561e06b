use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("denomination {0} is not in the catalog")]
    UnknownDenomination(u64),
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
