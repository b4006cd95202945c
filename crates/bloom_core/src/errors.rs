use thiserror::Error;

#[derive(Debug, Error)]
pub enum BloomError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Persist: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Bit index {index} out of range for {len} bits")]
    IndexOutOfRange { index: u64, len: u64 },

    #[error("Incompatible filters: {0}")]
    Incompatible(String),
}

pub type Result<T> = std::result::Result<T, BloomError>;
