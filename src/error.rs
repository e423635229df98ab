use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Construction or load parameters out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Raw bit buffer access past its length.
    #[error("index {index} out of range for bit buffer of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Malformed serialized filter.
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_data(msg: impl Into<String>) -> Self {
        Error::InvalidData(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
