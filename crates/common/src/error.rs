use thiserror::Error;

/// Errors from the ring model shared across Floe crates.
#[derive(Debug, Error)]
pub enum RingError {
    #[error("unknown partitioner: {0}")]
    UnknownPartitioner(String),
    #[error("malformed token {token:?}: {detail}")]
    MalformedToken { token: String, detail: String },
    #[error("partitioner does not preserve key order")]
    OrderNotPreserved,
}

pub type Result<T> = std::result::Result<T, RingError>;
