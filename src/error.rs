use thiserror::Error;

#[derive(Debug, Error)]
pub enum AclError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("truncated header: expected at least 4 bytes for the version, got {len}")]
    TruncatedHeader { len: usize },

    #[error("malformed data: expected an 8 byte entry record, {remaining} bytes left")]
    MalformedData { remaining: usize },

    #[error(transparent)]
    Attribute(#[from] std::io::Error),
}
