//! Client error types for the backend SDK

/// Errors raised while constructing or calling a backend client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported backend type '{0}'")]
    UnsupportedType(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A multi-transaction write failed after earlier transactions committed
    #[error(
        "namespace partially updated: {committed} of {total} keys committed before failure: {source}"
    )]
    PartialWrite {
        committed: usize,
        total: usize,
        source: Box<ClientError>,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;
