use linekv_protocol::CodecError;

/// Errors produced by [`KvStore`](crate::KvStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Socket-level failure (connect, read, write).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Codec(#[from] CodecError),

    /// The server refused the session.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The server answered the request with an error.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The server answered with a response that does not fit the request.
    #[error("unexpected response to {request}: {response}")]
    Unexpected {
        request: &'static str,
        response: String,
    },

    /// The session was already closed.
    #[error("store session is closed")]
    Closed,
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, StoreError>;
