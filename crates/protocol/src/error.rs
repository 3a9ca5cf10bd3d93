//! Errors raised while decoding or encoding a wire line.

/// Failures in parsing a request line or encoding a response line.
///
/// Distinct from [`corelib::Error`]: this is transport-layer ("Transport"
/// in the error taxonomy), not a DICT3 operation outcome.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown method {0:?}")]
    UnknownMethod(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
