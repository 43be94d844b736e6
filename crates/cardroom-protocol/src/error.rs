//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding or validating wire data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bytes are not valid JSON, or do not match the expected shape.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The message parsed but a value in it is out of range, such as an
    /// unknown color name or an empty room code.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
