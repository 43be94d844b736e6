//! Error types for the gateway.

use cardroom_protocol::PlayerId;

/// Errors that can occur while tracking connections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// A connection with this identity is already registered.
    #[error("player {0} is already connected")]
    AlreadyRegistered(PlayerId),

    /// No connection is registered under this identity.
    #[error("player {0} is not connected")]
    NotRegistered(PlayerId),
}
