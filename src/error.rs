//! Unified error types for ColdSign
//!
//! All failures flow through `SignerError` for consistent handling at the
//! call boundary. Encoding errors are raised before any device I/O; device
//! and transport errors abort the in-flight command sequence.

use thiserror::Error;

/// Main error type for all signer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// A numeric value does not fit the declared wire width.
    ///
    /// Raised synchronously, before any command is sent.
    #[error("value {value} out of range for {width}-bit field")]
    OutOfRange { value: u64, width: u8 },

    /// A derivation path component could not be parsed.
    #[error("malformed derivation path: {0}")]
    MalformedPath(String),

    /// The user rejected the action on the device.
    ///
    /// Signaled by a terminal reply of exactly one byte.
    #[error("request declined on device")]
    UserDeclined,

    /// The device answered with a status word outside the accepted list.
    #[error("device returned status 0x{0:04X}")]
    DeviceStatus(u16),

    /// The underlying channel failed; opaque to this layer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The device reply did not have the shape the operation expects.
    #[error("unexpected device reply: {0}")]
    MalformedReply(String),
}

impl SignerError {
    pub fn transport(msg: impl Into<String>) -> Self {
        SignerError::Transport(msg.into())
    }

    pub fn malformed_path(msg: impl Into<String>) -> Self {
        SignerError::MalformedPath(msg.into())
    }

    pub fn malformed_reply(msg: impl Into<String>) -> Self {
        SignerError::MalformedReply(msg.into())
    }
}

/// Result type alias for signer operations
pub type SignerResult<T> = Result<T, SignerError>;
