//! Device Transport Boundary
//!
//! The physical channel (USB/HID or otherwise) lives behind the [`Transport`]
//! trait. Implementations exchange one command frame for one reply and own
//! the trailing 2-byte status word: they check it against the accepted list
//! and strip it before this crate sees the reply.
//!
//! The device is a sequential accumulator. Commands of one signing call are
//! sent strictly one at a time, and independent signing calls against the
//! same device must be serialized by the caller; no lock is provided here.

use crate::error::{SignerError, SignerResult};
use crate::protocol::apdu::Command;
use serde::{Deserialize, Serialize};

/// Status word the device answers on success
pub const STATUS_OK: u16 = 0x9000;

/// Protocol parameters shared by every command of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Class byte for all commands
    pub class: u8,
    /// Status words treated as success
    pub accepted_status_words: Vec<u16>,
}

impl ProtocolConfig {
    pub fn is_accepted(&self, status: u16) -> bool {
        self.accepted_status_words.contains(&status)
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            class: crate::protocol::CLASS,
            accepted_status_words: vec![STATUS_OK],
        }
    }
}

/// One-command-one-reply exchange with the signing device.
pub trait Transport {
    /// Send a command frame and await its reply, with the status word
    /// already checked and stripped.
    ///
    /// Errors: [`SignerError::DeviceStatus`] for a non-accepted status word,
    /// [`SignerError::Transport`] for channel failures. The transport
    /// guarantees in-order delivery; out-of-order replies are not detected
    /// above it.
    fn exchange(&mut self, command: &Command) -> SignerResult<Vec<u8>>;
}

/// Split a raw reply into payload and status word, and check the status
/// against the accepted list. Intended for `Transport` implementations.
pub fn check_and_strip_status(mut reply: Vec<u8>, config: &ProtocolConfig) -> SignerResult<Vec<u8>> {
    if reply.len() < 2 {
        return Err(SignerError::transport(format!(
            "reply too short for a status word: {} bytes",
            reply.len()
        )));
    }
    let status = u16::from_be_bytes([reply[reply.len() - 2], reply[reply.len() - 1]]);
    reply.truncate(reply.len() - 2);

    if !config.is_accepted(status) {
        return Err(SignerError::DeviceStatus(status));
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_stripped() {
        let config = ProtocolConfig::default();
        let reply = check_and_strip_status(vec![0xAA, 0xBB, 0x90, 0x00], &config).unwrap();
        assert_eq!(reply, vec![0xAA, 0xBB]);
    }

    #[test]
    fn test_rejected_status_surfaces() {
        let config = ProtocolConfig::default();
        let result = check_and_strip_status(vec![0x6E, 0x00], &config);
        assert_eq!(result, Err(SignerError::DeviceStatus(0x6E00)));
    }

    #[test]
    fn test_extra_accepted_status() {
        let config = ProtocolConfig {
            accepted_status_words: vec![STATUS_OK, 0x9001],
            ..ProtocolConfig::default()
        };
        assert!(check_and_strip_status(vec![0x90, 0x01], &config).is_ok());
    }

    #[test]
    fn test_short_reply_is_transport_error() {
        let config = ProtocolConfig::default();
        assert!(matches!(
            check_and_strip_status(vec![0x90], &config),
            Err(SignerError::Transport(_))
        ));
    }
}
