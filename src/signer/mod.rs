//! Device Signing
//!
//! Drives a signing call end to end: serialize the transaction, build the
//! per-kind command script, send every stage in order, and interpret the
//! terminal reply.
//!
//! Each call is strictly synchronous: a command's reply is awaited before
//! the next command exists. The device is a sequential accumulator, so a
//! decline or status error abandons its partially accumulated state; a
//! fresh call starts over from the first stage.

pub mod account;

use crate::error::{SignerError, SignerResult};
use crate::log_debug;
use crate::path::KeyPath;
use crate::protocol::{self, Command};
use crate::transaction::{self, AccountTransaction, PublicInfoForIp};
use crate::transport::{ProtocolConfig, Transport};
use serde::{Deserialize, Serialize};

/// Signature bytes returned by the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the signature as hex
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Client for one signing device
#[derive(Debug)]
pub struct DeviceSigner<T: Transport> {
    transport: T,
    config: ProtocolConfig,
}

impl<T: Transport> DeviceSigner<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ProtocolConfig::default())
    }

    pub fn with_config(transport: T, config: ProtocolConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Sign an account transaction over the given derivation path.
    ///
    /// Returns the device's signature, or [`SignerError::UserDeclined`] if
    /// the user rejected the transaction on the device.
    pub fn sign_transaction(
        &mut self,
        tx: &AccountTransaction,
        path: &KeyPath,
    ) -> SignerResult<Signature> {
        let encoded = transaction::serialize(tx)?;
        let commands = protocol::build_sign_plan(self.config.class, tx, &encoded, path)?;
        log_debug!(
            "signer",
            "signing transaction",
            kind = format!("{:?}", tx.kind()),
            canonical_len = encoded.bytes.len(),
            stages = commands.len(),
        );
        self.run_to_signature(commands)
    }

    /// Sign identity-provider registration info over the given path.
    pub fn sign_public_info(
        &mut self,
        info: &PublicInfoForIp,
        path: &KeyPath,
    ) -> SignerResult<Signature> {
        let encoded = transaction::serialize_public_info(info)?;
        let commands = protocol::build_public_info_plan(self.config.class, &encoded, path)?;
        log_debug!(
            "signer",
            "signing public info",
            canonical_len = encoded.bytes.len(),
            stages = commands.len(),
        );
        self.run_to_signature(commands)
    }

    /// Send every command in order; only the terminal reply is interpreted.
    fn run_to_signature(&mut self, commands: Vec<Command>) -> SignerResult<Signature> {
        let mut terminal = Vec::new();
        for command in &commands {
            terminal = self.transport.exchange(command)?;
        }

        // a one-byte terminal reply is the device's decline marker
        if terminal.len() == 1 {
            return Err(SignerError::UserDeclined);
        }
        Ok(Signature::from_bytes(terminal))
    }
}
