//! Account Key Operations
//!
//! Single-frame request/response exchanges that share the signing
//! transport: public key queries, on-device address verification, private
//! key export and the app info probe.
//!
//! Key material replies are a one-byte length prefix followed by the key
//! bytes. Verify replies carry no payload at all; any accepted status is
//! success.

use crate::error::{SignerError, SignerResult};
use crate::path::KeyPath;
use crate::protocol::instructions::{ins, key_display, p2};
use crate::protocol::Command;
use crate::signer::DeviceSigner;
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Public key bytes returned by the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Exported private key material. Zeroed on drop; never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(Vec<u8>);

impl PrivateKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey([REDACTED:{}bytes])", self.0.len())
    }
}

/// Outcome of an on-device address verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    Ok,
    Failed,
}

impl VerifyOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            VerifyOutcome::Ok => "ok",
            VerifyOutcome::Failed => "failed",
        }
    }
}

impl std::fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and version reported by the device app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl<T: Transport> DeviceSigner<T> {
    /// Fetch the public key for a derivation path. With `confirm` the
    /// device shows the key and waits for the user before answering.
    pub fn get_public_key(&mut self, path: &KeyPath, confirm: bool) -> SignerResult<PublicKey> {
        let display = if confirm { key_display::CONFIRM } else { key_display::SILENT };
        let command =
            Command::new(self.config().class, ins::GET_PUBLIC_KEY, display, p2::LAST, path.encode());
        let reply = self.exchange_single(&command)?;
        Ok(PublicKey(parse_length_prefixed(&reply)?))
    }

    /// Export the private key for a derivation path. Always requires
    /// on-device confirmation.
    pub fn export_private_key(&mut self, path: &KeyPath) -> SignerResult<PrivateKey> {
        let command = Command::new(
            self.config().class,
            ins::EXPORT_PRIVATE_KEY,
            key_display::CONFIRM,
            p2::LAST,
            path.encode(),
        );
        let reply = self.exchange_single(&command)?;
        Ok(PrivateKey(parse_length_prefixed(&reply)?))
    }

    /// Ask the device to derive and display the address for an identity and
    /// credential counter. The reply carries no payload: an accepted status
    /// is success, a device status error is a failed verification.
    pub fn verify_address(
        &mut self,
        identity: u32,
        credential_counter: u32,
    ) -> SignerResult<VerifyOutcome> {
        let mut data = Vec::with_capacity(8);
        data.extend_from_slice(&identity.to_be_bytes());
        data.extend_from_slice(&credential_counter.to_be_bytes());
        let command = Command::new(self.config().class, ins::VERIFY_ADDRESS, 0, p2::LAST, data);

        match self.exchange_single(&command) {
            Ok(_) => Ok(VerifyOutcome::Ok),
            Err(SignerError::DeviceStatus(_)) | Err(SignerError::UserDeclined) => {
                Ok(VerifyOutcome::Failed)
            }
            Err(other) => Err(other),
        }
    }

    /// Query the device app's name and version.
    pub fn get_app_info(&mut self) -> SignerResult<AppInfo> {
        let command =
            Command::new(self.config().class, ins::GET_APP_INFO, 0, p2::LAST, Vec::new());
        let reply = self.exchange_single(&command)?;

        let name = parse_length_prefixed_at(&reply, 3)?;
        let version = &reply[reply.len() - 3..];
        Ok(AppInfo {
            name: String::from_utf8_lossy(&name).into_owned(),
            major: version[0],
            minor: version[1],
            patch: version[2],
        })
    }

    fn exchange_single(&mut self, command: &Command) -> SignerResult<Vec<u8>> {
        let reply = self.transport.exchange(command)?;
        if reply.len() == 1 {
            return Err(SignerError::UserDeclined);
        }
        Ok(reply)
    }
}

/// Parse `[len] ‖ payload`, requiring the reply to be exactly that long.
fn parse_length_prefixed(reply: &[u8]) -> SignerResult<Vec<u8>> {
    parse_length_prefixed_at(reply, 0)
}

/// Parse `[len] ‖ payload` with `trailing` extra bytes allowed after it.
fn parse_length_prefixed_at(reply: &[u8], trailing: usize) -> SignerResult<Vec<u8>> {
    let len = *reply.first().ok_or_else(|| {
        SignerError::malformed_reply("empty reply where key material was expected")
    })? as usize;

    if reply.len() != 1 + len + trailing {
        return Err(SignerError::malformed_reply(format!(
            "length prefix {} does not match reply of {} bytes",
            len,
            reply.len()
        )));
    }
    Ok(reply[1..1 + len].to_vec())
}
