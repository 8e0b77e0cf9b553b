//! ColdSign Client Library
//!
//! Client for the ColdSign hardware signing device: canonical account
//! transaction serialization and the staged, length-bounded command protocol
//! that delivers it to the device for signing.
//!
//! # Architecture
//!
//! This crate provides:
//! - **path**: derivation path parsing and binary encoding
//! - **transaction**: transaction types and canonical wire serialization
//! - **protocol**: frame splitting, command framing, per-kind stage scripts
//! - **transport**: the boundary trait to the physical channel
//! - **signer**: the per-call dispatcher and account key operations
//!
//! # Signing model
//!
//! A transaction is serialized once into its canonical bytes, cut into
//! frames of at most 255 bytes, and delivered as a fixed sequence of staged
//! commands. Only the terminal reply is interpreted: signature bytes on
//! success, a one-byte reply when the user declines on the device.
//!
//! Calls are strictly synchronous and the device accumulates state across
//! the stages of one call, so independent signing calls against the same
//! device must be serialized by the caller.
//!
//! # Security
//!
//! Exported private key material is held in a zeroize-on-drop wrapper and
//! is redacted from all log output.
//!
//! # Example
//!
//! ```rust,ignore
//! use coldsign::{AccountTransaction, DeviceSigner, KeyPath, Payload, TransactionHeader};
//!
//! let path = KeyPath::parse("44'/919'/0'/0/0")?;
//! let tx = AccountTransaction::new(
//!     TransactionHeader::new(sender, nonce, energy, expiry),
//!     Payload::Transfer { to, amount: 999 },
//! );
//! let mut signer = DeviceSigner::new(transport);
//! let signature = signer.sign_transaction(&tx, &path)?;
//! println!("signature: {}", signature);
//! ```

pub mod encode;
pub mod error;
pub mod path;
pub mod protocol;
pub mod serde_hex;
pub mod signer;
pub mod transaction;
pub mod transport;
pub mod utils;

// Re-export key types for convenience
pub use error::{SignerError, SignerResult};
pub use path::{KeyPath, PathComponent, HARDENED};
pub use protocol::Command;
pub use signer::account::{AppInfo, PrivateKey, PublicKey, VerifyOutcome};
pub use signer::{DeviceSigner, Signature};
pub use transaction::{
    AccountTransaction, Payload, PublicInfoForIp, TransactionHeader, TransactionKind,
};
pub use transport::{ProtocolConfig, Transport};
