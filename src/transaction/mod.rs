//! Account Transactions
//!
//! Transaction types and their canonical wire serialization.

pub mod serialize;
pub mod types;

pub use serialize::{serialize, serialize_public_info, Encoded, Field};
pub use types::*;
