//! Transaction Type Definitions
//!
//! The closed set of account transactions the signing device understands.
//! Every transaction is a fixed header plus exactly one payload variant; the
//! payload variant determines the one-byte kind tag written after the header.

use serde::{Deserialize, Serialize};

/// Account identifier (32 bytes)
pub type AccountAddress = [u8; 32];

/// Credential registration identifier (48 bytes)
pub type CredentialId = [u8; 48];

/// Fixed transaction header, 60 bytes on the wire.
///
/// The payload size field of the wire form is computed during serialization
/// (payload length plus one byte for the kind tag) and is deliberately not
/// representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHeader {
    /// Sender account
    pub sender: AccountAddress,

    /// Account sequence number
    pub nonce: u64,

    /// Maximum energy the transaction may consume
    pub energy: u64,

    /// Expiry as unix time in seconds
    pub expiry: u64,
}

impl TransactionHeader {
    pub fn new(sender: AccountAddress, nonce: u64, energy: u64, expiry: u64) -> Self {
        Self { sender, nonce, energy, expiry }
    }
}

/// Wire length of the serialized header
pub const HEADER_WIRE_LEN: usize = 32 + 8 + 8 + 4 + 8;

/// One-byte kind tag selecting the payload variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionKind {
    DeployModule = 0,
    InitContract = 1,
    UpdateContract = 2,
    Transfer = 3,
    TransferToEncrypted = 17,
    TransferToPublic = 18,
    TransferWithSchedule = 19,
    UpdateCredentials = 20,
    RegisterData = 21,
    TransferWithMemo = 22,
    TransferWithScheduleAndMemo = 24,
    ConfigureBaker = 25,
    ConfigureDelegation = 26,
    DeployCredential = 27,
}

impl TransactionKind {
    /// The tag byte written after the header
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// One release of a scheduled transfer: (timestamp, amount)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledRelease {
    /// Release time as unix time in milliseconds
    pub timestamp: u64,
    /// Amount released, in micro-units
    pub amount: u64,
}

impl ScheduledRelease {
    pub fn new(timestamp: u64, amount: u64) -> Self {
        Self { timestamp, amount }
    }
}

/// Wire length of one schedule entry
pub const SCHEDULE_PAIR_WIRE_LEN: usize = 16;

/// Maximum entries a transfer schedule may carry
pub const MAX_SCHEDULE_LEN: usize = 255;

/// Whether a validator pool accepts new delegators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OpenStatus {
    OpenForAll = 0,
    ClosedForNew = 1,
    ClosedForAll = 2,
}

/// Target of a delegation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelegationTarget {
    /// Delegate to the passive pool
    Passive,
    /// Delegate to a specific baker pool
    Baker(u64),
}

/// The baker key block: three verification keys, each with its ownership
/// proof. 352 bytes on the wire, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakerKeys {
    pub election_key: [u8; 32],
    #[serde(with = "crate::serde_hex")]
    pub election_proof: [u8; 64],
    pub signature_key: [u8; 32],
    #[serde(with = "crate::serde_hex")]
    pub signature_proof: [u8; 64],
    #[serde(with = "crate::serde_hex")]
    pub aggregation_key: [u8; 96],
    #[serde(with = "crate::serde_hex")]
    pub aggregation_proof: [u8; 64],
}

/// Wire length of the baker key block
pub const BAKER_KEYS_WIRE_LEN: usize = 32 + 64 + 32 + 64 + 96 + 64;

/// Optional fields of a configure-baker transaction.
///
/// Presence is encoded in a leading 16-bit bitmap; present fields follow in
/// ascending bit order. [`BakerConfiguration::bitmap`] is the single place
/// that knows the bit assignment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BakerConfiguration {
    /// Staked amount in micro-units (bit 0)
    pub stake: Option<u64>,
    /// Whether earnings are restaked automatically (bit 1)
    pub restake_earnings: Option<bool>,
    /// Pool openness (bit 2)
    pub open_status: Option<OpenStatus>,
    /// Baker key block (bit 3)
    pub keys: Option<BakerKeys>,
    /// Pool metadata URL, at most 65535 bytes (bit 4)
    pub metadata_url: Option<String>,
    /// Transaction fee commission in parts per hundred thousand (bit 5)
    pub transaction_fee_commission: Option<u32>,
    /// Baking reward commission in parts per hundred thousand (bit 6)
    pub baking_reward_commission: Option<u32>,
    /// Finalization reward commission in parts per hundred thousand (bit 7)
    pub finalization_reward_commission: Option<u32>,
}

impl BakerConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stake(mut self, stake: u64) -> Self {
        self.stake = Some(stake);
        self
    }

    pub fn with_restake_earnings(mut self, restake: bool) -> Self {
        self.restake_earnings = Some(restake);
        self
    }

    pub fn with_open_status(mut self, status: OpenStatus) -> Self {
        self.open_status = Some(status);
        self
    }

    pub fn with_keys(mut self, keys: BakerKeys) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = Some(url.into());
        self
    }

    pub fn with_commissions(mut self, transaction_fee: u32, baking: u32, finalization: u32) -> Self {
        self.transaction_fee_commission = Some(transaction_fee);
        self.baking_reward_commission = Some(baking);
        self.finalization_reward_commission = Some(finalization);
        self
    }

    /// Presence bitmap, bit n set iff the field assigned to bit n is present.
    pub fn bitmap(&self) -> u16 {
        let mut bits = 0u16;
        let flags = [
            self.stake.is_some(),
            self.restake_earnings.is_some(),
            self.open_status.is_some(),
            self.keys.is_some(),
            self.metadata_url.is_some(),
            self.transaction_fee_commission.is_some(),
            self.baking_reward_commission.is_some(),
            self.finalization_reward_commission.is_some(),
        ];
        for (bit, present) in flags.iter().enumerate() {
            if *present {
                bits |= 1 << bit;
            }
        }
        bits
    }
}

/// Optional fields of a configure-delegation transaction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DelegationConfiguration {
    /// Delegated amount in micro-units (bit 0)
    pub capital: Option<u64>,
    /// Whether earnings are restaked automatically (bit 1)
    pub restake_earnings: Option<bool>,
    /// Delegation target (bit 2)
    pub target: Option<DelegationTarget>,
}

impl DelegationConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capital(mut self, capital: u64) -> Self {
        self.capital = Some(capital);
        self
    }

    pub fn with_restake_earnings(mut self, restake: bool) -> Self {
        self.restake_earnings = Some(restake);
        self
    }

    pub fn with_target(mut self, target: DelegationTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn bitmap(&self) -> u16 {
        let mut bits = 0u16;
        if self.capital.is_some() {
            bits |= 1 << 0;
        }
        if self.restake_earnings.is_some() {
            bits |= 1 << 1;
        }
        if self.target.is_some() {
            bits |= 1 << 2;
        }
        bits
    }
}

/// One account verification key: key index, signature scheme, 32-byte key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKey {
    pub index: u8,
    pub scheme: u8,
    pub key: [u8; 32],
}

/// Wire length of one verification key entry
pub const VERIFICATION_KEY_WIRE_LEN: usize = 1 + 1 + 32;

/// Anonymity revocation record: revoker identity plus its encrypted share
/// of the credential holder's identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationEntry {
    pub revoker_id: u32,
    #[serde(with = "crate::serde_hex")]
    pub encrypted_share: [u8; 96],
}

/// Wire length of one revocation entry
pub const REVOCATION_ENTRY_WIRE_LEN: usize = 4 + 96;

/// Credential validity month, wire form year(u16) ‖ month(u8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: u16,
    pub month: u8,
}

impl YearMonth {
    pub fn new(year: u16, month: u8) -> Self {
        Self { year, month }
    }
}

/// One revealed identity attribute. The value is at most 255 bytes; its
/// length rides in a one-byte prefix next to the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub tag: u8,
    pub value: Vec<u8>,
}

/// A full account credential as deployed on chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Account verification keys
    pub keys: Vec<VerificationKey>,
    /// How many key signatures are needed
    pub key_threshold: u8,
    /// Credential registration id
    #[serde(with = "crate::serde_hex")]
    pub registration_id: CredentialId,
    /// Issuing identity provider
    pub identity_provider: u32,
    /// How many revokers must cooperate to reveal the holder
    pub revocation_threshold: u8,
    /// Per-revoker encrypted identity shares
    pub revocation_entries: Vec<RevocationEntry>,
    /// Last month the credential is valid
    pub valid_to: YearMonth,
    /// Month the credential was created
    pub created_at: YearMonth,
    /// Revealed attributes
    pub attributes: Vec<Attribute>,
    /// Zero-knowledge proof blob
    pub proof: Vec<u8>,
}

/// One new credential in an update-credentials transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialUpdate {
    /// Credential slot on the account
    pub index: u8,
    pub credential: Credential,
}

/// Payload of an update-credentials transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialUpdates {
    pub new_credentials: Vec<CredentialUpdate>,
    #[serde(with = "crate::serde_hex::hex_vec")]
    pub remove_credential_ids: Vec<CredentialId>,
    /// New account signature threshold
    pub threshold: u8,
}

/// Where a deployed credential lands: an existing account, or a fresh
/// account whose creation message expires at the given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialAccount {
    Existing(AccountAddress),
    New { expiry: u64 },
}

/// The closed set of payload variants.
///
/// Each variant carries only the fields that apply to it; the kind tag is
/// derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Opaque versioned module, caller-built
    DeployModule { module: Vec<u8> },
    /// Opaque init parameter blob, caller-built
    InitContract { payload: Vec<u8> },
    /// Opaque update parameter blob, caller-built
    UpdateContract { payload: Vec<u8> },
    Transfer {
        to: AccountAddress,
        amount: u64,
    },
    TransferToEncrypted {
        amount: u64,
    },
    TransferToPublic {
        /// Commitment to the remaining encrypted balance
        #[serde(with = "crate::serde_hex")]
        remaining_amount: [u8; 192],
        amount: u64,
        /// Index up to which incoming amounts were aggregated
        index: u64,
        proof: Vec<u8>,
    },
    TransferWithSchedule {
        to: AccountAddress,
        schedule: Vec<ScheduledRelease>,
    },
    UpdateCredentials(CredentialUpdates),
    RegisterData {
        data: Vec<u8>,
    },
    TransferWithMemo {
        to: AccountAddress,
        memo: Vec<u8>,
        amount: u64,
    },
    TransferWithScheduleAndMemo {
        to: AccountAddress,
        memo: Vec<u8>,
        schedule: Vec<ScheduledRelease>,
    },
    ConfigureBaker(BakerConfiguration),
    ConfigureDelegation(DelegationConfiguration),
    DeployCredential {
        account: CredentialAccount,
        credential: Credential,
    },
}

impl Payload {
    /// The kind tag for this payload variant
    pub fn kind(&self) -> TransactionKind {
        match self {
            Payload::DeployModule { .. } => TransactionKind::DeployModule,
            Payload::InitContract { .. } => TransactionKind::InitContract,
            Payload::UpdateContract { .. } => TransactionKind::UpdateContract,
            Payload::Transfer { .. } => TransactionKind::Transfer,
            Payload::TransferToEncrypted { .. } => TransactionKind::TransferToEncrypted,
            Payload::TransferToPublic { .. } => TransactionKind::TransferToPublic,
            Payload::TransferWithSchedule { .. } => TransactionKind::TransferWithSchedule,
            Payload::UpdateCredentials(_) => TransactionKind::UpdateCredentials,
            Payload::RegisterData { .. } => TransactionKind::RegisterData,
            Payload::TransferWithMemo { .. } => TransactionKind::TransferWithMemo,
            Payload::TransferWithScheduleAndMemo { .. } => {
                TransactionKind::TransferWithScheduleAndMemo
            }
            Payload::ConfigureBaker(_) => TransactionKind::ConfigureBaker,
            Payload::ConfigureDelegation(_) => TransactionKind::ConfigureDelegation,
            Payload::DeployCredential { .. } => TransactionKind::DeployCredential,
        }
    }
}

/// A complete unsigned account transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountTransaction {
    pub header: TransactionHeader,
    pub payload: Payload,
}

impl AccountTransaction {
    pub fn new(header: TransactionHeader, payload: Payload) -> Self {
        Self { header, payload }
    }

    pub fn kind(&self) -> TransactionKind {
        self.payload.kind()
    }
}

/// Identity-provider registration info signed on its own, outside any
/// account transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicInfoForIp {
    /// Public identity credential
    #[serde(with = "crate::serde_hex")]
    pub id_cred_pub: [u8; 48],
    /// Credential registration id
    #[serde(with = "crate::serde_hex")]
    pub reg_id: [u8; 48],
    pub verification_keys: Vec<VerificationKey>,
    pub threshold: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_are_stable() {
        assert_eq!(TransactionKind::Transfer.tag(), 3);
        assert_eq!(TransactionKind::TransferToPublic.tag(), 18);
        assert_eq!(TransactionKind::TransferWithScheduleAndMemo.tag(), 24);
        assert_eq!(TransactionKind::ConfigureDelegation.tag(), 26);
    }

    #[test]
    fn test_baker_bitmap_tracks_presence() {
        let config = BakerConfiguration::new().with_stake(500).with_keys(BakerKeys {
            election_key: [0; 32],
            election_proof: [0; 64],
            signature_key: [0; 32],
            signature_proof: [0; 64],
            aggregation_key: [0; 96],
            aggregation_proof: [0; 64],
        });
        assert_eq!(config.bitmap(), 0b1001);

        let full = config.with_restake_earnings(true).with_commissions(1, 2, 3);
        assert_eq!(full.bitmap(), 0b1110_1011);
    }

    #[test]
    fn test_delegation_bitmap() {
        let config = DelegationConfiguration::new()
            .with_capital(1_000_000)
            .with_target(DelegationTarget::Baker(42));
        assert_eq!(config.bitmap(), 0b101);
    }

    #[test]
    fn test_payload_kind_mapping() {
        let payload = Payload::Transfer { to: [1; 32], amount: 999 };
        assert_eq!(payload.kind(), TransactionKind::Transfer);

        let payload = Payload::ConfigureBaker(BakerConfiguration::new());
        assert_eq!(payload.kind(), TransactionKind::ConfigureBaker);
    }
}
