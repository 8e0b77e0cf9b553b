//! Instruction and Stage Tag Vocabulary
//!
//! Stable constants of the device protocol. One instruction byte per
//! operation family; within a family, the stage tag (P1) tells the device
//! which logical field is arriving and the sub-stage tag (P2) whether more
//! frames of that field follow. Values are fixed by the device firmware and
//! never derived at runtime.

/// Command class byte shared by every command
pub const CLASS: u8 = 0xE0;

/// Instruction codes, one per operation family
pub mod ins {
    pub const VERIFY_ADDRESS: u8 = 0x00;
    pub const GET_PUBLIC_KEY: u8 = 0x01;
    pub const SIGN_TRANSFER: u8 = 0x02;
    pub const SIGN_TRANSFER_WITH_SCHEDULE: u8 = 0x03;
    pub const SIGN_CREDENTIAL_DEPLOYMENT: u8 = 0x04;
    pub const EXPORT_PRIVATE_KEY: u8 = 0x05;
    /// Shared by deploy-module, init-contract and update-contract; the
    /// device distinguishes them by the kind tag inside the stream.
    pub const SIGN_CONTRACT_ACTION: u8 = 0x06;
    pub const SIGN_TRANSFER_TO_ENCRYPTED: u8 = 0x11;
    pub const SIGN_TRANSFER_TO_PUBLIC: u8 = 0x12;
    pub const SIGN_CONFIGURE_DELEGATION: u8 = 0x17;
    pub const SIGN_CONFIGURE_BAKER: u8 = 0x18;
    pub const SIGN_PUBLIC_INFO_FOR_IP: u8 = 0x20;
    pub const GET_APP_INFO: u8 = 0x21;
    pub const SIGN_UPDATE_CREDENTIALS: u8 = 0x31;
    pub const SIGN_TRANSFER_WITH_MEMO: u8 = 0x32;
    pub const SIGN_TRANSFER_WITH_SCHEDULE_AND_MEMO: u8 = 0x34;
    pub const SIGN_REGISTER_DATA: u8 = 0x35;
}

/// Sub-stage tags (P2)
pub mod p2 {
    /// More frames of the current stage follow
    pub const MORE: u8 = 0x80;
    /// Last (or only) frame of the stage
    pub const LAST: u8 = 0x00;
}

/// Stage tags (P1) for structured signing families.
///
/// `INITIAL` opens every staged exchange with the path-prefixed leading
/// bytes. The remaining tags are field codes; each family uses the subset
/// that applies to it.
pub mod stage {
    /// Path prefix, header, kind tag and leading fixed fields
    pub const INITIAL: u8 = 0x00;

    // transfers with memo and/or schedule
    pub const MEMO: u8 = 0x01;
    pub const AMOUNT: u8 = 0x02;
    pub const SCHEDULE_COUNT: u8 = 0x02;
    pub const SCHEDULE_PAIRS: u8 = 0x03;

    // configure baker
    pub const STAKE_PARAMS: u8 = 0x01;
    pub const BAKER_KEYS: u8 = 0x02;
    pub const METADATA_URL_LENGTH: u8 = 0x03;
    pub const METADATA_URL: u8 = 0x04;
    pub const COMMISSIONS: u8 = 0x05;

    // register data
    pub const DATA: u8 = 0x01;

    // transfer to public
    pub const REMAINING_AMOUNT: u8 = 0x01;
    pub const AMOUNT_AND_INDEX: u8 = 0x02;
    pub const PROOF: u8 = 0x03;

    // credential deployment / update credentials
    pub const CREDENTIAL_INDEX: u8 = 0x01;
    pub const NEW_OR_EXISTING: u8 = 0x01;
    pub const CREDENTIAL_KEY_COUNT: u8 = 0x02;
    pub const CREDENTIAL_KEY: u8 = 0x03;
    pub const CREDENTIAL_FIXED: u8 = 0x04;
    pub const REVOCATION_ENTRY: u8 = 0x05;
    pub const VALIDITY_AND_ATTRIBUTE_COUNT: u8 = 0x06;
    pub const ATTRIBUTE_TAG: u8 = 0x07;
    pub const ATTRIBUTE_VALUE: u8 = 0x08;
    pub const CREDENTIAL_PROOF_LENGTH: u8 = 0x09;
    pub const CREDENTIAL_PROOF: u8 = 0x0A;
    pub const REMOVAL_COUNT: u8 = 0x0B;
    pub const REMOVED_ID: u8 = 0x0C;
    pub const THRESHOLD: u8 = 0x0D;

    // public info for identity provider
    pub const VERIFICATION_KEY: u8 = 0x01;
    pub const KEY_THRESHOLD: u8 = 0x02;
}

/// P1 values for key material queries
pub mod key_display {
    /// Return the key without on-device confirmation
    pub const SILENT: u8 = 0x00;
    /// Ask the user to confirm on the device first
    pub const CONFIRM: u8 = 0x01;
}
