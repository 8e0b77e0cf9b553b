//! Stage Planning
//!
//! Builds the complete, ordered command script for one signing call before
//! anything is sent. Streaming kinds split the whole canonical byte string;
//! structured kinds send the path-prefixed prelude first and then one stage
//! per recorded field span, in canonical byte order. Repeated structures
//! (credentials, attributes, removal ids) expand here, at build time.
//!
//! The exhaustive matches over [`TransactionKind`] and [`Field`] are the
//! single source of the per-kind scripts; adding a payload variant without
//! extending them is a compile error.

use crate::error::{SignerError, SignerResult};
use crate::path::KeyPath;
use crate::protocol::apdu::Command;
use crate::protocol::frames::{self, MAX_FRAME_LEN, SCHEDULE_CHUNK_LEN};
use crate::protocol::instructions::{ins, p2, stage};
use crate::transaction::{AccountTransaction, Encoded, Field, TransactionKind};

/// Build the command script for an account transaction.
pub fn build_sign_plan(
    class: u8,
    tx: &AccountTransaction,
    encoded: &Encoded,
    path: &KeyPath,
) -> SignerResult<Vec<Command>> {
    let kind = tx.kind();
    let instruction = instruction_for(kind);
    if is_streaming(kind) {
        streaming_script(class, instruction, path, &encoded.bytes)
    } else {
        Ok(structured_script(class, instruction, path, encoded))
    }
}

/// Build the command script for a public-info-for-ip signing request.
pub fn build_public_info_plan(
    class: u8,
    encoded: &Encoded,
    path: &KeyPath,
) -> SignerResult<Vec<Command>> {
    Ok(structured_script(class, ins::SIGN_PUBLIC_INFO_FOR_IP, path, encoded))
}

/// Instruction code per transaction kind
fn instruction_for(kind: TransactionKind) -> u8 {
    match kind {
        TransactionKind::DeployModule
        | TransactionKind::InitContract
        | TransactionKind::UpdateContract => ins::SIGN_CONTRACT_ACTION,
        TransactionKind::Transfer => ins::SIGN_TRANSFER,
        TransactionKind::TransferToEncrypted => ins::SIGN_TRANSFER_TO_ENCRYPTED,
        TransactionKind::TransferToPublic => ins::SIGN_TRANSFER_TO_PUBLIC,
        TransactionKind::TransferWithSchedule => ins::SIGN_TRANSFER_WITH_SCHEDULE,
        TransactionKind::UpdateCredentials => ins::SIGN_UPDATE_CREDENTIALS,
        TransactionKind::RegisterData => ins::SIGN_REGISTER_DATA,
        TransactionKind::TransferWithMemo => ins::SIGN_TRANSFER_WITH_MEMO,
        TransactionKind::TransferWithScheduleAndMemo => {
            ins::SIGN_TRANSFER_WITH_SCHEDULE_AND_MEMO
        }
        TransactionKind::ConfigureBaker => ins::SIGN_CONFIGURE_BAKER,
        TransactionKind::ConfigureDelegation => ins::SIGN_CONFIGURE_DELEGATION,
        TransactionKind::DeployCredential => ins::SIGN_CREDENTIAL_DEPLOYMENT,
    }
}

/// Kinds whose canonical bytes stream through a single counting stage
fn is_streaming(kind: TransactionKind) -> bool {
    match kind {
        TransactionKind::DeployModule
        | TransactionKind::InitContract
        | TransactionKind::UpdateContract
        | TransactionKind::Transfer
        | TransactionKind::TransferToEncrypted
        | TransactionKind::ConfigureDelegation => true,
        TransactionKind::TransferToPublic
        | TransactionKind::TransferWithSchedule
        | TransactionKind::UpdateCredentials
        | TransactionKind::RegisterData
        | TransactionKind::TransferWithMemo
        | TransactionKind::TransferWithScheduleAndMemo
        | TransactionKind::ConfigureBaker
        | TransactionKind::DeployCredential => false,
    }
}

/// Stage tag (P1) per named field
fn stage_tag(field: Field) -> u8 {
    match field {
        Field::Memo => stage::MEMO,
        Field::Amount => stage::AMOUNT,
        Field::ScheduleCount => stage::SCHEDULE_COUNT,
        Field::SchedulePairs => stage::SCHEDULE_PAIRS,
        Field::StakeParams => stage::STAKE_PARAMS,
        Field::BakerKeys => stage::BAKER_KEYS,
        Field::MetadataUrlLength => stage::METADATA_URL_LENGTH,
        Field::MetadataUrl => stage::METADATA_URL,
        Field::Commissions => stage::COMMISSIONS,
        Field::Data => stage::DATA,
        Field::RemainingAmount => stage::REMAINING_AMOUNT,
        Field::AmountAndIndex => stage::AMOUNT_AND_INDEX,
        Field::Proof => stage::PROOF,
        Field::CredentialIndex => stage::CREDENTIAL_INDEX,
        Field::CredentialKeyCount => stage::CREDENTIAL_KEY_COUNT,
        Field::CredentialKey => stage::CREDENTIAL_KEY,
        Field::CredentialFixed => stage::CREDENTIAL_FIXED,
        Field::RevocationEntry => stage::REVOCATION_ENTRY,
        Field::ValidityAndAttributeCount => stage::VALIDITY_AND_ATTRIBUTE_COUNT,
        Field::AttributeTag => stage::ATTRIBUTE_TAG,
        Field::AttributeValue => stage::ATTRIBUTE_VALUE,
        Field::CredentialProofLength => stage::CREDENTIAL_PROOF_LENGTH,
        Field::CredentialProof => stage::CREDENTIAL_PROOF,
        Field::NewOrExisting => stage::NEW_OR_EXISTING,
        Field::RemovalCount => stage::REMOVAL_COUNT,
        Field::RemovedId => stage::REMOVED_ID,
        Field::Threshold => stage::THRESHOLD,
        Field::VerificationKey => stage::VERIFICATION_KEY,
        Field::KeyThreshold => stage::KEY_THRESHOLD,
    }
}

/// Frame capacity for a field: schedule entries chunk at pair boundaries,
/// everything else at the device buffer limit.
fn chunk_len(field: Field) -> usize {
    match field {
        Field::SchedulePairs => SCHEDULE_CHUNK_LEN,
        _ => MAX_FRAME_LEN,
    }
}

fn streaming_script(
    class: u8,
    instruction: u8,
    path: &KeyPath,
    bytes: &[u8],
) -> SignerResult<Vec<Command>> {
    let split = frames::split_with_path_prefix(path, bytes, MAX_FRAME_LEN);
    if split.len() > u8::MAX as usize + 1 {
        // the counting stage tag is a single byte
        return Err(SignerError::OutOfRange { value: split.len() as u64, width: 8 });
    }

    let last = split.len() - 1;
    Ok(split
        .into_iter()
        .enumerate()
        .map(|(i, frame)| {
            let sub_stage = if i == last { p2::LAST } else { p2::MORE };
            Command::new(class, instruction, i as u8, sub_stage, frame)
        })
        .collect())
}

fn structured_script(class: u8, instruction: u8, path: &KeyPath, encoded: &Encoded) -> Vec<Command> {
    let mut commands = Vec::new();

    let prelude = &encoded.bytes[..encoded.prelude_end()];
    push_stage_frames(
        &mut commands,
        class,
        instruction,
        stage::INITIAL,
        frames::split_with_path_prefix(path, prelude, MAX_FRAME_LEN),
    );

    for span in encoded.spans() {
        push_stage_frames(
            &mut commands,
            class,
            instruction,
            stage_tag(span.field),
            frames::split(encoded.slice(span), chunk_len(span.field)),
        );
    }

    commands
}

fn push_stage_frames(
    commands: &mut Vec<Command>,
    class: u8,
    instruction: u8,
    tag: u8,
    frames: Vec<Vec<u8>>,
) {
    let last = frames.len() - 1;
    for (i, frame) in frames.into_iter().enumerate() {
        let sub_stage = if i == last { p2::LAST } else { p2::MORE };
        commands.push(Command::new(class, instruction, tag, sub_stage, frame));
    }
}
