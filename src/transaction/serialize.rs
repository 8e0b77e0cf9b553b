//! Canonical Transaction Serialization
//!
//! Produces the single flat byte form the device signs over:
//! `header ‖ kind tag ‖ payload`, all integers big-endian. Serialization is
//! two-pass by construction: the payload is built first, then the header is
//! written with `payload_size = payload length + 1` (the kind tag byte).
//!
//! While writing, the serializer records a named span for every unit the
//! staged protocol later sends on its own. Presence of an optional bitmap
//! field and its byte range are therefore decided exactly once, here; the
//! dispatcher only slices.

use crate::encode::{Span, Writer};
use crate::error::SignerResult;
use crate::transaction::types::*;

/// Logical fields the staged protocol addresses individually.
///
/// Fields that only ever travel inside the leading frame of a staged
/// exchange (header, kind tag, receiver, length prefixes of the first frame)
/// are not named; they are covered by the initial stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Memo bytes, without the u16 length prefix
    Memo,
    /// Trailing amount of a memo transfer
    Amount,
    /// Schedule entry count when it follows a memo
    ScheduleCount,
    /// Concatenated (timestamp, amount) schedule entries
    SchedulePairs,
    /// Present subset of stake / restake / open status
    StakeParams,
    /// 352-byte baker key block
    BakerKeys,
    /// u16 metadata URL length
    MetadataUrlLength,
    /// Metadata URL bytes
    MetadataUrl,
    /// Present subset of the three commission rates
    Commissions,
    /// Registered data bytes, without the u16 length prefix
    Data,
    /// 192-byte commitment to the remaining encrypted balance
    RemainingAmount,
    /// amount ‖ aggregation index ‖ u16 proof length
    AmountAndIndex,
    /// Transfer-to-public proof bytes
    Proof,
    /// Credential slot index in an update-credentials transaction
    CredentialIndex,
    /// u8 number of verification keys
    CredentialKeyCount,
    /// One verification key entry (index ‖ scheme ‖ key)
    CredentialKey,
    /// key threshold ‖ registration id ‖ identity provider ‖
    /// revocation threshold ‖ u16 revocation entry count
    CredentialFixed,
    /// One revocation entry (revoker id ‖ encrypted share)
    RevocationEntry,
    /// valid_to ‖ created_at ‖ u16 attribute count
    ValidityAndAttributeCount,
    /// One attribute tag ‖ u8 value length
    AttributeTag,
    /// One attribute value
    AttributeValue,
    /// u32 credential proof length
    CredentialProofLength,
    /// Credential proof bytes
    CredentialProof,
    /// Discriminator byte plus existing address or new-account expiry
    NewOrExisting,
    /// u8 number of credential ids to remove
    RemovalCount,
    /// One 48-byte credential id to remove
    RemovedId,
    /// New account signature threshold
    Threshold,
    /// One verification key of a public-info-for-ip request
    VerificationKey,
    /// Key threshold of a public-info-for-ip request
    KeyThreshold,
}

type TxWriter = Writer<Field>;

/// Canonical bytes plus the named spans recorded while writing them
#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    spans: Vec<Span<Field>>,
}

impl Encoded {
    /// Spans in the order they were written
    pub fn spans(&self) -> &[Span<Field>] {
        &self.spans
    }

    /// End of the leading stretch no span claims: everything before the
    /// first named field belongs to the initial stage.
    pub fn prelude_end(&self) -> usize {
        self.spans.first().map_or(self.bytes.len(), |s| s.range.start)
    }

    /// Bytes of a span
    pub fn slice(&self, span: &Span<Field>) -> &[u8] {
        &self.bytes[span.range.clone()]
    }
}

/// Serialize a complete account transaction into its canonical form.
pub fn serialize(tx: &AccountTransaction) -> SignerResult<Encoded> {
    let payload = serialize_payload(&tx.payload)?;

    let mut w = TxWriter::with_capacity(HEADER_WIRE_LEN + 1 + payload.len());
    w.put_bytes(&tx.header.sender);
    w.put_u64(tx.header.nonce);
    w.put_u64(tx.header.energy);
    w.checked_u32(payload.len() as u64 + 1)?;
    w.put_u64(tx.header.expiry);
    w.put_u8(tx.payload.kind().tag());
    w.absorb(payload);

    let (bytes, spans) = w.finish();
    Ok(Encoded { bytes, spans })
}

/// Serialize a public-info-for-ip request. Not an account transaction: no
/// header and no kind tag, just the registration info in wire order.
pub fn serialize_public_info(info: &PublicInfoForIp) -> SignerResult<Encoded> {
    let mut w = TxWriter::new();
    w.put_bytes(&info.id_cred_pub);
    w.put_bytes(&info.reg_id);
    w.checked_u8(info.verification_keys.len() as u64)?;
    for key in &info.verification_keys {
        w.spanned(Field::VerificationKey, |w| {
            write_verification_key(w, key);
            Ok(())
        })?;
    }
    w.spanned(Field::KeyThreshold, |w| {
        w.put_u8(info.threshold);
        Ok(())
    })?;

    let (bytes, spans) = w.finish();
    Ok(Encoded { bytes, spans })
}

fn serialize_payload(payload: &Payload) -> SignerResult<TxWriter> {
    let mut w = TxWriter::new();
    match payload {
        Payload::DeployModule { module } => w.put_bytes(module),
        Payload::InitContract { payload } => w.put_bytes(payload),
        Payload::UpdateContract { payload } => w.put_bytes(payload),

        Payload::Transfer { to, amount } => {
            w.put_bytes(to);
            w.put_u64(*amount);
        }

        Payload::TransferToEncrypted { amount } => {
            w.put_u64(*amount);
        }

        Payload::TransferToPublic { remaining_amount, amount, index, proof } => {
            w.spanned(Field::RemainingAmount, |w| {
                w.put_bytes(remaining_amount);
                Ok(())
            })?;
            w.spanned(Field::AmountAndIndex, |w| {
                w.put_u64(*amount);
                w.put_u64(*index);
                w.checked_u16(proof.len() as u64)
            })?;
            w.spanned(Field::Proof, |w| {
                w.put_bytes(proof);
                Ok(())
            })?;
        }

        Payload::TransferWithSchedule { to, schedule } => {
            w.put_bytes(to);
            w.checked_u8(schedule.len() as u64)?;
            w.spanned(Field::SchedulePairs, |w| {
                write_schedule(w, schedule);
                Ok(())
            })?;
        }

        Payload::UpdateCredentials(updates) => {
            w.checked_u8(updates.new_credentials.len() as u64)?;
            for update in &updates.new_credentials {
                w.spanned(Field::CredentialIndex, |w| {
                    w.put_u8(update.index);
                    Ok(())
                })?;
                write_credential(&mut w, &update.credential)?;
            }
            w.spanned(Field::RemovalCount, |w| {
                w.checked_u8(updates.remove_credential_ids.len() as u64)
            })?;
            for id in &updates.remove_credential_ids {
                w.spanned(Field::RemovedId, |w| {
                    w.put_bytes(id);
                    Ok(())
                })?;
            }
            w.spanned(Field::Threshold, |w| {
                w.put_u8(updates.threshold);
                Ok(())
            })?;
        }

        Payload::RegisterData { data } => {
            w.checked_u16(data.len() as u64)?;
            w.spanned(Field::Data, |w| {
                w.put_bytes(data);
                Ok(())
            })?;
        }

        Payload::TransferWithMemo { to, memo, amount } => {
            w.put_bytes(to);
            w.checked_u16(memo.len() as u64)?;
            w.spanned(Field::Memo, |w| {
                w.put_bytes(memo);
                Ok(())
            })?;
            w.spanned(Field::Amount, |w| {
                w.put_u64(*amount);
                Ok(())
            })?;
        }

        Payload::TransferWithScheduleAndMemo { to, memo, schedule } => {
            w.put_bytes(to);
            w.checked_u16(memo.len() as u64)?;
            w.spanned(Field::Memo, |w| {
                w.put_bytes(memo);
                Ok(())
            })?;
            w.spanned(Field::ScheduleCount, |w| w.checked_u8(schedule.len() as u64))?;
            w.spanned(Field::SchedulePairs, |w| {
                write_schedule(w, schedule);
                Ok(())
            })?;
        }

        Payload::ConfigureBaker(config) => {
            w.put_u16(config.bitmap());
            let has_stake_params = config.stake.is_some()
                || config.restake_earnings.is_some()
                || config.open_status.is_some();
            if has_stake_params {
                w.spanned(Field::StakeParams, |w| {
                    if let Some(stake) = config.stake {
                        w.put_u64(stake);
                    }
                    if let Some(restake) = config.restake_earnings {
                        w.put_u8(restake as u8);
                    }
                    if let Some(status) = config.open_status {
                        w.put_u8(status as u8);
                    }
                    Ok(())
                })?;
            }
            if let Some(keys) = &config.keys {
                w.spanned(Field::BakerKeys, |w| {
                    w.put_bytes(&keys.election_key);
                    w.put_bytes(&keys.election_proof);
                    w.put_bytes(&keys.signature_key);
                    w.put_bytes(&keys.signature_proof);
                    w.put_bytes(&keys.aggregation_key);
                    w.put_bytes(&keys.aggregation_proof);
                    Ok(())
                })?;
            }
            if let Some(url) = &config.metadata_url {
                w.spanned(Field::MetadataUrlLength, |w| {
                    w.checked_u16(url.len() as u64)
                })?;
                w.spanned(Field::MetadataUrl, |w| {
                    w.put_bytes(url.as_bytes());
                    Ok(())
                })?;
            }
            let commissions = [
                config.transaction_fee_commission,
                config.baking_reward_commission,
                config.finalization_reward_commission,
            ];
            if commissions.iter().any(Option::is_some) {
                w.spanned(Field::Commissions, |w| {
                    for rate in commissions.into_iter().flatten() {
                        w.put_u32(rate);
                    }
                    Ok(())
                })?;
            }
        }

        Payload::ConfigureDelegation(config) => {
            w.put_u16(config.bitmap());
            if let Some(capital) = config.capital {
                w.put_u64(capital);
            }
            if let Some(restake) = config.restake_earnings {
                w.put_u8(restake as u8);
            }
            match config.target {
                Some(DelegationTarget::Passive) => w.put_u8(0),
                Some(DelegationTarget::Baker(id)) => {
                    w.put_u8(1);
                    w.put_u64(id);
                }
                None => {}
            }
        }

        Payload::DeployCredential { account, credential } => {
            w.spanned(Field::NewOrExisting, |w| {
                match account {
                    CredentialAccount::Existing(address) => {
                        w.put_u8(0);
                        w.put_bytes(address);
                    }
                    CredentialAccount::New { expiry } => {
                        w.put_u8(1);
                        w.put_u64(*expiry);
                    }
                }
                Ok(())
            })?;
            write_credential(&mut w, credential)?;
        }
    }
    Ok(w)
}

fn write_schedule(w: &mut TxWriter, schedule: &[ScheduledRelease]) {
    for release in schedule {
        w.put_u64(release.timestamp);
        w.put_u64(release.amount);
    }
}

fn write_verification_key(w: &mut TxWriter, key: &VerificationKey) {
    w.put_u8(key.index);
    w.put_u8(key.scheme);
    w.put_bytes(&key.key);
}

fn write_credential(w: &mut TxWriter, credential: &Credential) -> SignerResult<()> {
    w.spanned(Field::CredentialKeyCount, |w| {
        w.checked_u8(credential.keys.len() as u64)
    })?;
    for key in &credential.keys {
        w.spanned(Field::CredentialKey, |w| {
            write_verification_key(w, key);
            Ok(())
        })?;
    }
    w.spanned(Field::CredentialFixed, |w| {
        w.put_u8(credential.key_threshold);
        w.put_bytes(&credential.registration_id);
        w.put_u32(credential.identity_provider);
        w.put_u8(credential.revocation_threshold);
        w.checked_u16(credential.revocation_entries.len() as u64)
    })?;
    for entry in &credential.revocation_entries {
        w.spanned(Field::RevocationEntry, |w| {
            w.put_u32(entry.revoker_id);
            w.put_bytes(&entry.encrypted_share);
            Ok(())
        })?;
    }
    w.spanned(Field::ValidityAndAttributeCount, |w| {
        w.put_u16(credential.valid_to.year);
        w.put_u8(credential.valid_to.month);
        w.put_u16(credential.created_at.year);
        w.put_u8(credential.created_at.month);
        w.checked_u16(credential.attributes.len() as u64)
    })?;
    for attribute in &credential.attributes {
        w.spanned(Field::AttributeTag, |w| {
            w.put_u8(attribute.tag);
            w.checked_u8(attribute.value.len() as u64)
        })?;
        w.spanned(Field::AttributeValue, |w| {
            w.put_bytes(&attribute.value);
            Ok(())
        })?;
    }
    w.spanned(Field::CredentialProofLength, |w| {
        w.checked_u32(credential.proof.len() as u64)
    })?;
    w.spanned(Field::CredentialProof, |w| {
        w.put_bytes(&credential.proof);
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> TransactionHeader {
        TransactionHeader::new([0x11; 32], 1234, 1234, 1_700_000_000)
    }

    fn tx(payload: Payload) -> AccountTransaction {
        AccountTransaction::new(header(), payload)
    }

    #[test]
    fn test_transfer_layout() {
        let encoded = serialize(&tx(Payload::Transfer { to: [0x22; 32], amount: 999 })).unwrap();

        // header ‖ kind ‖ to ‖ amount
        assert_eq!(encoded.bytes.len(), 60 + 1 + 32 + 8);
        assert_eq!(&encoded.bytes[..32], &[0x11; 32]);
        assert_eq!(&encoded.bytes[32..40], &1234u64.to_be_bytes());
        assert_eq!(&encoded.bytes[40..48], &1234u64.to_be_bytes());
        // payload size counts the kind tag
        assert_eq!(&encoded.bytes[48..52], &41u32.to_be_bytes());
        assert_eq!(&encoded.bytes[52..60], &1_700_000_000u64.to_be_bytes());
        assert_eq!(encoded.bytes[60], 3);
        assert_eq!(&encoded.bytes[61..93], &[0x22; 32]);
        assert_eq!(&encoded.bytes[93..], &999u64.to_be_bytes());
    }

    #[test]
    fn test_payload_size_is_derived() {
        let encoded = serialize(&tx(Payload::RegisterData { data: vec![7; 100] })).unwrap();
        // 2-byte length prefix + 100 data bytes + kind tag
        assert_eq!(&encoded.bytes[48..52], &103u32.to_be_bytes());
    }

    #[test]
    fn test_memo_transfer_spans() {
        let encoded = serialize(&tx(Payload::TransferWithMemo {
            to: [0x22; 32],
            memo: vec![0xAB; 300],
            amount: 7,
        }))
        .unwrap();

        let spans = encoded.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].field, Field::Memo);
        assert_eq!(spans[0].range.len(), 300);
        assert_eq!(spans[1].field, Field::Amount);
        assert_eq!(encoded.slice(&spans[1]), &7u64.to_be_bytes());

        // the length prefix sits right before the memo, inside the prelude
        let prefix = &encoded.bytes[spans[0].range.start - 2..spans[0].range.start];
        assert_eq!(prefix, &300u16.to_be_bytes());
        assert_eq!(encoded.prelude_end(), spans[0].range.start);
    }

    #[test]
    fn test_schedule_layout() {
        let schedule: Vec<_> = (0..20).map(|i| ScheduledRelease::new(i, i * 10)).collect();
        let encoded = serialize(&tx(Payload::TransferWithSchedule {
            to: [0x22; 32],
            schedule: schedule.clone(),
        }))
        .unwrap();

        // count byte sits in the prelude, pairs are one span
        assert_eq!(encoded.bytes[encoded.prelude_end() - 1], 20);
        let spans = encoded.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].field, Field::SchedulePairs);
        assert_eq!(spans[0].range.len(), 20 * SCHEDULE_PAIR_WIRE_LEN);
    }

    #[test]
    fn test_oversized_schedule_is_rejected() {
        let schedule = vec![ScheduledRelease::new(0, 0); 256];
        let result = serialize(&tx(Payload::TransferWithSchedule { to: [0; 32], schedule }));
        assert!(matches!(
            result,
            Err(crate::error::SignerError::OutOfRange { value: 256, width: 8 })
        ));
    }

    #[test]
    fn test_configure_baker_stake_and_keys_only() {
        let config = BakerConfiguration::new().with_stake(5_000_000).with_keys(BakerKeys {
            election_key: [1; 32],
            election_proof: [2; 64],
            signature_key: [3; 32],
            signature_proof: [4; 64],
            aggregation_key: [5; 96],
            aggregation_proof: [6; 64],
        });
        let encoded = serialize(&tx(Payload::ConfigureBaker(config))).unwrap();

        // bitmap ‖ stake ‖ keys, nothing else
        assert_eq!(&encoded.bytes[61..63], &0b1001u16.to_be_bytes());
        let spans = encoded.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].field, Field::StakeParams);
        assert_eq!(spans[0].range.len(), 8);
        assert_eq!(spans[1].field, Field::BakerKeys);
        assert_eq!(spans[1].range.len(), BAKER_KEYS_WIRE_LEN);
        assert_eq!(encoded.bytes.len(), 63 + 8 + 352);
    }

    #[test]
    fn test_configure_baker_field_order_is_bit_order() {
        let config = BakerConfiguration::new()
            .with_restake_earnings(true)
            .with_metadata_url("https://pool.example")
            .with_commissions(100, 200, 300);
        let encoded = serialize(&tx(Payload::ConfigureBaker(config))).unwrap();

        let fields: Vec<_> = encoded.spans().iter().map(|s| s.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::StakeParams,
                Field::MetadataUrlLength,
                Field::MetadataUrl,
                Field::Commissions,
            ]
        );
        // restake flag only
        assert_eq!(encoded.spans()[0].range.len(), 1);
        assert_eq!(encoded.spans()[3].range.len(), 12);
    }

    #[test]
    fn test_configure_delegation_layout() {
        let config = DelegationConfiguration::new()
            .with_capital(42)
            .with_restake_earnings(false)
            .with_target(DelegationTarget::Baker(7));
        let encoded = serialize(&tx(Payload::ConfigureDelegation(config))).unwrap();

        let payload = &encoded.bytes[61..];
        assert_eq!(&payload[..2], &0b111u16.to_be_bytes());
        assert_eq!(&payload[2..10], &42u64.to_be_bytes());
        assert_eq!(payload[10], 0);
        assert_eq!(payload[11], 1);
        assert_eq!(&payload[12..20], &7u64.to_be_bytes());
    }

    #[test]
    fn test_transfer_to_public_spans() {
        let encoded = serialize(&tx(Payload::TransferToPublic {
            remaining_amount: [9; 192],
            amount: 1,
            index: 2,
            proof: vec![3; 400],
        }))
        .unwrap();

        let spans = encoded.spans();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].field, Field::RemainingAmount);
        assert_eq!(spans[0].range.len(), 192);
        assert_eq!(spans[1].field, Field::AmountAndIndex);
        assert_eq!(spans[1].range.len(), 18);
        assert_eq!(spans[2].field, Field::Proof);
        assert_eq!(spans[2].range.len(), 400);
        // prelude is exactly header ‖ kind
        assert_eq!(encoded.prelude_end(), 61);
    }

    fn sample_credential() -> Credential {
        Credential {
            keys: vec![
                VerificationKey { index: 0, scheme: 0, key: [0xA0; 32] },
                VerificationKey { index: 1, scheme: 0, key: [0xA1; 32] },
            ],
            key_threshold: 2,
            registration_id: [0xB0; 48],
            identity_provider: 17,
            revocation_threshold: 1,
            revocation_entries: vec![RevocationEntry { revoker_id: 3, encrypted_share: [0xC0; 96] }],
            valid_to: YearMonth::new(2027, 12),
            created_at: YearMonth::new(2025, 6),
            attributes: vec![
                Attribute { tag: 1, value: b"DK".to_vec() },
                Attribute { tag: 5, value: vec![] },
            ],
            proof: vec![0xD0; 300],
        }
    }

    #[test]
    fn test_update_credentials_span_sequence() {
        let updates = CredentialUpdates {
            new_credentials: vec![CredentialUpdate { index: 0, credential: sample_credential() }],
            remove_credential_ids: vec![[0xE0; 48]],
            threshold: 1,
        };
        let encoded = serialize(&tx(Payload::UpdateCredentials(updates))).unwrap();

        let fields: Vec<_> = encoded.spans().iter().map(|s| s.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::CredentialIndex,
                Field::CredentialKeyCount,
                Field::CredentialKey,
                Field::CredentialKey,
                Field::CredentialFixed,
                Field::RevocationEntry,
                Field::ValidityAndAttributeCount,
                Field::AttributeTag,
                Field::AttributeValue,
                Field::AttributeTag,
                Field::AttributeValue,
                Field::CredentialProofLength,
                Field::CredentialProof,
                Field::RemovalCount,
                Field::RemovedId,
                Field::Threshold,
            ]
        );

        // spans tile the bytes after the prelude with no gaps
        let mut cursor = encoded.prelude_end();
        for span in encoded.spans() {
            assert_eq!(span.range.start, cursor);
            cursor = span.range.end;
        }
        assert_eq!(cursor, encoded.bytes.len());

        // the empty attribute value still gets a span
        assert_eq!(encoded.spans()[10].range.len(), 0);
    }

    #[test]
    fn test_deploy_credential_discriminator() {
        let encoded = serialize(&tx(Payload::DeployCredential {
            account: CredentialAccount::New { expiry: 99 },
            credential: sample_credential(),
        }))
        .unwrap();
        let first = &encoded.spans()[0];
        assert_eq!(first.field, Field::NewOrExisting);
        assert_eq!(encoded.slice(first)[0], 1);
        assert_eq!(&encoded.slice(first)[1..], &99u64.to_be_bytes());

        let encoded = serialize(&tx(Payload::DeployCredential {
            account: CredentialAccount::Existing([0x55; 32]),
            credential: sample_credential(),
        }))
        .unwrap();
        let first = &encoded.spans()[0];
        assert_eq!(encoded.slice(first)[0], 0);
        assert_eq!(encoded.slice(first).len(), 33);
    }

    #[test]
    fn test_public_info_layout() {
        let info = PublicInfoForIp {
            id_cred_pub: [1; 48],
            reg_id: [2; 48],
            verification_keys: vec![VerificationKey { index: 0, scheme: 0, key: [3; 32] }],
            threshold: 1,
        };
        let encoded = serialize_public_info(&info).unwrap();
        assert_eq!(encoded.prelude_end(), 48 + 48 + 1);
        assert_eq!(encoded.bytes[96], 1);
        let fields: Vec<_> = encoded.spans().iter().map(|s| s.field).collect();
        assert_eq!(fields, vec![Field::VerificationKey, Field::KeyThreshold]);
        assert_eq!(encoded.bytes.len(), 97 + VERIFICATION_KEY_WIRE_LEN + 1);
    }

    #[test]
    fn test_deterministic_output() {
        let payload = Payload::TransferWithMemo { to: [9; 32], memo: vec![1, 2, 3], amount: 10 };
        let a = serialize(&tx(payload.clone())).unwrap();
        let b = serialize(&tx(payload)).unwrap();
        assert_eq!(a.bytes, b.bytes);
    }
}
