//! Serde helpers for fixed-size byte arrays
//!
//! Serializes byte arrays as hex strings. Serde only derives arrays up to 32
//! bytes; the credential and proof material here is wider (48/64/96/192), so
//! fields use `#[serde(with = "crate::serde_hex")]`.

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
    bytes
        .try_into()
        .map_err(|_| serde::de::Error::custom(format!("expected {} bytes", N)))
}

/// Same encoding for a list of fixed-size byte arrays, as
/// `#[serde(with = "crate::serde_hex::hex_vec")]`.
pub mod hex_vec {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde::ser::SerializeSeq;

    pub fn serialize<S, const N: usize>(
        items: &[[u8; N]],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(&hex::encode(item))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<Vec<[u8; N]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let strings = Vec::<String>::deserialize(deserializer)?;
        strings
            .into_iter()
            .map(|s| {
                let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
                bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom(format!("expected {} bytes", N)))
            })
            .collect()
    }
}
