//! Key Derivation Path Encoding
//!
//! Parses slash-delimited derivation paths ("44'/919'/0'/0/0") and encodes
//! them into the binary form the signing device expects: a component count
//! byte followed by each component as a big-endian u32, with the high bit set
//! for hardened components.

use crate::error::{SignerError, SignerResult};
use serde::{Deserialize, Serialize};

/// Hardened offset for BIP-32 style derivation
pub const HARDENED: u32 = 0x8000_0000;

/// Single component of a derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathComponent {
    pub index: u32,
    pub hardened: bool,
}

impl PathComponent {
    pub fn new(index: u32, hardened: bool) -> Self {
        Self { index, hardened }
    }

    /// Get the full index including the hardened bit
    pub fn full_index(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED
        } else {
            self.index
        }
    }
}

impl std::fmt::Display for PathComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// Parsed derivation path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPath {
    pub components: Vec<PathComponent>,
}

impl KeyPath {
    pub fn new(components: Vec<PathComponent>) -> Self {
        Self { components }
    }

    /// Parse a slash-delimited path string.
    ///
    /// A leading `m/` is accepted and ignored. Components may carry a
    /// hardening marker (`'`, `h` or `H`). Components with no digits at all
    /// are skipped, matching the tolerance of earlier releases; a component
    /// whose digits do not form a value below the hardened bit is rejected.
    pub fn parse(path: &str) -> SignerResult<Self> {
        let trimmed = path.trim();
        let trimmed = trimmed
            .strip_prefix("m/")
            .or_else(|| trimmed.strip_prefix("M/"))
            .unwrap_or(trimmed);

        let mut components = Vec::new();
        for raw in trimmed.split('/') {
            if let Some(component) = parse_component(raw)? {
                components.push(component);
            }
        }

        if components.len() > u8::MAX as usize {
            return Err(SignerError::malformed_path(format!(
                "path has {} components, at most 255 are supported",
                components.len()
            )));
        }

        Ok(Self { components })
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Encode as `1 + 4k` bytes: count, then each component big-endian with
    /// the hardened bit applied.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 4 * self.components.len());
        out.push(self.components.len() as u8);
        for component in &self.components {
            out.extend_from_slice(&component.full_index().to_be_bytes());
        }
        out
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for KeyPath {
    type Err = SignerError;

    fn from_str(s: &str) -> SignerResult<Self> {
        Self::parse(s)
    }
}

/// Parse a single path component.
///
/// Returns `Ok(None)` for components that contain no digits; those are
/// dropped silently for compatibility with paths produced by older tooling.
fn parse_component(s: &str) -> SignerResult<Option<PathComponent>> {
    let trimmed = s.trim();

    let (number_str, hardened) = match trimmed.strip_suffix(|c: char| matches!(c, '\'' | 'h' | 'H')) {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };

    if !number_str.bytes().any(|b| b.is_ascii_digit()) {
        return Ok(None);
    }

    let index: u32 = number_str.parse().map_err(|_| {
        SignerError::malformed_path(format!("invalid path component '{}'", s))
    })?;

    if index >= HARDENED {
        return Err(SignerError::malformed_path(format!(
            "path component {} exceeds maximum value",
            index
        )));
    }

    Ok(Some(PathComponent::new(index, hardened)))
}
