//! TestId value object.

use super::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable identity of a test definition.
///
/// Identities are derived from the declaring module and the definition name,
/// so the same declaration maps to the same identity on every call and in
/// every process.
///
/// # Example
///
/// ```
/// use check_suite::domain::TestId;
///
/// let a = TestId::derive("checks.performance", "test_auc");
/// let b = TestId::derive("checks.performance", "test_auc");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 36);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestId(String);

impl TestId {
    /// Wrap an existing identity, validating that it's not empty and can
    /// be used as a single path segment.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyId` if the provided ID is empty, and
    /// `ValidationError::InvalidId` if it contains `/`, `\` or `..`.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if id.contains('/') || id.contains('\\') || id.contains("..") {
            return Err(ValidationError::InvalidId(id));
        }
        Ok(Self(id))
    }

    /// Derive the identity of `name` declared in `module`.
    ///
    /// Module and name are hashed NUL-separated, so no split of the same
    /// dotted path collides. The first 16 bytes of the SHA-256 digest are
    /// rendered in the 8-4-4-4-12 UUID layout.
    pub fn derive(module: &str, name: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(module.as_bytes());
        hasher.update([0u8]);
        hasher.update(name.as_bytes());
        let digest = hasher.finalize();

        let hex = hex_encode(&digest[..16]);
        Self(format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        ))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the underlying String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// Serde support - serialize as string
impl Serialize for TestId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

// Serde support - deserialize from string with validation
impl<'de> Deserialize<'de> for TestId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TestId::new(s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
