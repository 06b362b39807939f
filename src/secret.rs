use std::fmt;

use serde::{Deserialize, Deserializer};

/// The marketplace-issued signing key.
///
/// `SecretKey` keeps the HMAC key out of logs and configuration dumps. The
/// bytes can only be reached through [`expose_secret`](Self::expose_secret).
///
/// # Examples
///
/// ```
/// use marketplace_canvas::SecretKey;
///
/// let key = SecretKey::new("hubspot-issued-secret");
///
/// assert_eq!(format!("{:?}", key), "[REDACTED]");
/// assert_eq!(key.expose_secret(), b"hubspot-issued-secret");
/// ```
// Do NOT derive Clone, Debug or Serialize: each would let the key escape redaction.
pub struct SecretKey {
    // Must stay private.
    bytes: Vec<u8>,
}

impl SecretKey {
    /// Wraps raw key material.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Explicitly exposes the key bytes for HMAC computation.
    ///
    /// The name is intentionally loud. Never log the returned slice.
    pub fn expose_secret(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns `true` for a zero-length key.
    ///
    /// An empty key is treated the same as an absent one.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copies the key for another component.
    ///
    /// Used where both the gate and the mock simulator need their own key.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            bytes: self.bytes.clone(),
        }
    }
}

impl fmt::Debug for SecretKey {
    /// Always `[REDACTED]`, in every build profile.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(SecretKey::new(text.into_bytes()))
    }
}
