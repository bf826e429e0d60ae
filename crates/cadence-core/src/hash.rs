//! Content-derived fingerprints for component state

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 digest of a value's serialized state.
///
/// Two values with identical fields produce the same fingerprint, and a
/// value's fingerprint changes whenever its state does. It identifies
/// *content*, not an instance; use [`crate::ComponentId`] for identity.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute a fingerprint from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        Self(result.into())
    }

    /// Fingerprint a serializable value via its JSON encoding
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Get the fingerprint as a hex string
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Get the fingerprint as a prefixed hex string (e.g., "sha256:abcdef...")
    pub fn to_prefixed_hex(&self) -> String {
        format!("sha256:{}", self.to_hex())
    }

    /// Parse a prefixed hex string back into a Fingerprint
    pub fn from_prefixed_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix("sha256:")?;
        if hex.len() != 64 || !hex.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Position {
        x: f64,
        y: f64,
    }

    #[test]
    fn test_equal_state_equal_fingerprint() {
        let a = Fingerprint::of(&Position { x: 1.0, y: 2.0 }).unwrap();
        let b = Fingerprint::of(&Position { x: 1.0, y: 2.0 }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_state_change_changes_fingerprint() {
        let mut p = Position { x: 1.0, y: 2.0 };
        let before = Fingerprint::of(&p).unwrap();
        p.x = 3.0;
        let after = Fingerprint::of(&p).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_unserializable_state_is_an_error() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys are not valid JSON object keys");
        assert!(Fingerprint::of(&map).is_err());
    }

    #[test]
    fn test_prefixed_hex_roundtrip() {
        let h = Fingerprint::from_bytes(b"test data");
        let prefixed = h.to_prefixed_hex();
        assert!(prefixed.starts_with("sha256:"));
        assert_eq!(Fingerprint::from_prefixed_hex(&prefixed), Some(h));
    }

    #[test]
    fn test_from_prefixed_hex_invalid() {
        assert!(Fingerprint::from_prefixed_hex("md5:abc").is_none());
        assert!(Fingerprint::from_prefixed_hex("sha256:tooshort").is_none());
    }

    #[test]
    fn test_display_is_short_prefix() {
        let h = Fingerprint::from_bytes(b"hello");
        assert_eq!(h.to_string().len(), 16);
        assert!(h.to_hex().starts_with(&h.to_string()));
    }
}
