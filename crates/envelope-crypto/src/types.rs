use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// AES key length in bytes (256 bits).
pub const AES_KEY_LENGTH: usize = 32;

/// AES-CBC IV length in bytes (one 128-bit block).
pub const AES_CBC_IV_LENGTH: usize = 16;

/// HMAC-SHA-256 tag length appended to the ciphertext bytes.
pub const MAC_TAG_LENGTH: usize = 32;

/// Separates the IV segment from the ciphertext segment of a payload token.
pub const TOKEN_DELIMITER: char = ':';

/// A 256-bit AES session key. Lives for one encrypt/decrypt cycle only.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; AES_KEY_LENGTH]);

impl SymmetricKey {
    /// Generate a fresh key from the OS random source.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut key = [0u8; AES_KEY_LENGTH];
        getrandom::getrandom(&mut key).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
        Ok(Self(key))
    }

    /// Copy a key out of a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; AES_KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: AES_KEY_LENGTH,
                    got: bytes.len(),
                })?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SymmetricKey {}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Hybrid-encrypted payload as it crosses the transport boundary.
///
/// `key` is the RSA-wrapped session key, `data` the payload token
/// (`<iv-base64>:<ciphertext-base64>`). Neither field names an algorithm or
/// version: an envelope only opens under the keypair and codec that sealed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub key: String,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_32_bytes() {
        let key = SymmetricKey::generate().unwrap();
        assert_eq!(key.as_bytes().len(), AES_KEY_LENGTH);
    }

    #[test]
    fn generate_is_unique() {
        let a = SymmetricKey::generate().unwrap();
        let b = SymmetricKey::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        let err = SymmetricKey::from_slice(&[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength {
                expected: 32,
                got: 16
            }
        ));
    }

    #[test]
    fn debug_does_not_print_key_bytes() {
        let key = SymmetricKey::from_slice(&[0xab; 32]).unwrap();
        let printed = format!("{:?}", key);
        assert!(!printed.contains("171"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn envelope_wire_shape() {
        let envelope = Envelope {
            key: "wrapped".into(),
            data: "iv:ct".into(),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json, serde_json::json!({ "key": "wrapped", "data": "iv:ct" }));
    }
}
