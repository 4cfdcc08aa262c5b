//! Session-key wrapping with RSA-OAEP (SHA-256, MGF1-SHA-256, empty label).
//!
//! Wrapped key wire format: base64(RSA-OAEP(public, key)), one modulus-sized block.

use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::base64::{base64_decode, base64_encode};
use crate::error::CryptoError;
use crate::types::{SymmetricKey, AES_KEY_LENGTH};

/// SHA-256 output size, which fixes the OAEP overhead.
const OAEP_HASH_LENGTH: usize = 32;

/// Largest message RSA-OAEP-SHA256 can carry under `public`: k - 2*hLen - 2.
pub fn max_wrappable_len(public: &RsaPublicKey) -> usize {
    public.size().saturating_sub(2 * OAEP_HASH_LENGTH + 2)
}

/// Wrap a 32-byte session key with the RSA public key.
///
/// Fails with `KeyTooLarge` when the modulus is too small to carry the key
/// under OAEP (anything under 784 bits for a 256-bit key).
pub fn wrap_key(key: &[u8], public: &RsaPublicKey) -> Result<String, CryptoError> {
    if key.len() != AES_KEY_LENGTH {
        return Err(CryptoError::InvalidKeyLength {
            expected: AES_KEY_LENGTH,
            got: key.len(),
        });
    }

    let max = max_wrappable_len(public);
    if key.len() > max {
        return Err(CryptoError::KeyTooLarge {
            max,
            got: key.len(),
        });
    }

    let wrapped = public
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), key)
        .map_err(|e| CryptoError::WrapFailed(e.to_string()))?;
    Ok(base64_encode(&wrapped))
}

/// Recover a session key wrapped by [`wrap_key`].
pub fn unwrap_key(token: &str, private: &RsaPrivateKey) -> Result<SymmetricKey, CryptoError> {
    let wrapped = base64_decode(token)
        .map_err(|e| CryptoError::UnwrapFailed(format!("wrapped key is not base64: {}", e)))?;

    let mut raw = private
        .decrypt(Oaep::new::<Sha256>(), &wrapped)
        .map_err(|e| CryptoError::UnwrapFailed(e.to_string()))?;

    let key = SymmetricKey::from_slice(&raw).map_err(|_| {
        CryptoError::UnwrapFailed(format!(
            "unwrapped key is {} bytes, expected {}",
            raw.len(),
            AES_KEY_LENGTH
        ))
    });
    raw.zeroize();
    key
}
