//! Hybrid envelope: seal on the sending side, open on the receiving side.
//!
//! Seal:  fresh key → encrypt_payload(plaintext, key) → wrap_key(key, public) → {key, data}
//! Open:  unwrap_key(key, private) → decrypt_payload(data, key) → plaintext

use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CryptoError;
use crate::key_wrap::{unwrap_key, wrap_key};
use crate::payload::{decrypt_payload, encrypt_payload};
use crate::types::{Envelope, SymmetricKey};

/// Seal a text payload under a fresh session key wrapped for `public`.
pub fn seal(plaintext: &str, public: &RsaPublicKey) -> Result<Envelope, CryptoError> {
    let session_key = SymmetricKey::generate()?;
    let data = encrypt_payload(plaintext, session_key.as_bytes())?;
    let key = wrap_key(session_key.as_bytes(), public)?;
    tracing::trace!(plaintext_len = plaintext.len(), "sealed envelope");
    Ok(Envelope { key, data })
}

/// Open an envelope sealed by [`seal`] for the matching public key.
pub fn open(envelope: &Envelope, private: &RsaPrivateKey) -> Result<String, CryptoError> {
    let session_key = unwrap_key(&envelope.key, private)?;
    decrypt_payload(&envelope.data, session_key.as_bytes())
}

/// Serialize `value` as JSON and seal it.
pub fn seal_json<T: Serialize + ?Sized>(
    value: &T,
    public: &RsaPublicKey,
) -> Result<Envelope, CryptoError> {
    let text = serde_json::to_string(value)
        .map_err(|e| CryptoError::Encoding(format!("payload is not serializable: {}", e)))?;
    seal(&text, public)
}

/// Open an envelope and parse its plaintext as JSON.
pub fn open_json<T: DeserializeOwned>(
    envelope: &Envelope,
    private: &RsaPrivateKey,
) -> Result<T, CryptoError> {
    let text = open(envelope, private)?;
    serde_json::from_str(&text)
        .map_err(|e| CryptoError::Encoding(format!("payload is not valid JSON: {}", e)))
}
