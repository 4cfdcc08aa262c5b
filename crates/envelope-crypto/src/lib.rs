//! Hybrid envelope encryption for request/response payloads.
//!
//! A payload is encrypted with a fresh AES-256 session key (CBC mode,
//! PKCS#7 padding, HMAC-SHA-256 tag), and the session key is wrapped with a
//! process-wide RSA public key using OAEP-SHA-256. The receiving side unwraps
//! the key with the matching private key and decrypts.
//!
//! Every operation is a pure function of its inputs plus the OS random
//! source; nothing here holds mutable state.

pub mod base64;
pub mod envelope;
pub mod error;
pub mod key_wrap;
pub mod keys;
pub mod payload;
pub mod types;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod test_keys;

pub use base64::{base64_decode, base64_encode};
pub use envelope::{open, open_json, seal, seal_json};
pub use error::CryptoError;
pub use key_wrap::{max_wrappable_len, unwrap_key, wrap_key};
pub use keys::KeyPair;
pub use payload::{decrypt_payload, encrypt_payload, generate_iv};
pub use types::{
    Envelope, SymmetricKey, AES_CBC_IV_LENGTH, AES_KEY_LENGTH, MAC_TAG_LENGTH, TOKEN_DELIMITER,
};

pub use rsa::{RsaPrivateKey, RsaPublicKey};
