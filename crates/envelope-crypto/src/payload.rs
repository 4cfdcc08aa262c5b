//! AES-256-CBC payload encryption.
//!
//! Token format: `<iv-base64>:<sealed-base64>` where
//! sealed = [ciphertext (PKCS#7 padded)][HMAC-SHA-256(mac_key, iv || ciphertext):32]
//!
//! The CBC layer runs under the caller's key. The MAC key is derived from it:
//! mac_key = HKDF-SHA256(key, salt="envelope:payload-mac-salt:v1", info="envelope:payload-mac:v1")

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::base64::{base64_decode, base64_encode};
use crate::error::CryptoError;
use crate::types::{AES_CBC_IV_LENGTH, AES_KEY_LENGTH, MAC_TAG_LENGTH, TOKEN_DELIMITER};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

const MAC_KEY_SALT: &[u8] = b"envelope:payload-mac-salt:v1";
const MAC_KEY_INFO: &[u8] = b"envelope:payload-mac:v1";

/// Smallest sealed segment: one padded block plus the tag.
const MIN_SEALED_LENGTH: usize = AES_CBC_IV_LENGTH + MAC_TAG_LENGTH;

fn check_key_length(key: &[u8]) -> Result<(), CryptoError> {
    if key.len() != AES_KEY_LENGTH {
        return Err(CryptoError::InvalidKeyLength {
            expected: AES_KEY_LENGTH,
            got: key.len(),
        });
    }
    Ok(())
}

/// Generate a random 16-byte IV for AES-CBC.
pub fn generate_iv() -> Result<[u8; AES_CBC_IV_LENGTH], CryptoError> {
    let mut iv = [0u8; AES_CBC_IV_LENGTH];
    getrandom::getrandom(&mut iv).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(iv)
}

fn derive_mac_key(key: &[u8]) -> Result<[u8; AES_KEY_LENGTH], CryptoError> {
    let hk = Hkdf::<Sha256>::new(Some(MAC_KEY_SALT), key);
    let mut okm = [0u8; AES_KEY_LENGTH];
    hk.expand(MAC_KEY_INFO, &mut okm)
        .map_err(|e| CryptoError::KeyDerivation(format!("HKDF expand failed: {}", e)))?;
    Ok(okm)
}

fn payload_mac(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<HmacSha256, CryptoError> {
    let mut mac_key = derive_mac_key(key)?;
    let mac = HmacSha256::new_from_slice(&mac_key)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()));
    mac_key.zeroize();
    let mut mac = mac?;
    mac.update(iv);
    mac.update(ciphertext);
    Ok(mac)
}

/// Encrypt a text payload under a 256-bit key.
///
/// Every call draws a fresh IV, so encrypting the same plaintext twice
/// yields two different tokens.
///
/// # Returns
/// `<iv-base64>:<sealed-base64>`
pub fn encrypt_payload(plaintext: &str, key: &[u8]) -> Result<String, CryptoError> {
    check_key_length(key)?;
    let iv = generate_iv()?;

    let cipher = Aes256CbcEnc::new_from_slices(key, &iv).map_err(|_| {
        CryptoError::InvalidKeyLength {
            expected: AES_KEY_LENGTH,
            got: key.len(),
        }
    })?;
    let mut sealed = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let tag = payload_mac(key, &iv, &sealed)?.finalize().into_bytes();
    sealed.extend_from_slice(&tag);

    Ok(format!(
        "{}{}{}",
        base64_encode(&iv),
        TOKEN_DELIMITER,
        base64_encode(&sealed)
    ))
}

/// Decrypt a token produced by [`encrypt_payload`].
///
/// A wrong key and a corrupted ciphertext are indistinguishable: both fail
/// the tag check with `DecryptionFailed`.
pub fn decrypt_payload(token: &str, key: &[u8]) -> Result<String, CryptoError> {
    check_key_length(key)?;

    let (iv_b64, sealed_b64) = token
        .split_once(TOKEN_DELIMITER)
        .ok_or_else(|| CryptoError::MalformedToken("missing ':' delimiter".to_string()))?;

    let iv = base64_decode(iv_b64)
        .map_err(|e| CryptoError::MalformedToken(format!("IV segment: {}", e)))?;
    if iv.len() != AES_CBC_IV_LENGTH {
        return Err(CryptoError::MalformedToken(format!(
            "IV must be {} bytes, got {}",
            AES_CBC_IV_LENGTH,
            iv.len()
        )));
    }

    let sealed = base64_decode(sealed_b64)
        .map_err(|e| CryptoError::MalformedToken(format!("ciphertext segment: {}", e)))?;
    if sealed.len() < MIN_SEALED_LENGTH {
        return Err(CryptoError::MalformedToken(
            "ciphertext segment too short".to_string(),
        ));
    }

    let (ciphertext, tag) = sealed.split_at(sealed.len() - MAC_TAG_LENGTH);
    payload_mac(key, &iv, ciphertext)?
        .verify_slice(tag)
        .map_err(|_| CryptoError::DecryptionFailed("authentication failed".to_string()))?;

    let cipher = Aes256CbcDec::new_from_slices(key, &iv).map_err(|_| {
        CryptoError::InvalidKeyLength {
            expected: AES_KEY_LENGTH,
            got: key.len(),
        }
    })?;
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed("invalid padding".to_string()))?;

    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        CryptoError::Encoding("plaintext is not valid UTF-8".to_string())
    })
}
