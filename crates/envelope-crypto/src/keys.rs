//! Process-wide RSA keypair.
//!
//! Loaded once at startup from two PEM files and never mutated afterwards.
//! Callers share it by reference (typically behind an `Arc`).

use std::path::Path;

use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::key_wrap::max_wrappable_len;
use crate::types::AES_KEY_LENGTH;

pub struct KeyPair {
    public: RsaPublicKey,
    private: RsaPrivateKey,
}

impl KeyPair {
    /// Pair up two halves, rejecting halves that do not belong together.
    pub fn new(public: RsaPublicKey, private: RsaPrivateKey) -> Result<Self, CryptoError> {
        if private.to_public_key() != public {
            return Err(CryptoError::KeyLoad(
                "public key does not match private key".to_string(),
            ));
        }
        if max_wrappable_len(&public) < AES_KEY_LENGTH {
            tracing::warn!(
                modulus_bits = public.size() * 8,
                "RSA modulus too small to wrap a 256-bit session key"
            );
        }
        Ok(Self { public, private })
    }

    /// Generate a fresh keypair. Development and tests only.
    pub fn generate(bits: usize) -> Result<Self, CryptoError> {
        let private = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| CryptoError::KeyLoad(format!("RSA key generation failed: {}", e)))?;
        let public = private.to_public_key();
        Ok(Self { public, private })
    }

    /// Parse PEM text.
    ///
    /// Public: SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`).
    /// Private: PKCS#8 (`PRIVATE KEY`) or PKCS#1 (`RSA PRIVATE KEY`).
    pub fn from_pem(public_pem: &str, private_pem: &str) -> Result<Self, CryptoError> {
        let public = RsaPublicKey::from_public_key_pem(public_pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(public_pem))
            .map_err(|e| CryptoError::KeyLoad(format!("invalid public key PEM: {}", e)))?;
        let private = RsaPrivateKey::from_pkcs8_pem(private_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_pem))
            .map_err(|e| CryptoError::KeyLoad(format!("invalid private key PEM: {}", e)))?;
        Self::new(public, private)
    }

    /// Read both PEM files and parse them.
    pub fn load(
        public_path: impl AsRef<Path>,
        private_path: impl AsRef<Path>,
    ) -> Result<Self, CryptoError> {
        let public_path = public_path.as_ref();
        let private_path = private_path.as_ref();

        let public_pem = std::fs::read_to_string(public_path).map_err(|e| {
            CryptoError::KeyLoad(format!("{}: {}", public_path.display(), e))
        })?;
        let private_pem = Zeroizing::new(std::fs::read_to_string(private_path).map_err(|e| {
            CryptoError::KeyLoad(format!("{}: {}", private_path.display(), e))
        })?);

        let pair = Self::from_pem(&public_pem, &private_pem)?;
        tracing::info!(
            public = %public_path.display(),
            modulus_bits = pair.modulus_bits(),
            "loaded RSA keypair"
        );
        Ok(pair)
    }

    /// Export as (SPKI public PEM, PKCS#8 private PEM).
    pub fn to_pem(&self) -> Result<(String, Zeroizing<String>), CryptoError> {
        let public = self
            .public
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyLoad(e.to_string()))?;
        let private = self
            .private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyLoad(e.to_string()))?;
        Ok((public, private))
    }

    pub fn public(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn private(&self) -> &RsaPrivateKey {
        &self.private
    }

    pub fn modulus_bits(&self) -> usize {
        self.public.size() * 8
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("modulus_bits", &self.modulus_bits())
            .finish_non_exhaustive()
    }
}
